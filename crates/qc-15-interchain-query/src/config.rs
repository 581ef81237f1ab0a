//! # Interchain Query Configuration
//!
//! Limits applied by the query engine. Loadable from JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default maximum number of proof ops in a response.
pub const DEFAULT_MAX_PROOF_OPS: usize = 4;

/// Default maximum depth of any single Merkle proof.
pub const DEFAULT_MAX_PROOF_DEPTH: u32 = 64;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field has an unusable value.
    #[error("Invalid config field {field}: {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// JSON could not be parsed.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Interchain query engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterchainQueryConfig {
    /// Maximum number of proof ops accepted in one response.
    pub max_proof_ops: usize,

    /// Cap on the depth of every Merkle proof, on top of the proof spec.
    pub max_proof_depth: u32,

    /// Maximum length of a query's request data in bytes.
    pub max_request_data_len: usize,

    /// Longest time-to-live a query may ask for, in nanoseconds.
    pub max_timeout_duration_nanos: u64,
}

impl Default for InterchainQueryConfig {
    fn default() -> Self {
        Self {
            max_proof_ops: DEFAULT_MAX_PROOF_OPS,
            max_proof_depth: DEFAULT_MAX_PROOF_DEPTH,
            max_request_data_len: 4096,
            // 30 days.
            max_timeout_duration_nanos: 30 * 24 * 3600 * 1_000_000_000,
        }
    }
}

impl InterchainQueryConfig {
    /// Create a config for testing (small limits).
    pub fn for_testing() -> Self {
        Self {
            max_proof_ops: 2,
            max_proof_depth: 16,
            max_request_data_len: 256,
            max_timeout_duration_nanos: 3_600 * 1_000_000_000,
        }
    }

    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject unusable limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_proof_ops == 0 {
            return Err(ConfigError::InvalidField {
                field: "max_proof_ops",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_proof_depth == 0 {
            return Err(ConfigError::InvalidField {
                field: "max_proof_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_request_data_len == 0 {
            return Err(ConfigError::InvalidField {
                field: "max_request_data_len",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_timeout_duration_nanos == 0 {
            return Err(ConfigError::InvalidField {
                field: "max_timeout_duration_nanos",
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
