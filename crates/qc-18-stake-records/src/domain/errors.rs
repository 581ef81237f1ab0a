//! # Domain Errors
//!
//! Error types for stake records and their query callbacks.

use super::value_objects::HostZoneUnbondingStatus;
use qc_15_interchain_query::KvStoreError;
use thiserror::Error;

/// Stake records error types.
#[derive(Debug, Error)]
pub enum RecordsError {
    /// Callback payload could not be decoded.
    #[error("unable to unmarshal redemption callback args: {0}")]
    MalformedCallbackArgs(String),

    /// A referenced record does not exist.
    #[error("record not found: {0}")]
    RecordNotFound(String),

    /// Status change not allowed by the unbonding lifecycle.
    #[error("invalid host zone unbonding transition {from:?} -> {to:?}")]
    InvalidTransition {
        /// Current status.
        from: HostZoneUnbondingStatus,
        /// Requested status.
        to: HostZoneUnbondingStatus,
    },

    /// Callback id not owned by this module.
    #[error("unknown callback: {0}")]
    UnknownCallback(String),

    /// Stored value or acknowledgement could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(String),

    /// Underlying key-value store failure.
    #[error(transparent)]
    Store(#[from] KvStoreError),
}

impl From<bincode::Error> for RecordsError {
    fn from(err: bincode::Error) -> Self {
        RecordsError::Codec(err.to_string())
    }
}
