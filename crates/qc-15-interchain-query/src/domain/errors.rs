//! # Domain Errors
//!
//! Error types for Interchain Queries.
//!
//! Every variant except a missing query aborts the enclosing state
//! transition. A response for an unknown query id is not an error at all:
//! it is acknowledged as a benign duplicate.

use thiserror::Error;

/// Hash type (32-byte SHA-256).
pub type Hash = [u8; 32];

/// Boxed error returned by a module callback.
///
/// Callbacks belong to other modules with their own error enums, so the
/// dispatcher only sees them as opaque errors and wraps them in
/// [`IcqError::CallbackFailed`].
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Interchain query error types.
#[derive(Debug, Error)]
pub enum IcqError {
    /// Proof missing, stale, malformed, or not provable against the
    /// tracked light-client state.
    #[error("Invalid ICQ proof: {0}")]
    InvalidProof(String),

    /// No registered module claims the callback id.
    #[error("ICQ callback not found: {0}")]
    CallbackNotFound(String),

    /// Stored timeout policy is not one of the supported values.
    #[error("Unsupported query timeout policy: {0}")]
    UnsupportedTimeoutPolicy(i32),

    /// The selected callback returned an error.
    #[error("ICQ callback {callback_id} of module {module} failed: {source}")]
    CallbackFailed {
        /// Module that owns the callback.
        module: String,
        /// Callback identifier.
        callback_id: String,
        /// Error raised by the callback.
        #[source]
        source: CallbackError,
    },

    /// Query rejected at submission time.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Submitted message failed stateless validation.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Two callback modules registered under the same name.
    #[error("Callback module already registered: {0}")]
    DuplicateModule(String),

    /// Callback module registered under an unusable name.
    #[error("Invalid callback module name: {0:?}")]
    InvalidModule(String),

    /// Service configuration rejected.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Stored value could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(String),

    /// Underlying key-value store failure.
    #[error(transparent)]
    Store(#[from] KvStoreError),
}

/// Key-value store errors.
#[derive(Debug, Error)]
pub enum KvStoreError {
    /// Backend failure.
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Errors from the commitment (Merkle proof) engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommitmentError {
    /// Proof ops could not be converted into commitment proofs.
    #[error("proof conversion failed: {0}")]
    ProofConversion(String),

    /// The proof does not verify against the root.
    #[error("{0}")]
    Verification(String),
}

impl From<bincode::Error> for IcqError {
    fn from(err: bincode::Error) -> Self {
        IcqError::Codec(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_proof_error() {
        let err = IcqError::InvalidProof("No proof submitted".to_string());
        assert!(err.to_string().contains("No proof submitted"));
    }

    #[test]
    fn test_unsupported_policy_error() {
        let err = IcqError::UnsupportedTimeoutPolicy(7);
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_callback_failed_keeps_source() {
        let inner: CallbackError = "record missing".into();
        let err = IcqError::CallbackFailed {
            module: "records".to_string(),
            callback_id: "redemption".to_string(),
            source: inner,
        };
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "record missing");
        assert!(err.to_string().contains("redemption"));
    }

    #[test]
    fn test_store_error_is_transparent() {
        let err: IcqError = KvStoreError::DatabaseError("disk".to_string()).into();
        assert_eq!(err.to_string(), "Database error: disk");
    }
}
