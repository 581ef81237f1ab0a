//! # Query Id Derivation
//!
//! A query id is the hex SHA-256 of the query key. Retries append the next
//! value of the persisted uid counter so the re-issued query never collides
//! with the one it replaces.

use sha2::{Digest, Sha256};

/// Derive a query id from its key and an optional uniqueness counter.
pub fn generate_query_id(query_key: &[u8], unique_suffix: Option<u64>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query_key);
    if let Some(uid) = unique_suffix {
        hasher.update(uid.to_be_bytes());
    }
    hex::encode(hasher.finalize())
}
