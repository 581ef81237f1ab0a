//! # Domain Invariants
//!
//! Business rules for Interchain Queries.

use super::errors::IcqError;

/// Prefix every connection identifier carries.
pub const CONNECTION_ID_PREFIX: &str = "connection-";

/// Invariant: Proof height after submission height.
///
/// A proof must attest to counterparty state strictly newer than the
/// light-client height recorded when the query was issued. Equal heights
/// are rejected so that a stale proof cannot be replayed.
pub fn invariant_proof_after_submission(
    proof_height: u64,
    submission_height: u64,
) -> Result<(), IcqError> {
    if proof_height <= submission_height {
        return Err(IcqError::InvalidProof(format!(
            "Query proof height ({}) is older than the submission height ({})",
            proof_height, submission_height
        )));
    }
    Ok(())
}

/// Invariant: Non-negative proof height.
///
/// Heights arrive signed on the wire.
pub fn invariant_proof_height_unsigned(height: i64) -> Result<u64, IcqError> {
    u64::try_from(height)
        .map_err(|_| IcqError::InvalidProof(format!("Query proof height ({}) is negative", height)))
}

/// Invariant: Connection identifier format.
pub fn invariant_connection_id(connection_id: &str) -> Result<(), IcqError> {
    if !connection_id.starts_with(CONNECTION_ID_PREFIX) {
        return Err(IcqError::InvalidQuery(format!(
            "invalid connection-id ({})",
            connection_id
        )));
    }
    Ok(())
}
