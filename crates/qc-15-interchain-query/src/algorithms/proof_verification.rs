//! # Query Response Proof Verification
//!
//! Checks a submitted result against the tracked consensus state of the
//! queried chain.
//!
//! ## Trust boundary
//!
//! Only query types ending in `key` are proven. Every other query type is
//! accepted without a proof; the callback that consumes it owns that risk.
//!
//! ## Algorithm
//!
//! 1. Require proof ops and a proof height strictly above the submission height
//! 2. Resolve connection → client → consensus state at `proof_height + 1`
//!    (the header at H+1 commits the app hash of state at H)
//! 3. Build the path `[store, key]` from the query type and request data
//! 4. Non-empty result: membership proof. Empty result: non-membership proof

use tracing::debug;

use crate::domain::{
    invariant_proof_after_submission, invariant_proof_height_unsigned, is_key_query,
    parse_chain_revision, query_store_name, ClientState, ConsensusState, Height, IcqError,
    MerklePath, MsgSubmitQueryResponse, Query,
};
use crate::ports::outbound::{ClientResolver, CommitmentVerifier};

/// Verify the proof carried by `msg` for `query`.
///
/// Returns `Ok` without looking at the proof for non-key query types.
pub fn verify_key_proof(
    clients: &dyn ClientResolver,
    commitments: &dyn CommitmentVerifier,
    max_proof_ops: usize,
    query: &Query,
    msg: &MsgSubmitQueryResponse,
) -> Result<(), IcqError> {
    if !is_key_query(&query.query_type) {
        return Ok(());
    }

    let proof_ops = match &msg.proof_ops {
        Some(ops) if !ops.ops.is_empty() => ops,
        _ => return Err(IcqError::InvalidProof("No proof submitted".to_string())),
    };
    if proof_ops.ops.len() > max_proof_ops {
        return Err(IcqError::InvalidProof(format!(
            "Proof has {} ops, at most {} allowed",
            proof_ops.ops.len(),
            max_proof_ops
        )));
    }

    let proof_height = invariant_proof_height_unsigned(msg.height)?;
    invariant_proof_after_submission(proof_height, query.submission_height)?;

    let connection = clients.connection(&query.connection_id).ok_or_else(|| {
        IcqError::InvalidProof(format!("ConnectionId {} does not exist", query.connection_id))
    })?;
    let client_id = connection.client_id;

    let consensus_height = Height::new(
        parse_chain_revision(&query.chain_id),
        proof_height
            .checked_add(1)
            .ok_or_else(|| IcqError::InvalidProof("Proof height overflows".to_string()))?,
    );

    let consensus_state = clients
        .consensus_state(&client_id, consensus_height)
        .ok_or_else(|| {
            IcqError::InvalidProof(format!(
                "Consensus state not found for client {} and height {}",
                client_id, consensus_height
            ))
        })?;
    let root = match consensus_state {
        ConsensusState::Tendermint(state) => state.root,
        other => {
            return Err(IcqError::InvalidProof(format!(
                "Only tendermint consensus state is supported ({})",
                other.client_type()
            )))
        }
    };

    let client_state = clients.client_state(&client_id).ok_or_else(|| {
        IcqError::InvalidProof(format!("Unable to fetch client state for client {}", client_id))
    })?;
    let specs = match client_state {
        ClientState::Tendermint(state) => state.proof_specs,
        other => {
            return Err(IcqError::InvalidProof(format!(
                "Only tendermint client state is supported ({})",
                other.client_type()
            )))
        }
    };

    let store = query_store_name(&query.query_type).ok_or_else(|| {
        IcqError::InvalidProof(format!("Invalid key query type {}", query.query_type))
    })?;
    let path = MerklePath::new(store, &query.request_data);

    if !msg.result.is_empty() {
        commitments
            .verify_membership(&specs, &root, &path, proof_ops, &msg.result)
            .map_err(|e| {
                IcqError::InvalidProof(format!(
                    "Unable to verify membership proof: {} | {}",
                    e,
                    query.description()
                ))
            })?;
        debug!(query_id = %query.id, height = %consensus_height, "[qc-15] Membership proof verified");
    } else {
        commitments
            .verify_non_membership(&specs, &root, &path, proof_ops)
            .map_err(|e| {
                IcqError::InvalidProof(format!(
                    "Unable to verify non-membership proof: {} | {}",
                    e,
                    query.description()
                ))
            })?;
        debug!(query_id = %query.id, height = %consensus_height, "[qc-15] Non-membership proof verified");
    }

    Ok(())
}
