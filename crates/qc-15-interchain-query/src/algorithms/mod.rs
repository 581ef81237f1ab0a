//! # Algorithms Module
//!
//! Pure logic of the query engine: proof verification, timeout
//! resolution, query id derivation, and the Merkle commitment scheme.

pub mod merkle;
pub mod proof_verification;
pub mod query_id;
pub mod timeout;

pub use merkle::{
    CommitmentProof, ExistenceProof, MerkleError, MultiStoreTree, NonExistenceProof,
    SortedMerkleTree,
};
pub use proof_verification::verify_key_proof;
pub use query_id::generate_query_id;
pub use timeout::{timeout_decision, TimeoutDecision};
