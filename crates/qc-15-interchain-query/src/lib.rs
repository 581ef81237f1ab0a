//! # QC-15 Interchain Query
//!
//! Verification and callback dispatch for queries answered by off-chain
//! relayers about the state of another chain.
//!
//! **Subsystem ID:** 15
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A module issues a query about a counterparty chain's state. A relayer
//! reads the answer off that chain and submits it with a Merkle proof. This
//! crate:
//! - stores pending queries in a ledger keyed by a hash-derived id
//! - verifies key-query results against the tracked consensus root
//! - resolves late responses with the query's timeout policy
//! - hands the result to exactly one registered module callback
//!
//! ## Determinism
//!
//! | Concern | Rule |
//! |---------|------|
//! | Callback selection | First claimant in lexicographic module order |
//! | Time | Block time from the [`Context`] only |
//! | Replays | Query deleted before dispatch; unknown ids are a no-op |
//! | Failure | Whole step rolled back, deletion included |
//!
//! ## Module Structure
//!
//! ```text
//! qc-15-interchain-query/
//! ├── domain/          # Query, responses, client states, errors
//! ├── algorithms/      # Proof verification, timeouts, ids, Merkle engine
//! ├── application/     # Context, ledger, callback registry, service
//! ├── ports/           # InterchainQueryApi, collaborator traits
//! └── adapters/        # In-memory stores, client registry, event sinks
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{
    CacheStore, InMemoryClientRegistry, InMemoryKvStore, MerkleCommitmentVerifier,
    RecordingEventSink, TracingEventSink,
};
pub use algorithms::{
    generate_query_id, timeout_decision, verify_key_proof, MultiStoreTree, TimeoutDecision,
};
pub use application::{CallbackRegistry, CallbackRegistryBuilder, Context, InterchainQueryService};
pub use config::{ConfigError, InterchainQueryConfig};
pub use domain::{
    is_key_query, parse_chain_revision, CallbackError, ClientState, CommitmentError,
    CommitmentRoot, ConnectionEnd, ConsensusState, Height, IcqError, KvStoreError, MerklePath,
    MsgSubmitQueryResponse, MsgSubmitQueryResponseResponse, ProofOp, ProofOps, ProofSpec, Query,
    QueryBuilder, QueryEvent, TendermintClientState, TendermintConsensusState, TimeoutPolicy,
};
pub use ports::{
    BatchOperation, ClientResolver, CommitmentVerifier, EventSink, InterchainQueryApi,
    KeyValueStore, QueryCallbacks,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
