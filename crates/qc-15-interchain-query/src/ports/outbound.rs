//! # Outbound Ports
//!
//! Traits for the collaborators the query engine depends on: storage,
//! light-client state, the Merkle proof engine, the event sink, and the
//! callback modules.
//!
//! All ports are synchronous. Every lookup is against already-replicated
//! local state, never a live network call.

use crate::application::Context;
use crate::domain::{
    CallbackError, ClientState, CommitmentError, CommitmentRoot, ConnectionEnd, ConsensusState,
    Height, KvStoreError, MerklePath, ProofOps, ProofSpec, Query, QueryEvent,
};

/// Abstract interface for key-value storage.
///
/// Testing: `InMemoryKvStore`. Transactions: `CacheStore`.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KvStoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), KvStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch are applied, or NONE are.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KvStoreError>;

    /// Iterate over keys with a prefix, in ascending key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KvStoreError> {
        Ok(self.get(key)?.is_some())
    }
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put {
        /// Key.
        key: Vec<u8>,
        /// Value.
        value: Vec<u8>,
    },
    /// Delete a key.
    Delete {
        /// Key.
        key: Vec<u8>,
    },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Connection and light-client lookups - outbound port.
pub trait ClientResolver: Send + Sync {
    /// Connection end by id.
    fn connection(&self, connection_id: &str) -> Option<ConnectionEnd>;

    /// Latest client state by client id.
    fn client_state(&self, client_id: &str) -> Option<ClientState>;

    /// Consensus state of a client at an exact height.
    fn consensus_state(&self, client_id: &str, height: Height) -> Option<ConsensusState>;
}

/// Merkle proof engine - outbound port.
pub trait CommitmentVerifier: Send + Sync {
    /// Verify that `path` maps to `value` under `root`.
    fn verify_membership(
        &self,
        specs: &[ProofSpec],
        root: &CommitmentRoot,
        path: &MerklePath,
        proof: &ProofOps,
        value: &[u8],
    ) -> Result<(), CommitmentError>;

    /// Verify that `path` is absent under `root`.
    fn verify_non_membership(
        &self,
        specs: &[ProofSpec],
        root: &CommitmentRoot,
        path: &MerklePath,
        proof: &ProofOps,
    ) -> Result<(), CommitmentError>;
}

/// Event sink - outbound port. Fire-and-forget.
pub trait EventSink: Send + Sync {
    /// Publish an event.
    fn emit(&self, event: QueryEvent);
}

/// Callback capability a module registers with the dispatcher.
pub trait QueryCallbacks: Send + Sync {
    /// Whether this module owns `callback_id`.
    fn has_callback(&self, callback_id: &str) -> bool;

    /// Run the callback.
    ///
    /// Any error aborts the enclosing state transition.
    fn call(
        &self,
        ctx: &mut Context<'_>,
        callback_id: &str,
        result: &[u8],
        query: &Query,
    ) -> Result<(), CallbackError>;
}
