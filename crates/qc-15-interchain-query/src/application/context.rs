//! # Execution Context
//!
//! Per-message view of chain state: block height, block time, the local
//! chain id, the state store, and buffered events.
//!
//! Every state-changing API call runs inside [`Context::run_atomic`]. Writes
//! go to a [`CacheStore`] branch and reach the parent store in one atomic
//! batch only when the step returns `Ok`. Events follow the same rule.

use crate::adapters::CacheStore;
use crate::domain::{KvStoreError, QueryEvent};
use crate::ports::outbound::KeyValueStore;

/// Execution context of one deterministic step.
pub struct Context<'a> {
    block_height: u64,
    block_time_nanos: u64,
    chain_id: String,
    store: &'a mut (dyn KeyValueStore + 'a),
    events: Vec<QueryEvent>,
}

impl<'a> Context<'a> {
    /// Create a context over `store` at the given block.
    pub fn new(
        store: &'a mut (dyn KeyValueStore + 'a),
        chain_id: impl Into<String>,
        block_height: u64,
        block_time_nanos: u64,
    ) -> Self {
        Self {
            block_height,
            block_time_nanos,
            chain_id: chain_id.into(),
            store,
            events: Vec::new(),
        }
    }

    /// Current block height.
    pub fn block_height(&self) -> u64 {
        self.block_height
    }

    /// Current block time in nanoseconds.
    pub fn block_time_nanos(&self) -> u64 {
        self.block_time_nanos
    }

    /// Id of the local chain.
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Read access to state.
    pub fn store(&self) -> &(dyn KeyValueStore + 'a) {
        &*self.store
    }

    /// Write access to state.
    pub fn store_mut(&mut self) -> &mut (dyn KeyValueStore + 'a) {
        &mut *self.store
    }

    /// Buffer an event until the step commits.
    pub fn emit_event(&mut self, event: QueryEvent) {
        self.events.push(event);
    }

    /// Events buffered so far.
    pub fn events(&self) -> &[QueryEvent] {
        &self.events
    }

    /// Run `f` as one atomic step.
    ///
    /// On `Ok` the branch's writes are committed to this context's store and
    /// its events are appended here. On `Err` both are dropped.
    pub fn run_atomic<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Context<'_>) -> Result<T, E>,
        E: From<KvStoreError>,
    {
        let block_height = self.block_height;
        let block_time_nanos = self.block_time_nanos;
        let chain_id = self.chain_id.clone();

        let mut cache = CacheStore::new(&mut *self.store);
        let (result, events) = {
            let mut branch = Context::new(&mut cache, chain_id, block_height, block_time_nanos);
            let result = f(&mut branch);
            (result, branch.events)
        };

        let value = result?;
        cache.write()?;
        self.events.extend(events);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryKvStore;
    use crate::domain::IcqError;

    fn event(id: &str) -> QueryEvent {
        QueryEvent::QueryResponse {
            query_id: id.to_string(),
            chain_id: "gaia-1".to_string(),
            connection_id: "connection-0".to_string(),
            query_type: "store/bank/key".to_string(),
            request_data: String::new(),
            height: 1,
        }
    }

    #[test]
    fn test_run_atomic_commits_on_ok() {
        let mut store = InMemoryKvStore::new();
        {
            let mut ctx = Context::new(&mut store, "stride-1", 10, 1_000);
            let out: Result<u8, IcqError> = ctx.run_atomic(|inner| {
                inner.store_mut().put(b"k", b"v")?;
                inner.emit_event(event("a"));
                Ok(7)
            });
            assert_eq!(out.unwrap(), 7);
            assert_eq!(ctx.events().len(), 1);
        }
        assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn test_run_atomic_rolls_back_on_err() {
        let mut store = InMemoryKvStore::new();
        store.put(b"existing", b"1").unwrap();
        {
            let mut ctx = Context::new(&mut store, "stride-1", 10, 1_000);
            let out: Result<(), IcqError> = ctx.run_atomic(|inner| {
                inner.store_mut().delete(b"existing")?;
                inner.store_mut().put(b"new", b"2")?;
                inner.emit_event(event("a"));
                Err(IcqError::InvalidProof("bad".to_string()))
            });
            assert!(out.is_err());
            assert!(ctx.events().is_empty());
        }
        assert_eq!(store.get(b"existing").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get(b"new").unwrap(), None);
    }

    #[test]
    fn test_branch_sees_block_info() {
        let mut store = InMemoryKvStore::new();
        let mut ctx = Context::new(&mut store, "stride-1", 42, 9_000);
        let seen: Result<(u64, u64, String), IcqError> = ctx.run_atomic(|inner| {
            Ok((
                inner.block_height(),
                inner.block_time_nanos(),
                inner.chain_id().to_string(),
            ))
        });
        assert_eq!(seen.unwrap(), (42, 9_000, "stride-1".to_string()));
    }

    #[test]
    fn test_nested_atomic_inner_failure_keeps_outer_writes() {
        let mut store = InMemoryKvStore::new();
        {
            let mut ctx = Context::new(&mut store, "stride-1", 1, 1);
            let out: Result<(), IcqError> = ctx.run_atomic(|outer| {
                outer.store_mut().put(b"outer", b"1")?;
                let inner: Result<(), IcqError> = outer.run_atomic(|inner| {
                    inner.store_mut().put(b"inner", b"2")?;
                    Err(IcqError::Codec("x".to_string()))
                });
                assert!(inner.is_err());
                Ok(())
            });
            assert!(out.is_ok());
        }
        assert_eq!(store.get(b"outer").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get(b"inner").unwrap(), None);
    }
}
