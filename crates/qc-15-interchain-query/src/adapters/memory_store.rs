//! In-Memory and Cache-Wrapped Stores
//!
//! Implements the `KeyValueStore` port.
//!
//! `CacheStore` buffers every write of one state transition on top of a
//! parent store and flushes them with a single atomic batch, so a failed
//! transition leaves the parent untouched.

use crate::domain::KvStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use std::collections::BTreeMap;

/// In-memory key-value store.
///
/// Ordered so that prefix scans are deterministic across replicas.
#[derive(Clone, Debug, Default)]
pub struct InMemoryKvStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryKvStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KeyValueStore for InMemoryKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KvStoreError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KvStoreError> {
        self.data.remove(key);
        Ok(())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KvStoreError> {
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    self.data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    self.data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvStoreError> {
        Ok(self
            .data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

/// Write buffer over a parent store.
///
/// Reads see buffered writes first. Dropping the cache discards them;
/// [`CacheStore::write`] commits them to the parent in one batch.
pub struct CacheStore<'p> {
    parent: &'p mut (dyn KeyValueStore + 'p),
    // None marks a buffered delete.
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'p> CacheStore<'p> {
    /// Wrap a parent store.
    pub fn new(parent: &'p mut (dyn KeyValueStore + 'p)) -> Self {
        Self {
            parent,
            writes: BTreeMap::new(),
        }
    }

    /// Number of buffered operations.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Commit every buffered write to the parent atomically.
    pub fn write(self) -> Result<(), KvStoreError> {
        let operations: Vec<BatchOperation> = self
            .writes
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => BatchOperation::Put { key, value },
                None => BatchOperation::Delete { key },
            })
            .collect();
        if operations.is_empty() {
            return Ok(());
        }
        self.parent.atomic_batch_write(operations)
    }
}

impl KeyValueStore for CacheStore<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvStoreError> {
        match self.writes.get(key) {
            Some(buffered) => Ok(buffered.clone()),
            None => self.parent.get(key),
        }
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KvStoreError> {
        self.writes.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KvStoreError> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KvStoreError> {
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    self.writes.insert(key, Some(value));
                }
                BatchOperation::Delete { key } => {
                    self.writes.insert(key, None);
                }
            }
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvStoreError> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.prefix_scan(prefix)?.into_iter().collect();

        for (key, value) in self
            .writes
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
        {
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        Ok(merged.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kv_store_operations() {
        let mut store = InMemoryKvStore::new();
        store.put(b"a", b"1").unwrap();
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert!(store.exists(b"a").unwrap());

        store.delete(b"a").unwrap();
        assert_eq!(store.get(b"a").unwrap(), None);
    }

    #[test]
    fn test_prefix_scan_is_ordered() {
        let mut store = InMemoryKvStore::new();
        store.put(b"q/c", b"3").unwrap();
        store.put(b"q/a", b"1").unwrap();
        store.put(b"r/a", b"x").unwrap();
        store.put(b"q/b", b"2").unwrap();

        let keys: Vec<Vec<u8>> = store
            .prefix_scan(b"q/")
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![b"q/a".to_vec(), b"q/b".to_vec(), b"q/c".to_vec()]);
    }

    #[test]
    fn test_cache_store_commit() {
        let mut parent = InMemoryKvStore::new();
        parent.put(b"keep", b"1").unwrap();
        parent.put(b"gone", b"2").unwrap();

        let mut cache = CacheStore::new(&mut parent);
        cache.put(b"new", b"3").unwrap();
        cache.delete(b"gone").unwrap();
        assert_eq!(cache.get(b"gone").unwrap(), None);
        assert_eq!(cache.get(b"keep").unwrap(), Some(b"1".to_vec()));
        assert_eq!(cache.pending_writes(), 2);
        cache.write().unwrap();

        assert_eq!(parent.get(b"new").unwrap(), Some(b"3".to_vec()));
        assert_eq!(parent.get(b"gone").unwrap(), None);
        assert_eq!(parent.get(b"keep").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn test_cache_store_discard_on_drop() {
        let mut parent = InMemoryKvStore::new();
        parent.put(b"k", b"v").unwrap();
        {
            let mut cache = CacheStore::new(&mut parent);
            cache.delete(b"k").unwrap();
            cache.put(b"other", b"x").unwrap();
        }
        assert_eq!(parent.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(parent.len(), 1);
    }

    #[test]
    fn test_cache_prefix_scan_merges_writes() {
        let mut parent = InMemoryKvStore::new();
        parent.put(b"p/1", b"a").unwrap();
        parent.put(b"p/2", b"b").unwrap();

        let mut cache = CacheStore::new(&mut parent);
        cache.delete(b"p/1").unwrap();
        cache.put(b"p/3", b"c").unwrap();
        cache.put(b"p/2", b"B").unwrap();

        let scanned = cache.prefix_scan(b"p/").unwrap();
        assert_eq!(
            scanned,
            vec![
                (b"p/2".to_vec(), b"B".to_vec()),
                (b"p/3".to_vec(), b"c".to_vec()),
            ]
        );
    }

    #[test]
    fn test_nested_cache_stores() {
        let mut parent = InMemoryKvStore::new();
        {
            let mut outer = CacheStore::new(&mut parent);
            outer.put(b"outer", b"1").unwrap();
            {
                let mut inner = CacheStore::new(&mut outer);
                inner.put(b"inner", b"2").unwrap();
                assert_eq!(inner.get(b"outer").unwrap(), Some(b"1".to_vec()));
                inner.write().unwrap();
            }
            outer.write().unwrap();
        }
        assert_eq!(parent.len(), 2);
    }
}
