//! # Query Ledger
//!
//! Durable mapping of query id to pending query, plus the uid counter used
//! to force unique ids. Values are bincode-encoded under dedicated prefixes.

use crate::domain::{IcqError, Query};
use crate::ports::outbound::KeyValueStore;

/// Prefix of pending query entries.
pub const QUERY_PREFIX: &[u8] = b"icq/query/";

/// Key of the query uid counter.
pub const QUERY_UID_KEY: &[u8] = b"icq/uid";

fn query_key(query_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(QUERY_PREFIX.len() + query_id.len());
    key.extend_from_slice(QUERY_PREFIX);
    key.extend_from_slice(query_id.as_bytes());
    key
}

/// Load a pending query.
pub fn get_query<S>(store: &S, query_id: &str) -> Result<Option<Query>, IcqError>
where
    S: KeyValueStore + ?Sized,
{
    match store.get(&query_key(query_id))? {
        Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
        None => Ok(None),
    }
}

/// Insert or overwrite a pending query.
pub fn set_query<S>(store: &mut S, query: &Query) -> Result<(), IcqError>
where
    S: KeyValueStore + ?Sized,
{
    let bytes = bincode::serialize(query)?;
    store.put(&query_key(&query.id), &bytes)?;
    Ok(())
}

/// Remove a pending query. Removing an absent id is a no-op.
pub fn delete_query<S>(store: &mut S, query_id: &str) -> Result<(), IcqError>
where
    S: KeyValueStore + ?Sized,
{
    store.delete(&query_key(query_id))?;
    Ok(())
}

/// Every pending query, in id order.
pub fn all_queries<S>(store: &S) -> Result<Vec<Query>, IcqError>
where
    S: KeyValueStore + ?Sized,
{
    store
        .prefix_scan(QUERY_PREFIX)?
        .into_iter()
        .map(|(_, bytes)| bincode::deserialize(&bytes).map_err(IcqError::from))
        .collect()
}

/// Return the next query uid and advance the persisted counter.
pub fn next_query_uid<S>(store: &mut S) -> Result<u64, IcqError>
where
    S: KeyValueStore + ?Sized,
{
    let current = match store.get(QUERY_UID_KEY)? {
        Some(bytes) => {
            let raw: [u8; 8] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| IcqError::Codec("query uid is not 8 bytes".to_string()))?;
            u64::from_be_bytes(raw)
        }
        None => 0,
    };
    let next = current.saturating_add(1);
    store.put(QUERY_UID_KEY, &next.to_be_bytes())?;
    Ok(current)
}
