//! # Record Store
//!
//! Epoch unbonding records keyed by big-endian epoch number, so that a
//! prefix scan returns them in epoch order.

use crate::domain::{EpochUnbondingRecord, RecordsError};
use qc_15_interchain_query::{BatchOperation, KeyValueStore};

/// Prefix of epoch unbonding records.
pub const EPOCH_UNBONDING_PREFIX: &[u8] = b"records/epoch_unbonding/";

/// Store key of the record for `epoch_number`.
pub fn epoch_unbonding_key(epoch_number: u64) -> Vec<u8> {
    let mut key = EPOCH_UNBONDING_PREFIX.to_vec();
    key.extend_from_slice(&epoch_number.to_be_bytes());
    key
}

/// Load the record of an epoch.
pub fn get_epoch_unbonding_record<S>(
    store: &S,
    epoch_number: u64,
) -> Result<Option<EpochUnbondingRecord>, RecordsError>
where
    S: KeyValueStore + ?Sized,
{
    match store.get(&epoch_unbonding_key(epoch_number))? {
        Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
        None => Ok(None),
    }
}

/// Insert or overwrite a record.
pub fn set_epoch_unbonding_record<S>(
    store: &mut S,
    record: &EpochUnbondingRecord,
) -> Result<(), RecordsError>
where
    S: KeyValueStore + ?Sized,
{
    store.put(
        &epoch_unbonding_key(record.epoch_number),
        &bincode::serialize(record)?,
    )?;
    Ok(())
}

/// Write several records in one atomic batch.
pub fn set_epoch_unbonding_records<S>(
    store: &mut S,
    records: &[EpochUnbondingRecord],
) -> Result<(), RecordsError>
where
    S: KeyValueStore + ?Sized,
{
    let operations = records
        .iter()
        .map(|record| {
            Ok(BatchOperation::put(
                epoch_unbonding_key(record.epoch_number),
                bincode::serialize(record)?,
            ))
        })
        .collect::<Result<Vec<_>, RecordsError>>()?;
    store.atomic_batch_write(operations)?;
    Ok(())
}

/// Every record, in epoch order.
pub fn all_epoch_unbonding_records<S>(store: &S) -> Result<Vec<EpochUnbondingRecord>, RecordsError>
where
    S: KeyValueStore + ?Sized,
{
    store
        .prefix_scan(EPOCH_UNBONDING_PREFIX)?
        .into_iter()
        .map(|(_, bytes)| bincode::deserialize(&bytes).map_err(RecordsError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HostZoneUnbonding;
    use qc_15_interchain_query::InMemoryKvStore;

    fn record(epoch: u64) -> EpochUnbondingRecord {
        EpochUnbondingRecord {
            epoch_number: epoch,
            host_zone_unbondings: vec![HostZoneUnbonding::new("gaia-4", 100)],
        }
    }

    #[test]
    fn test_set_and_get() {
        let mut store = InMemoryKvStore::new();
        set_epoch_unbonding_record(&mut store, &record(3)).unwrap();
        assert_eq!(get_epoch_unbonding_record(&store, 3).unwrap(), Some(record(3)));
        assert_eq!(get_epoch_unbonding_record(&store, 4).unwrap(), None);
    }

    #[test]
    fn test_all_in_epoch_order() {
        let mut store = InMemoryKvStore::new();
        set_epoch_unbonding_records(&mut store, &[record(300), record(2), record(17)]).unwrap();
        let epochs: Vec<u64> = all_epoch_unbonding_records(&store)
            .unwrap()
            .into_iter()
            .map(|r| r.epoch_number)
            .collect();
        assert_eq!(epochs, vec![2, 17, 300]);
    }
}
