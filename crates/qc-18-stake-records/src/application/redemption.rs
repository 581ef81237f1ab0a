//! # Redemption Unlock
//!
//! Runs once the host chain reports on the transfer of unbonded tokens to
//! the redemption account. On success every referenced host zone unbonding
//! becomes claimable; on timeout or failure nothing changes.
//!
//! All-or-nothing: every referenced record is loaded and updated in memory
//! before anything is written, so a missing record leaves the store
//! untouched. Unbondings that are already claimable are left as they are;
//! any other status outside `ExitTransferQueue` aborts the callback.

use tracing::{debug, info, warn};

use super::store::{get_epoch_unbonding_record, set_epoch_unbonding_records};
use crate::domain::{
    AckResponseStatus, AcknowledgementResponse, EpochUnbondingRecord, HostZoneUnbondingStatus,
    RecordsError, RedemptionCallbackArgs,
};
use qc_15_interchain_query::KeyValueStore;

/// Apply a redemption acknowledgement to the records named by `args`.
pub fn redemption_callback<S>(
    store: &mut S,
    ack: &AcknowledgementResponse,
    args: &[u8],
) -> Result<(), RecordsError>
where
    S: KeyValueStore + ?Sized,
{
    let args = RedemptionCallbackArgs::decode(args)?;
    let host_zone_id = args.host_zone_id.as_str();

    let mut staged: Vec<(EpochUnbondingRecord, usize)> =
        Vec::with_capacity(args.epoch_unbonding_record_ids.len());
    for &epoch_number in &args.epoch_unbonding_record_ids {
        let record = get_epoch_unbonding_record(&*store, epoch_number)?.ok_or_else(|| {
            RecordsError::RecordNotFound(format!(
                "epoch unbonding record {} not found",
                epoch_number
            ))
        })?;
        let index = record.host_zone_unbonding_index(host_zone_id).ok_or_else(|| {
            RecordsError::RecordNotFound(format!(
                "host zone unbonding record not found on epoch unbonding record {} for host zone {}",
                epoch_number, host_zone_id
            ))
        })?;
        staged.push((record, index));
    }

    match ack.status {
        AckResponseStatus::Success => {}
        AckResponseStatus::Timeout | AckResponseStatus::Failure => {
            warn!(
                host_zone = %host_zone_id,
                status = ?ack.status,
                error = %ack.error,
                "[qc-18] Redemption transfer did not complete, records unchanged"
            );
            return Ok(());
        }
    }

    let mut updated = Vec::with_capacity(staged.len());
    for (mut record, index) in staged {
        let hzu = &mut record.host_zone_unbondings[index];
        if hzu.status == HostZoneUnbondingStatus::Claimable {
            debug!(
                host_zone = %host_zone_id,
                epoch = record.epoch_number,
                "[qc-18] Host zone unbonding already claimable"
            );
            continue;
        }
        hzu.unlock()?;
        updated.push(record);
    }
    if !updated.is_empty() {
        set_epoch_unbonding_records(store, &updated)?;
    }

    info!(
        host_zone = %host_zone_id,
        epochs = ?args.epoch_unbonding_record_ids,
        "[qc-18] Host zone unbondings are claimable"
    );
    Ok(())
}
