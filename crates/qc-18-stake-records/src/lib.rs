//! # QC-18 Stake Records
//!
//! Epoch unbonding records and the redemption-unlock callback driven by
//! interchain query responses.
//!
//! **Subsystem ID:** 18
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! When unbonded tokens are transferred back from a host zone, the host
//! reports the outcome through an interchain query. On success the host
//! zone unbonding of every referenced epoch moves from
//! `ExitTransferQueue` to `Claimable` and its full native amount becomes
//! claimable. Timeouts and host failures leave every record untouched.
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-stake-records/
//! ├── domain/          # Records, unbonding lifecycle, callback payloads
//! ├── application/     # Record store, redemption unlock
//! └── adapters/        # QueryCallbacks binding for qc-15
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod domain;

// Re-exports
pub use adapters::{
    redemption_query, StakeRecordsCallbacks, RECORDS_MODULE, REDEMPTION_CALLBACK_ID,
};
pub use application::{
    all_epoch_unbonding_records, get_epoch_unbonding_record, redemption_callback,
    set_epoch_unbonding_record,
};
pub use domain::{
    AckResponseStatus, AcknowledgementResponse, EpochUnbondingRecord, HostZoneUnbonding,
    HostZoneUnbondingStatus, RecordsError, RedemptionCallbackArgs,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
