//! # Application Layer
//!
//! Record persistence and the redemption-unlock state machine.

pub mod redemption;
pub mod store;

pub use redemption::redemption_callback;
pub use store::{
    all_epoch_unbonding_records, epoch_unbonding_key, get_epoch_unbonding_record,
    set_epoch_unbonding_record, set_epoch_unbonding_records,
};
