//! # Adapters Layer (Hexagonal Architecture)
//!
//! Binds the records module to the interchain query dispatcher.

mod icq_callbacks;

pub use icq_callbacks::{
    redemption_query, StakeRecordsCallbacks, RECORDS_MODULE, REDEMPTION_CALLBACK_ID,
};
