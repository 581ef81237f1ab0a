//! Interchain Query Callbacks Adapter
//!
//! Implements the `QueryCallbacks` port so the records module can be
//! registered with the query dispatcher.

use crate::application::redemption_callback;
use crate::domain::{AcknowledgementResponse, RecordsError, RedemptionCallbackArgs};
use qc_15_interchain_query::{
    CallbackError, Context, Query, QueryBuilder, QueryCallbacks, TimeoutPolicy,
};
use tracing::debug;

/// Module name the records callbacks are registered under.
pub const RECORDS_MODULE: &str = "records";

/// Callback id of the redemption unlock.
pub const REDEMPTION_CALLBACK_ID: &str = "redemption";

/// Query callbacks owned by the records module.
#[derive(Clone, Copy, Debug, Default)]
pub struct StakeRecordsCallbacks;

impl StakeRecordsCallbacks {
    /// Create the callbacks.
    pub fn new() -> Self {
        Self
    }
}

impl QueryCallbacks for StakeRecordsCallbacks {
    fn has_callback(&self, callback_id: &str) -> bool {
        callback_id == REDEMPTION_CALLBACK_ID
    }

    fn call(
        &self,
        ctx: &mut Context<'_>,
        callback_id: &str,
        result: &[u8],
        query: &Query,
    ) -> Result<(), CallbackError> {
        debug!(query_id = %query.id, callback_id, "[qc-18] Records callback invoked");
        match callback_id {
            REDEMPTION_CALLBACK_ID => {
                let ack = AcknowledgementResponse::decode(result)?;
                redemption_callback(ctx.store_mut(), &ack, &query.callback_data)?;
                Ok(())
            }
            other => Err(RecordsError::UnknownCallback(other.to_string()).into()),
        }
    }
}

/// Build the query that reports on a redemption transfer.
///
/// The result the relayer submits is an encoded [`AcknowledgementResponse`].
pub fn redemption_query(
    chain_id: &str,
    connection_id: &str,
    query_type: &str,
    request_data: Vec<u8>,
    args: &RedemptionCallbackArgs,
    timeout_duration: u64,
) -> Result<Query, RecordsError> {
    Ok(QueryBuilder::new(chain_id, connection_id, query_type)
        .request_data(request_data)
        .callback(RECORDS_MODULE, REDEMPTION_CALLBACK_ID)
        .callback_data(args.encode()?)
        .timeout_policy(TimeoutPolicy::RetryQueryRequest)
        .timeout_duration(timeout_duration)
        .build())
}
