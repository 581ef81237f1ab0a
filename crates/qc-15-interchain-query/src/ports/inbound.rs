//! # Inbound Ports
//!
//! API trait defining what the Interchain Query subsystem can do.

use crate::application::Context;
use crate::domain::{IcqError, MsgSubmitQueryResponse, MsgSubmitQueryResponseResponse, Query};

/// Interchain query API - inbound port.
///
/// Each state-changing call is one atomic step: on error every write made
/// during the call is discarded.
pub trait InterchainQueryApi {
    /// Issue a new query. Returns the assigned query id.
    fn submit_query(
        &self,
        ctx: &mut Context<'_>,
        query: Query,
        force_unique: bool,
    ) -> Result<String, IcqError>;

    /// Process a relayer-submitted response.
    ///
    /// A response for an unknown query id is acknowledged without any
    /// state change.
    fn submit_query_response(
        &self,
        ctx: &mut Context<'_>,
        msg: MsgSubmitQueryResponse,
    ) -> Result<MsgSubmitQueryResponseResponse, IcqError>;

    /// Look up a pending query.
    fn get_query(&self, ctx: &Context<'_>, query_id: &str) -> Result<Option<Query>, IcqError>;

    /// All pending queries in id order.
    fn pending_queries(&self, ctx: &Context<'_>) -> Result<Vec<Query>, IcqError>;
}
