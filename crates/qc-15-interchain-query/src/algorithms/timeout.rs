//! # Timeout Policy Resolution
//!
//! Decides the fate of a response from the query deadline, the block time
//! and the policy fixed at submission.

use crate::domain::{IcqError, Query, TimeoutPolicy};

/// Outcome of timeout resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeoutDecision {
    /// Deadline not passed: dispatch normally.
    NotExpired,
    /// Late: drop the response.
    Reject,
    /// Late: re-issue the query under a fresh id.
    Retry,
    /// Late: dispatch anyway.
    ExecuteCallback,
}

/// Resolve the timeout decision for `query` at `block_time_nanos`.
///
/// The stored policy is only decoded once the deadline has passed, so an
/// on-time response never fails on policy.
pub fn timeout_decision(query: &Query, block_time_nanos: u64) -> Result<TimeoutDecision, IcqError> {
    if !query.has_timed_out(block_time_nanos) {
        return Ok(TimeoutDecision::NotExpired);
    }

    match query.policy()? {
        TimeoutPolicy::RejectQueryResponse => Ok(TimeoutDecision::Reject),
        TimeoutPolicy::RetryQueryRequest => Ok(TimeoutDecision::Retry),
        TimeoutPolicy::ExecuteQueryCallback => Ok(TimeoutDecision::ExecuteCallback),
        TimeoutPolicy::Unspecified => Err(IcqError::UnsupportedTimeoutPolicy(
            TimeoutPolicy::Unspecified.into(),
        )),
    }
}
