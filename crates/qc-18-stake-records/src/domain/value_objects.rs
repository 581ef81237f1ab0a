//! # Domain Value Objects
//!
//! Unbonding lifecycle states and acknowledgement statuses.

use serde::{Deserialize, Serialize};

/// Lifecycle of a host zone's unbonding within one epoch.
///
/// ```text
/// UnbondingQueue → UnbondingInProgress → ExitTransferQueue → Claimable
///                        ↑        │
///                        └─ UnbondingRetryQueue
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostZoneUnbondingStatus {
    /// Waiting for the unbonding to be sent to the host.
    UnbondingQueue,
    /// Undelegation sent, waiting for the unbonding period.
    UnbondingInProgress,
    /// Unbonding failed and will be re-sent.
    UnbondingRetryQueue,
    /// Unbonded, waiting for the transfer to the redemption account.
    ExitTransferQueue,
    /// Tokens arrived: users may claim.
    Claimable,
}

impl HostZoneUnbondingStatus {
    /// Check if transition to `next` is valid.
    pub fn can_transition_to(&self, next: HostZoneUnbondingStatus) -> bool {
        matches!(
            (self, next),
            (Self::UnbondingQueue, Self::UnbondingInProgress)
                | (Self::UnbondingInProgress, Self::ExitTransferQueue)
                | (Self::UnbondingInProgress, Self::UnbondingRetryQueue)
                | (Self::UnbondingRetryQueue, Self::UnbondingInProgress)
                | (Self::ExitTransferQueue, Self::Claimable)
        )
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Claimable)
    }
}

/// Outcome of a host-chain action as reported back to this chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckResponseStatus {
    /// The action executed on the host.
    Success,
    /// The packet timed out before reaching the host.
    Timeout,
    /// The host rejected the action.
    Failure,
}
