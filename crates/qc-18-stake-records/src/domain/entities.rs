//! # Domain Entities
//!
//! Epoch unbonding records and the payloads carried through interchain
//! query callbacks.

use super::errors::RecordsError;
use super::value_objects::{AckResponseStatus, HostZoneUnbondingStatus};
use serde::{Deserialize, Serialize};

/// Unbonding of one host zone within one epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostZoneUnbonding {
    /// Host zone (counterparty chain id).
    pub host_zone_id: String,
    /// Native tokens being unbonded.
    pub native_token_amount: u128,
    /// Native tokens users may claim.
    pub claimable_native_tokens: u128,
    /// Lifecycle status.
    pub status: HostZoneUnbondingStatus,
    /// Ids of the user redemption records backed by this unbonding.
    pub user_redemption_records: Vec<String>,
}

impl HostZoneUnbonding {
    /// New unbonding in `UnbondingQueue`.
    pub fn new(host_zone_id: impl Into<String>, native_token_amount: u128) -> Self {
        Self {
            host_zone_id: host_zone_id.into(),
            native_token_amount,
            claimable_native_tokens: 0,
            status: HostZoneUnbondingStatus::UnbondingQueue,
            user_redemption_records: Vec::new(),
        }
    }

    /// Move to `next`, enforcing the lifecycle.
    pub fn transition_to(&mut self, next: HostZoneUnbondingStatus) -> Result<(), RecordsError> {
        if !self.status.can_transition_to(next) {
            return Err(RecordsError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Mark the unbonded tokens claimable.
    pub fn unlock(&mut self) -> Result<(), RecordsError> {
        self.transition_to(HostZoneUnbondingStatus::Claimable)?;
        self.claimable_native_tokens = self.native_token_amount;
        Ok(())
    }
}

/// All host zone unbondings of one epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochUnbondingRecord {
    /// Epoch number (record key).
    pub epoch_number: u64,
    /// Per-host-zone unbondings.
    pub host_zone_unbondings: Vec<HostZoneUnbonding>,
}

impl EpochUnbondingRecord {
    /// Index of the unbonding for `host_zone_id`.
    pub fn host_zone_unbonding_index(&self, host_zone_id: &str) -> Option<usize> {
        self.host_zone_unbondings
            .iter()
            .position(|hzu| hzu.host_zone_id == host_zone_id)
    }

    /// Unbonding for `host_zone_id`.
    pub fn host_zone_unbonding(&self, host_zone_id: &str) -> Option<&HostZoneUnbonding> {
        self.host_zone_unbonding_index(host_zone_id)
            .map(|i| &self.host_zone_unbondings[i])
    }
}

/// Arguments of the redemption callback, carried as query callback data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionCallbackArgs {
    /// Host zone whose unbondings are unlocked.
    pub host_zone_id: String,
    /// Epochs whose unbonding records are touched.
    pub epoch_unbonding_record_ids: Vec<u64>,
}

impl RedemptionCallbackArgs {
    /// Encode for the query's callback data.
    pub fn encode(&self) -> Result<Vec<u8>, RecordsError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode callback data.
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordsError> {
        bincode::deserialize(bytes).map_err(|e| RecordsError::MalformedCallbackArgs(e.to_string()))
    }
}

/// Host-side outcome of an action, carried as the query result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcknowledgementResponse {
    /// Outcome.
    pub status: AckResponseStatus,
    /// Host error, if any.
    pub error: String,
}

impl AcknowledgementResponse {
    /// Successful acknowledgement.
    pub fn success() -> Self {
        Self {
            status: AckResponseStatus::Success,
            error: String::new(),
        }
    }

    /// Acknowledgement with the given status.
    pub fn with_status(status: AckResponseStatus) -> Self {
        Self {
            status,
            error: String::new(),
        }
    }

    /// Encode as a query result.
    pub fn encode(&self) -> Result<Vec<u8>, RecordsError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a query result.
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordsError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
