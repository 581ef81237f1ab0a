//! # Domain Value Objects
//!
//! Immutable value types for Interchain Queries.

use super::errors::{Hash, IcqError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Query type suffix marking a direct key lookup that must carry a proof.
pub const KEY_QUERY_SUFFIX: &str = "key";

/// Behaviour for a response that arrives after the query deadline.
///
/// Stored on the query as its raw `i32` discriminant so that an
/// unrecognized stored value surfaces as [`IcqError::UnsupportedTimeoutPolicy`]
/// instead of a decode failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum TimeoutPolicy {
    /// Never set. Not a valid policy.
    Unspecified = 0,
    /// Drop the late response silently.
    RejectQueryResponse = 1,
    /// Re-issue the original query under a fresh id.
    RetryQueryRequest = 2,
    /// Run the callback anyway with whatever result arrived.
    ExecuteQueryCallback = 3,
}

impl TimeoutPolicy {
    /// Canonical name of the policy.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            TimeoutPolicy::Unspecified => "UNSPECIFIED",
            TimeoutPolicy::RejectQueryResponse => "REJECT_QUERY_RESPONSE",
            TimeoutPolicy::RetryQueryRequest => "RETRY_QUERY_REQUEST",
            TimeoutPolicy::ExecuteQueryCallback => "EXECUTE_QUERY_CALLBACK",
        }
    }
}

impl TryFrom<i32> for TimeoutPolicy {
    type Error = IcqError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TimeoutPolicy::Unspecified),
            1 => Ok(TimeoutPolicy::RejectQueryResponse),
            2 => Ok(TimeoutPolicy::RetryQueryRequest),
            3 => Ok(TimeoutPolicy::ExecuteQueryCallback),
            other => Err(IcqError::UnsupportedTimeoutPolicy(other)),
        }
    }
}

impl From<TimeoutPolicy> for i32 {
    fn from(policy: TimeoutPolicy) -> Self {
        policy as i32
    }
}

/// Light-client height: revision number plus height within the revision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Height {
    /// Revision (epoch) of the counterparty chain.
    pub revision_number: u64,
    /// Block height within the revision.
    pub revision_height: u64,
}

impl Height {
    /// Create a new height.
    pub fn new(revision_number: u64, revision_height: u64) -> Self {
        Self {
            revision_number,
            revision_height,
        }
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.revision_number, self.revision_height)
    }
}

/// Parse the revision number out of a chain id of the form `name-N`.
///
/// Chain ids without a numeric suffix are revision 0.
pub fn parse_chain_revision(chain_id: &str) -> u64 {
    match chain_id.rsplit_once('-') {
        Some((name, revision)) if !name.is_empty() => revision.parse().unwrap_or(0),
        _ => 0,
    }
}

/// Whether a query type is a direct key lookup that must be proven.
///
/// Only the last `/`-separated segment is inspected; every other query type
/// is accepted without a proof.
pub fn is_key_query(query_type: &str) -> bool {
    query_type.rsplit('/').next() == Some(KEY_QUERY_SUFFIX)
}

/// Store name of a key query (`store/<name>/key` → `<name>`).
pub fn query_store_name(query_type: &str) -> Option<&str> {
    query_type.split('/').nth(1).filter(|name| !name.is_empty())
}

/// Root of a counterparty state commitment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentRoot(pub Hash);

impl CommitmentRoot {
    /// Raw root hash.
    pub fn hash(&self) -> &Hash {
        &self.0
    }
}

/// Hashing parameters of one level of a chained commitment proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSpec {
    /// Domain separator prepended to leaf preimages.
    pub leaf_prefix: u8,
    /// Domain separator prepended to inner-node preimages.
    pub inner_prefix: u8,
    /// Maximum number of inner steps a proof may take.
    pub max_depth: u32,
}

impl ProofSpec {
    /// Spec of an application substore tree.
    pub fn iavl() -> Self {
        Self {
            leaf_prefix: 0x00,
            inner_prefix: 0x01,
            max_depth: 64,
        }
    }

    /// Spec of the multistore tree committing substore roots.
    pub fn tendermint() -> Self {
        Self {
            leaf_prefix: 0x10,
            inner_prefix: 0x11,
            max_depth: 16,
        }
    }

    /// Specs for a `[substore, multistore]` chained proof.
    pub fn sdk_specs() -> Vec<ProofSpec> {
        vec![Self::iavl(), Self::tendermint()]
    }
}

/// Path of a key through a chained commitment: outermost segment first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerklePath {
    /// Path segments, outermost (store name) first.
    pub key_path: Vec<Vec<u8>>,
}

impl MerklePath {
    /// Path of `key` inside substore `store`.
    pub fn new(store: &str, key: &[u8]) -> Self {
        Self {
            key_path: vec![store.as_bytes().to_vec(), key.to_vec()],
        }
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.key_path.len()
    }

    /// True if the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.key_path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_policy_round_trips_discriminant() {
        for policy in [
            TimeoutPolicy::Unspecified,
            TimeoutPolicy::RejectQueryResponse,
            TimeoutPolicy::RetryQueryRequest,
            TimeoutPolicy::ExecuteQueryCallback,
        ] {
            assert_eq!(TimeoutPolicy::try_from(i32::from(policy)).unwrap(), policy);
        }
    }

    #[test]
    fn test_timeout_policy_unknown_value() {
        assert!(matches!(
            TimeoutPolicy::try_from(42),
            Err(IcqError::UnsupportedTimeoutPolicy(42))
        ));
    }

    #[test]
    fn test_parse_chain_revision() {
        assert_eq!(parse_chain_revision("cosmoshub-4"), 4);
        assert_eq!(parse_chain_revision("osmosis-1"), 1);
        assert_eq!(parse_chain_revision("localnet"), 0);
        assert_eq!(parse_chain_revision("evmos_9001-2"), 2);
        assert_eq!(parse_chain_revision("chain-abc"), 0);
        assert_eq!(parse_chain_revision("-5"), 0);
    }

    #[test]
    fn test_is_key_query() {
        assert!(is_key_query("store/bank/key"));
        assert!(is_key_query("store/staking/key"));
        assert!(!is_key_query("store/bank/subspace"));
        assert!(!is_key_query("cosmos.staking.v1beta1.Query/Delegation"));
        assert!(!is_key_query("store/bank/keys"));
    }

    #[test]
    fn test_query_store_name() {
        assert_eq!(query_store_name("store/bank/key"), Some("bank"));
        assert_eq!(query_store_name("store//key"), None);
        assert_eq!(query_store_name("key"), None);
    }

    #[test]
    fn test_merkle_path() {
        let path = MerklePath::new("bank", b"balances");
        assert_eq!(path.len(), 2);
        assert_eq!(path.key_path[0], b"bank".to_vec());
    }

    #[test]
    fn test_height_display() {
        assert_eq!(Height::new(4, 101).to_string(), "4-101");
    }
}
