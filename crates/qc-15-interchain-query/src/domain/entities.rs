//! # Domain Entities
//!
//! Pending queries, relayer-submitted responses, and the events emitted
//! around them.

use super::errors::IcqError;
use super::value_objects::{Height, TimeoutPolicy};
use serde::{Deserialize, Serialize};

/// A pending interchain query.
///
/// Owned by the query ledger from submission until a matching response is
/// accepted, at which point it is deleted before any callback runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Unique identifier (hex SHA-256 of the query key).
    pub id: String,
    /// Connection whose light client proves the response.
    pub connection_id: String,
    /// Counterparty chain id.
    pub chain_id: String,
    /// Query type, e.g. `store/bank/key`.
    pub query_type: String,
    /// Key or request payload sent to the counterparty.
    pub request_data: Vec<u8>,
    /// Module that issued the query.
    pub callback_module: String,
    /// Callback to invoke once the response is accepted.
    pub callback_id: String,
    /// Opaque payload handed back to the callback.
    pub callback_data: Vec<u8>,
    /// Raw [`TimeoutPolicy`] discriminant.
    pub timeout_policy: i32,
    /// Relative time-to-live in nanoseconds.
    pub timeout_duration: u64,
    /// Absolute deadline in block-time nanoseconds.
    pub timeout_timestamp: u64,
    /// Whether the relayer has picked the request up.
    pub request_sent: bool,
    /// Light-client height when the query was submitted.
    pub submission_height: u64,
}

impl Query {
    /// Decode the stored timeout policy.
    pub fn policy(&self) -> Result<TimeoutPolicy, IcqError> {
        TimeoutPolicy::try_from(self.timeout_policy)
    }

    /// True once the block time has passed the deadline.
    pub fn has_timed_out(&self, block_time_nanos: u64) -> bool {
        block_time_nanos > self.timeout_timestamp
    }

    /// Key from which the query id is derived.
    ///
    /// Two queries with the same key share an id unless forced unique.
    pub fn query_key(&self) -> Vec<u8> {
        format!(
            "{}-{}-{}-{}-{}-{}",
            self.connection_id,
            self.chain_id,
            self.query_type,
            hex::encode(&self.request_data),
            self.callback_module,
            self.callback_id
        )
        .into_bytes()
    }

    /// One-line summary for logs.
    pub fn description(&self) -> String {
        format!(
            "QueryId: {}, QueryType: {}, ConnectionId: {}, QueryRequest: {}",
            self.id,
            self.query_type,
            self.connection_id,
            hex::encode(&self.request_data)
        )
    }
}

/// Builder for new queries.
///
/// The id, submission height, and deadline are assigned at submission.
#[derive(Clone, Debug)]
pub struct QueryBuilder {
    chain_id: String,
    connection_id: String,
    query_type: String,
    request_data: Vec<u8>,
    callback_module: String,
    callback_id: String,
    callback_data: Vec<u8>,
    timeout_policy: TimeoutPolicy,
    timeout_duration: u64,
}

impl QueryBuilder {
    /// Create a builder with the required routing fields.
    pub fn new(
        chain_id: impl Into<String>,
        connection_id: impl Into<String>,
        query_type: impl Into<String>,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            connection_id: connection_id.into(),
            query_type: query_type.into(),
            request_data: Vec::new(),
            callback_module: String::new(),
            callback_id: String::new(),
            callback_data: Vec::new(),
            timeout_policy: TimeoutPolicy::RejectQueryResponse,
            timeout_duration: 0,
        }
    }

    /// Set the request payload.
    pub fn request_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.request_data = data.into();
        self
    }

    /// Set the owning module and callback id.
    pub fn callback(mut self, module: impl Into<String>, callback_id: impl Into<String>) -> Self {
        self.callback_module = module.into();
        self.callback_id = callback_id.into();
        self
    }

    /// Set the opaque callback payload.
    pub fn callback_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.callback_data = data.into();
        self
    }

    /// Set the timeout policy.
    pub fn timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.timeout_policy = policy;
        self
    }

    /// Set the time-to-live in nanoseconds.
    pub fn timeout_duration(mut self, nanos: u64) -> Self {
        self.timeout_duration = nanos;
        self
    }

    /// Build the query.
    pub fn build(self) -> Query {
        Query {
            id: String::new(),
            connection_id: self.connection_id,
            chain_id: self.chain_id,
            query_type: self.query_type,
            request_data: self.request_data,
            callback_module: self.callback_module,
            callback_id: self.callback_id,
            callback_data: self.callback_data,
            timeout_policy: self.timeout_policy.into(),
            timeout_duration: self.timeout_duration,
            timeout_timestamp: 0,
            request_sent: false,
            submission_height: 0,
        }
    }
}

/// A single operation of a relayer-supplied proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOp {
    /// Proof encoding tag.
    pub field_type: String,
    /// Key proven by this op.
    pub key: Vec<u8>,
    /// Encoded commitment proof.
    pub data: Vec<u8>,
}

/// Chained proof operations, innermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOps {
    /// Operations, innermost (substore) first.
    pub ops: Vec<ProofOp>,
}

/// Relayer-submitted query response. Transient, never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSubmitQueryResponse {
    /// Counterparty chain id.
    pub chain_id: String,
    /// Id of the query being answered.
    pub query_id: String,
    /// Query result; empty means the key is absent.
    pub result: Vec<u8>,
    /// Proof of the result, required for key queries.
    pub proof_ops: Option<ProofOps>,
    /// Counterparty height the result was read at.
    pub height: i64,
    /// Relayer address.
    pub from_address: String,
}

impl MsgSubmitQueryResponse {
    /// Stateless checks performed before touching the ledger.
    pub fn validate_basic(&self) -> Result<(), IcqError> {
        if self.query_id.trim().is_empty() {
            return Err(IcqError::InvalidMessage("query id cannot be empty".to_string()));
        }
        if self.chain_id.trim().is_empty() {
            return Err(IcqError::InvalidMessage("chain id cannot be empty".to_string()));
        }
        if self.from_address.trim().is_empty() {
            return Err(IcqError::InvalidMessage("sender address cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Empty acknowledgement of a processed response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSubmitQueryResponseResponse {}

/// Events emitted for relayers and indexers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryEvent {
    /// A new query is waiting for a relayer.
    QueryRequest {
        /// Query id.
        query_id: String,
        /// Counterparty chain id.
        chain_id: String,
        /// Connection id.
        connection_id: String,
        /// Query type.
        query_type: String,
        /// Hex-encoded request data.
        request_data: String,
        /// Block height of the request.
        height: u64,
    },

    /// A response was accepted for processing.
    QueryResponse {
        /// Query id.
        query_id: String,
        /// Counterparty chain id.
        chain_id: String,
        /// Connection id.
        connection_id: String,
        /// Query type.
        query_type: String,
        /// Hex-encoded request data.
        request_data: String,
        /// Block height of the response.
        height: u64,
    },
}

impl QueryEvent {
    /// Request event for a freshly stored query.
    pub fn request(query: &Query, height: u64) -> Self {
        QueryEvent::QueryRequest {
            query_id: query.id.clone(),
            chain_id: query.chain_id.clone(),
            connection_id: query.connection_id.clone(),
            query_type: query.query_type.clone(),
            request_data: hex::encode(&query.request_data),
            height,
        }
    }

    /// Response event for an accepted response.
    pub fn response(query: &Query, height: u64) -> Self {
        QueryEvent::QueryResponse {
            query_id: query.id.clone(),
            chain_id: query.chain_id.clone(),
            connection_id: query.connection_id.clone(),
            query_type: query.query_type.clone(),
            request_data: hex::encode(&query.request_data),
            height,
        }
    }

    /// Id of the query the event is about.
    pub fn query_id(&self) -> &str {
        match self {
            QueryEvent::QueryRequest { query_id, .. } | QueryEvent::QueryResponse { query_id, .. } => {
                query_id
            }
        }
    }
}

/// Connection end as tracked locally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEnd {
    /// Light client bound to the connection.
    pub client_id: String,
}

/// Tendermint light-client state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TendermintClientState {
    /// Counterparty chain id.
    pub chain_id: String,
    /// Latest height the client has verified.
    pub latest_height: Height,
    /// Proof specs, innermost first.
    pub proof_specs: Vec<super::value_objects::ProofSpec>,
}

/// Light-client state of any client type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientState {
    /// `07-tendermint` client.
    Tendermint(TendermintClientState),
    /// Any other client type, which cannot prove key queries.
    Other {
        /// Client type identifier, e.g. `06-solomachine`.
        client_type: String,
        /// Latest height the client has verified.
        latest_height: Height,
    },
}

impl ClientState {
    /// Client type identifier.
    pub fn client_type(&self) -> &str {
        match self {
            ClientState::Tendermint(_) => TENDERMINT_CLIENT_TYPE,
            ClientState::Other { client_type, .. } => client_type,
        }
    }

    /// Latest verified height.
    pub fn latest_height(&self) -> Height {
        match self {
            ClientState::Tendermint(state) => state.latest_height,
            ClientState::Other { latest_height, .. } => *latest_height,
        }
    }
}

/// Tendermint consensus state at one height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TendermintConsensusState {
    /// App hash committed by the block header.
    pub root: super::value_objects::CommitmentRoot,
    /// Header timestamp in nanoseconds.
    pub timestamp_nanos: u64,
}

/// Consensus state of any client type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsensusState {
    /// `07-tendermint` consensus state.
    Tendermint(TendermintConsensusState),
    /// Any other client type.
    Other {
        /// Client type identifier.
        client_type: String,
    },
}

impl ConsensusState {
    /// Client type identifier.
    pub fn client_type(&self) -> &str {
        match self {
            ConsensusState::Tendermint(_) => TENDERMINT_CLIENT_TYPE,
            ConsensusState::Other { client_type } => client_type,
        }
    }
}

/// Client type identifier of Tendermint light clients.
pub const TENDERMINT_CLIENT_TYPE: &str = "07-tendermint";
