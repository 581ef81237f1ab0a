//! Client Registry Adapter
//!
//! Implements the `ClientResolver` port over in-memory maps of connections,
//! client states and consensus states.

use crate::domain::{ClientState, ConnectionEnd, ConsensusState, Height};
use crate::ports::outbound::ClientResolver;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// In-memory light-client registry.
///
/// Stands in for the light-client tracking subsystem in tests and local
/// setups.
pub struct InMemoryClientRegistry {
    connections: RwLock<HashMap<String, ConnectionEnd>>,
    client_states: RwLock<HashMap<String, ClientState>>,
    consensus_states: RwLock<HashMap<(String, Height), ConsensusState>>,
}

impl InMemoryClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            client_states: RwLock::new(HashMap::new()),
            consensus_states: RwLock::new(HashMap::new()),
        }
    }

    /// Bind a connection to a client.
    pub fn add_connection(&self, connection_id: &str, client_id: &str) {
        self.connections.write().insert(
            connection_id.to_string(),
            ConnectionEnd {
                client_id: client_id.to_string(),
            },
        );
    }

    /// Set the latest client state.
    pub fn set_client_state(&self, client_id: &str, state: ClientState) {
        debug!(client_id, height = %state.latest_height(), "Client state updated");
        self.client_states.write().insert(client_id.to_string(), state);
    }

    /// Store the consensus state at `height`.
    pub fn set_consensus_state(&self, client_id: &str, height: Height, state: ConsensusState) {
        self.consensus_states
            .write()
            .insert((client_id.to_string(), height), state);
    }
}

impl Default for InMemoryClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientResolver for InMemoryClientRegistry {
    fn connection(&self, connection_id: &str) -> Option<ConnectionEnd> {
        self.connections.read().get(connection_id).cloned()
    }

    fn client_state(&self, client_id: &str) -> Option<ClientState> {
        self.client_states.read().get(client_id).cloned()
    }

    fn consensus_state(&self, client_id: &str, height: Height) -> Option<ConsensusState> {
        self.consensus_states
            .read()
            .get(&(client_id.to_string(), height))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommitmentRoot, TendermintConsensusState};

    #[test]
    fn test_lookups() {
        let registry = InMemoryClientRegistry::new();
        registry.add_connection("connection-0", "07-tendermint-0");
        registry.set_consensus_state(
            "07-tendermint-0",
            Height::new(1, 10),
            ConsensusState::Tendermint(TendermintConsensusState {
                root: CommitmentRoot([1u8; 32]),
                timestamp_nanos: 5,
            }),
        );

        let connection = registry.connection("connection-0").unwrap();
        assert_eq!(connection.client_id, "07-tendermint-0");
        assert!(registry.connection("connection-1").is_none());

        assert!(registry
            .consensus_state("07-tendermint-0", Height::new(1, 10))
            .is_some());
        // Exact height only.
        assert!(registry
            .consensus_state("07-tendermint-0", Height::new(1, 11))
            .is_none());
        assert!(registry
            .consensus_state("07-tendermint-0", Height::new(0, 10))
            .is_none());
        assert!(registry.client_state("07-tendermint-0").is_none());
    }
}
