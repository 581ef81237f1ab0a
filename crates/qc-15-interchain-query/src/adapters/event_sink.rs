//! Event Sink Adapters
//!
//! Implements the `EventSink` port.

use crate::domain::QueryEvent;
use crate::ports::outbound::EventSink;
use parking_lot::Mutex;
use tracing::info;

/// Keeps every event in memory, in emission order.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<QueryEvent>>,
}

impl RecordingEventSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<QueryEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drop recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: QueryEvent) {
        self.events.lock().push(event);
    }
}

/// Writes every event to the `tracing` log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: QueryEvent) {
        match &event {
            QueryEvent::QueryRequest {
                query_id,
                chain_id,
                connection_id,
                query_type,
                request_data,
                height,
            } => info!(
                query_id = %query_id,
                chain_id = %chain_id,
                connection_id = %connection_id,
                query_type = %query_type,
                request_data = %request_data,
                height,
                "[qc-15] query_request"
            ),
            QueryEvent::QueryResponse {
                query_id,
                chain_id,
                connection_id,
                query_type,
                request_data,
                height,
            } => info!(
                query_id = %query_id,
                chain_id = %chain_id,
                connection_id = %connection_id,
                query_type = %query_type,
                request_data = %request_data,
                height,
                "[qc-15] query_response"
            ),
        }
    }
}
