//! # Adapters Layer (Hexagonal Architecture)
//!
//! Reference implementations of the outbound ports: storage, light-client
//! lookups, Merkle proof verification and event sinks.

mod client_registry;
mod event_sink;
mod memory_store;
mod merkle_engine;

pub use client_registry::InMemoryClientRegistry;
pub use event_sink::{RecordingEventSink, TracingEventSink};
pub use memory_store::{CacheStore, InMemoryKvStore};
pub use merkle_engine::MerkleCommitmentVerifier;
