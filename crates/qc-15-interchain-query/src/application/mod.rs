//! # Application Layer
//!
//! Execution context, query ledger, callback registry and the service
//! implementing the inbound API.

pub mod context;
pub mod ledger;
pub mod registry;
pub mod service;

pub use context::Context;
pub use registry::{CallbackRegistry, CallbackRegistryBuilder};
pub use service::InterchainQueryService;
