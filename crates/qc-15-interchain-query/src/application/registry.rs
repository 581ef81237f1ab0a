//! # Callback Registry & Dispatcher
//!
//! Module-indexed registry of callback capability objects. Built once at
//! composition time and immutable afterwards.
//!
//! Dispatch scans module names in lexicographic order and invokes the first
//! module that claims the callback id, so every replica selects the same
//! handler regardless of registration order.

use std::collections::BTreeMap;
use tracing::debug;

use super::context::Context;
use crate::domain::{IcqError, Query};
use crate::ports::outbound::QueryCallbacks;

/// Immutable registry of callback modules.
pub struct CallbackRegistry {
    modules: BTreeMap<String, Box<dyn QueryCallbacks>>,
}

impl CallbackRegistry {
    /// Start a new registry.
    pub fn builder() -> CallbackRegistryBuilder {
        CallbackRegistryBuilder::default()
    }

    /// Registered module names in dispatch order.
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.keys().map(String::as_str).collect()
    }

    /// Whether a module is registered under `module`.
    pub fn is_registered(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// True if no module is registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Name of the module that would handle `callback_id`.
    pub fn resolve(&self, callback_id: &str) -> Option<&str> {
        self.modules
            .iter()
            .find(|(_, callbacks)| callbacks.has_callback(callback_id))
            .map(|(name, _)| name.as_str())
    }

    /// Whether `module` is registered and claims `callback_id`.
    pub fn module_claims(&self, module: &str, callback_id: &str) -> bool {
        self.modules
            .get(module)
            .is_some_and(|callbacks| callbacks.has_callback(callback_id))
    }

    /// Invoke the callback of `query` with `result`.
    ///
    /// At most one callback runs per call.
    pub fn dispatch(
        &self,
        ctx: &mut Context<'_>,
        query: &Query,
        result: &[u8],
    ) -> Result<(), IcqError> {
        let callback_id = query.callback_id.as_str();
        let (module, callbacks) = self
            .modules
            .iter()
            .find(|(_, callbacks)| callbacks.has_callback(callback_id))
            .ok_or_else(|| {
                IcqError::CallbackNotFound(format!(
                    "callback {} for query {} not found in any module",
                    callback_id, query.id
                ))
            })?;

        debug!(
            query_id = %query.id,
            module = %module,
            callback_id = %callback_id,
            "[qc-15] Dispatching ICQ callback"
        );

        callbacks
            .call(ctx, callback_id, result, query)
            .map_err(|source| IcqError::CallbackFailed {
                module: module.clone(),
                callback_id: callback_id.to_string(),
                source,
            })
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("modules", &self.module_names())
            .finish()
    }
}

/// Builder for [`CallbackRegistry`].
#[derive(Default)]
pub struct CallbackRegistryBuilder {
    modules: BTreeMap<String, Box<dyn QueryCallbacks>>,
}

impl CallbackRegistryBuilder {
    /// Register a module. Fails if the name is already taken.
    pub fn register(
        mut self,
        module: impl Into<String>,
        callbacks: Box<dyn QueryCallbacks>,
    ) -> Result<Self, IcqError> {
        let module = module.into();
        if module.is_empty() {
            return Err(IcqError::InvalidModule(module));
        }
        if self.modules.contains_key(&module) {
            return Err(IcqError::DuplicateModule(module));
        }
        self.modules.insert(module, callbacks);
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> CallbackRegistry {
        CallbackRegistry {
            modules: self.modules,
        }
    }
}
