//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::ScenarioStores;
use crate::providers::ProviderRegistry;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Tenant -> impact provider lookup
    pub registry: Arc<dyn ProviderRegistry>,
    /// Assignment and budget stores
    pub stores: ScenarioStores,
}

impl AppState {
    /// Create a new application state.
    pub fn new(registry: Arc<dyn ProviderRegistry>, stores: ScenarioStores) -> Self {
        Self { registry, stores }
    }
}
