//! Per-tenant provider lookup.

use std::collections::HashMap;
use std::sync::Arc;

use super::ImpactProvider;
use crate::db::repository::ErrorContext;
use crate::error::{ImpactEngineResult, ImpactError};
use crate::models::TenantId;

/// Resolves the impact provider configured for a tenant.
///
/// A tenant without a provider is a normal state meaning "no impact data
/// available", so lookups return `Option`.
pub trait ProviderRegistry: Send + Sync {
    fn provider_for(&self, tenant: &TenantId) -> Option<Arc<dyn ImpactProvider>>;

    /// Tenants with a configured provider, sorted.
    fn tenants(&self) -> Vec<TenantId>;
}

/// Look up a tenant's provider, turning absence into a configuration error.
pub fn resolve_provider(
    registry: &dyn ProviderRegistry,
    tenant: &TenantId,
) -> ImpactEngineResult<Arc<dyn ImpactProvider>> {
    registry.provider_for(tenant).ok_or_else(|| ImpactError::Configuration {
        message: format!("No impact provider configured for tenant '{}'", tenant),
        context: ErrorContext::new("resolve_provider")
            .with_entity("tenant")
            .with_entity_id(tenant),
    })
}

/// Registry held in memory, built at start-up.
#[derive(Clone, Default)]
pub struct LocalProviderRegistry {
    providers: HashMap<TenantId, Arc<dyn ImpactProvider>>,
}

impl std::fmt::Debug for LocalProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalProviderRegistry")
            .field("tenants", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl LocalProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the provider for a tenant.
    pub fn register(&mut self, tenant: impl Into<TenantId>, provider: Arc<dyn ImpactProvider>) {
        self.providers.insert(tenant.into(), provider);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_provider(
        mut self,
        tenant: impl Into<TenantId>,
        provider: Arc<dyn ImpactProvider>,
    ) -> Self {
        self.register(tenant, provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ProviderRegistry for LocalProviderRegistry {
    fn provider_for(&self, tenant: &TenantId) -> Option<Arc<dyn ImpactProvider>> {
        self.providers.get(tenant).cloned()
    }

    fn tenants(&self) -> Vec<TenantId> {
        let mut tenants: Vec<TenantId> = self.providers.keys().cloned().collect();
        tenants.sort();
        tenants
    }
}
