//! Builds providers and the tenant registry from configuration.

use log::{info, warn};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::{
    AggregateImpactProvider, ImpactProvider, LocalProviderRegistry, ReplicateImpactProvider,
};
use crate::db::repositories::{LocalAggregateStore, LocalReplicateStore};
use crate::db::repository::ErrorContext;
use crate::db::{ImpactConfig, SharedImpactStores, TenantSettings};
use crate::error::{ImpactEngineResult, ImpactError};

/// Provider family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Pre-aggregated population-level data
    Aggregate,
    /// Per-seed stochastic replicates
    Replicate,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aggregate" | "population" => Ok(Self::Aggregate),
            "replicate" | "replicates" | "seed" => Ok(Self::Replicate),
            _ => Err(format!("Unknown provider kind: {}", s)),
        }
    }
}

/// Factory for impact providers.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider.
    ///
    /// Shared back-end stores take precedence; otherwise the provider reads
    /// its rows from `data_file`.
    pub fn create(
        kind: ProviderKind,
        data_file: Option<&Path>,
        shared: Option<&SharedImpactStores>,
    ) -> ImpactEngineResult<Arc<dyn ImpactProvider>> {
        if let Some(shared) = shared {
            return Ok(match kind {
                ProviderKind::Aggregate => {
                    Arc::new(AggregateImpactProvider::new(shared.aggregate.clone()))
                }
                ProviderKind::Replicate => {
                    Arc::new(ReplicateImpactProvider::new(shared.replicate.clone()))
                }
            });
        }

        let path = data_file.ok_or_else(|| {
            ImpactError::configuration(format!(
                "{:?} provider needs a data file when no database is configured",
                kind
            ))
        })?;

        Ok(match kind {
            ProviderKind::Aggregate => {
                let store = LocalAggregateStore::from_json_file(path)?;
                if store.is_empty() {
                    warn!("Aggregate data file {} has no rows", path.display());
                }
                info!(
                    "Loaded {} aggregate rows from {}",
                    store.len(),
                    path.display()
                );
                Arc::new(AggregateImpactProvider::new(Arc::new(store)))
            }
            ProviderKind::Replicate => {
                let store = LocalReplicateStore::from_json_file(path)?;
                if store.is_empty() {
                    warn!("Replicate data file {} has no rows", path.display());
                }
                info!(
                    "Loaded {} replicate rows from {}",
                    store.len(),
                    path.display()
                );
                Arc::new(ReplicateImpactProvider::new(Arc::new(store)))
            }
        })
    }

    /// Create the provider for one `[[tenants]]` entry.
    pub fn for_tenant(
        config: &ImpactConfig,
        tenant: &TenantSettings,
        shared: Option<&SharedImpactStores>,
    ) -> ImpactEngineResult<Arc<dyn ImpactProvider>> {
        let kind = ProviderKind::from_str(&tenant.provider).map_err(|e| {
            ImpactError::Configuration {
                message: e,
                context: ErrorContext::new("for_tenant")
                    .with_entity("tenant")
                    .with_entity_id(&tenant.tenant),
            }
        })?;
        let data_file = tenant
            .data_file
            .as_deref()
            .map(|path| config.resolve_path(path));
        Self::create(kind, data_file.as_deref(), shared)
    }

    /// Build the registry for every configured tenant.
    pub fn registry_from_config(
        config: &ImpactConfig,
        shared: Option<&SharedImpactStores>,
    ) -> ImpactEngineResult<LocalProviderRegistry> {
        let mut registry = LocalProviderRegistry::new();
        for tenant in &config.tenants {
            let provider = Self::for_tenant(config, tenant, shared)?;
            info!(
                "Tenant '{}' uses the {} impact provider",
                tenant.tenant,
                provider.name()
            );
            registry.register(tenant.tenant.as_str(), provider);
        }
        Ok(registry)
    }
}
