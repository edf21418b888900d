//! Repository factory for dependency injection.
//!
//! This module creates the store handles the engine depends on from runtime
//! configuration. Concrete repositories are wrapped once per trait so callers
//! only ever see trait objects.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::ImpactConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::PostgresRepository;
use super::repository::{
    AggregateImpactStore, AssignmentRepository, BudgetRepository, RepositoryError,
    RepositoryResult, ReplicateImpactStore,
};
use super::PostgresConfig;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Postgres + Diesel implementation
    Postgres,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string ("postgres", "pg", "local", "memory").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variable.
    ///
    /// Reads `REPOSITORY_TYPE`. Defaults to Postgres if a database URL is
    /// present, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("DATABASE_URL").is_ok() || std::env::var("PG_DATABASE_URL").is_ok() {
            Self::Postgres
        } else {
            Self::Local
        }
    }
}

/// Assignment and budget stores consumed by the impact service.
#[derive(Clone)]
pub struct ScenarioStores {
    pub assignments: Arc<dyn AssignmentRepository>,
    pub budgets: Arc<dyn BudgetRepository>,
}

impl ScenarioStores {
    /// Use one local repository for both stores.
    pub fn from_local(repo: LocalRepository) -> Self {
        let repo = Arc::new(repo);
        Self {
            assignments: repo.clone(),
            budgets: repo,
        }
    }
}

/// Impact data sets shared by every tenant, when the back-end holds them.
#[derive(Clone)]
pub struct SharedImpactStores {
    pub aggregate: Arc<dyn AggregateImpactStore>,
    pub replicate: Arc<dyn ReplicateImpactStore>,
}

/// Everything a configured back-end provides.
#[derive(Clone)]
pub struct BackendHandles {
    pub stores: ScenarioStores,
    /// `None` for the local back-end, whose impact data comes from per-tenant
    /// data files instead.
    pub shared_impact: Option<SharedImpactStores>,
}

/// Repository factory for creating store handles.
///
/// # Example
/// ```ignore
/// use impact_engine::db::{ImpactConfig, RepositoryFactory};
///
/// let config = ImpactConfig::from_default_location()?;
/// let backend = RepositoryFactory::from_config(&config).await?;
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create back-end handles based on type.
    ///
    /// `postgres_config` is required for Postgres; `seed_file` optionally
    /// pre-populates the local repository.
    pub async fn create(
        repo_type: RepositoryType,
        postgres_config: Option<&PostgresConfig>,
        seed_file: Option<PathBuf>,
    ) -> RepositoryResult<BackendHandles> {
        match repo_type {
            RepositoryType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                {
                    let config = postgres_config.ok_or_else(|| {
                        RepositoryError::configuration(
                            "Postgres repository requires PostgresConfig",
                        )
                    })?;
                    let pg = Self::create_postgres(config).await?;
                    Ok(Self::postgres_handles(pg))
                }
                #[cfg(not(feature = "postgres-repo"))]
                {
                    let _ = postgres_config;
                    Err(RepositoryError::configuration(
                        "Postgres repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => {
                let repo = match seed_file {
                    Some(path) => {
                        log::info!("Seeding local repository from {}", path.display());
                        LocalRepository::from_json_file(path)?
                    }
                    None => LocalRepository::new(),
                };
                Ok(Self::local_handles(repo))
            }
        }
    }

    /// Create a Postgres repository.
    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> RepositoryResult<Arc<PostgresRepository>> {
        let repo = PostgresRepository::new(config.clone())?;
        Ok(Arc::new(repo))
    }

    #[cfg(feature = "postgres-repo")]
    fn postgres_handles(pg: Arc<PostgresRepository>) -> BackendHandles {
        BackendHandles {
            stores: ScenarioStores {
                assignments: pg.clone(),
                budgets: pg.clone(),
            },
            shared_impact: Some(SharedImpactStores {
                aggregate: pg.clone(),
                replicate: pg,
            }),
        }
    }

    /// Wrap a local repository as back-end handles.
    pub fn local_handles(repo: LocalRepository) -> BackendHandles {
        BackendHandles {
            stores: ScenarioStores::from_local(repo),
            shared_impact: None,
        }
    }

    /// Create handles backed by an empty in-memory repository.
    pub fn create_local() -> BackendHandles {
        Self::local_handles(LocalRepository::new())
    }

    /// Create back-end handles from an [`ImpactConfig`].
    pub async fn from_config(config: &ImpactConfig) -> RepositoryResult<BackendHandles> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        let postgres_config = config.to_postgres_config()?;
        let seed_file = config
            .local
            .seed_file
            .as_deref()
            .map(|path| config.resolve_path(path));

        Self::create(repo_type, postgres_config.as_ref(), seed_file).await
    }

    /// Create back-end handles from the default configuration file location.
    pub async fn from_default_config() -> RepositoryResult<BackendHandles> {
        let config = ImpactConfig::from_default_location()?;
        Self::from_config(&config).await
    }
}
