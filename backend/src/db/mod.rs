//! Database module for the stores the impact engine reads from.
//!
//! This module provides abstractions for storage access via the Repository
//! pattern, allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP layer / callers                                   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services::impact) + impact providers    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────────┐
//!     │                                  │
//! ┌───▼──────────────────┐   ┌───────────▼─────────┐
//! │  Local Repositories  │   │ Postgres Repository │
//! │  (in-memory, JSON)   │   │ (Diesel, feature)   │
//! └──────────────────────┘   └─────────────────────┘
//! ```
//!
//! # Module Layout
//! - `repository`: Trait definitions and error types
//! - `repositories::local`: In-memory assignment and budget store
//! - `repositories::local_impact`: In-memory impact data sets
//! - `repositories::postgres`: Postgres implementation of every store
//! - `factory`: Creates store handles from configuration
//! - `repo_config`: `impact.toml` parsing

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

pub use factory::{
    BackendHandles, RepositoryFactory, RepositoryType, ScenarioStores, SharedImpactStores,
};
pub use repo_config::{ImpactConfig, TenantSettings};
pub use repositories::{LocalAggregateStore, LocalReplicateStore, LocalRepository};
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    AggregateImpactStore, AssignmentRepository, BudgetRepository, ErrorContext, RepositoryError,
    RepositoryResult, ReplicateImpactStore,
};
