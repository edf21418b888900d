//! Repository implementations module.
//!
//! This module contains the implementations of the store traits:
//! - `postgres`: PostgreSQL implementation with Diesel ORM (all stores)
//! - `local`: In-memory assignment and budget stores for testing and local development
//! - `local_impact`: In-memory impact data sets loaded from JSON
pub mod local;
pub mod local_impact;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::{LocalRepository, LocalSeed, SeedAssignment};
pub use local_impact::{LocalAggregateStore, LocalReplicateStore};
#[cfg(feature = "postgres-repo")]
pub use postgres::{PostgresConfig, PostgresRepository};
