//! Repository trait definitions for the stores the engine reads from.
//!
//! This module provides a collection of focused repository traits that abstract
//! storage access. Splitting responsibilities across traits keeps each
//! implementation small and lets tests swap in fakes.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`assignment`]: Scenarios and intervention assignments
//! - [`budget`]: Costed budget records
//! - [`impact_data`]: Aggregate and replicate impact rows behind the providers

pub mod assignment;
pub mod budget;
pub mod error;
pub mod impact_data;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use assignment::AssignmentRepository;
pub use budget::BudgetRepository;
pub use impact_data::{AggregateImpactStore, ReplicateImpactStore};
