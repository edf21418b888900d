//! # Impact Engine
//!
//! Malaria intervention impact aggregation engine.
//!
//! Given a scenario (a plan assigning interventions to areas), the engine asks
//! a tenant-specific impact data provider for modelled outcomes of each area's
//! intervention mix, derives averted cases and cost-effectiveness from the
//! scenario's latest budget, and rolls everything up per area, per year and for
//! the whole scenario.
//!
//! ## Architecture
//!
//! - [`models`]: Domain types (identifiers, metrics with confidence intervals,
//!   scenarios, impact summaries)
//! - [`db`]: Store traits, local and Postgres implementations, configuration
//! - [`providers`]: Impact data providers and the per-tenant registry
//! - [`services`]: Impact orchestration, derived metrics and roll-up
//! - [`http`]: Axum-based HTTP server and request handlers
//! - [`api`]: Consolidated public types

// Allow large error types - RepositoryError and ImpactError carry rich context
#![allow(clippy::result_large_err)]

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod providers;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

pub use error::{ImpactEngineResult, ImpactError};
