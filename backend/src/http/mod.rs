//! HTTP server module for the impact engine.
//!
//! This module exposes scenario impact summaries and provider metadata as a
//! small REST API on top of the service layer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Path/query parsing, tenant -> provider resolution      │
//! │  - JSON serialization, error mapping                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (services/impact.rs)                       │
//! │  - Grouping, provider calls, derived metrics, roll-up     │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Providers + Stores (providers/, db/)                     │
//! │  - Aggregate / replicate impact data                      │
//! │  - Assignments and budgets                                │
//! └──────────────────────────────────────────────────────────┘
//! ```

#[cfg(feature = "http-server")]
pub mod handlers;

#[cfg(feature = "http-server")]
pub mod router;

#[cfg(feature = "http-server")]
pub mod state;

#[cfg(feature = "http-server")]
pub mod error;

#[cfg(feature = "http-server")]
pub mod dto;

#[cfg(feature = "http-server")]
pub use router::create_router;

#[cfg(feature = "http-server")]
pub use state::AppState;
