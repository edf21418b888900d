//! Service layer for impact computation.
//!
//! Services orchestrate store and provider calls and implement the metric
//! derivation and aggregation rules.

pub mod derived;
pub mod impact;
pub mod summary;

pub use derived::{aggregate_metrics, averted_cases, cost_per_averted};
pub use impact::{ImpactQuery, ImpactService};
pub use summary::{summarize_scenario, AreaYearMetrics};
