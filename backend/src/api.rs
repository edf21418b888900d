//! Public API surface for the impact engine.
//!
//! This file consolidates the DTO types returned by the engine and the HTTP API.
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::models::ids::{AreaId, BudgetId, InterventionId, ScenarioId, TenantId};
pub use crate::models::impact::{
    AreaMetrics, ImpactMetrics, ImpactResult, ScenarioImpact, YearMetrics,
};
pub use crate::models::metric::MetricWithCI;
pub use crate::models::scenario::{
    Area, BudgetRecord, CostMap, Intervention, InterventionAssignment, Scenario,
};
pub use crate::services::impact::ImpactQuery;
