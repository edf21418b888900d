//! Data Transfer Objects for the HTTP API.
//!
//! Impact summaries are returned as the engine's own serializable models; the
//! types here cover query parameters and the small metadata responses.

use serde::{Deserialize, Serialize};

pub use crate::api::{AreaMetrics, ImpactMetrics, MetricWithCI, ScenarioImpact, YearMetrics};

/// Query parameters for the scenario impact endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactQueryParams {
    /// Provider-specific age group label
    pub age_group: String,
    /// First year to include (inclusive, optional)
    #[serde(default)]
    pub year_from: Option<i32>,
    /// Last year to include (inclusive, optional)
    #[serde(default)]
    pub year_to: Option<i32>,
}

/// Age groups offered by a tenant's provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeGroupsResponse {
    pub age_groups: Vec<String>,
}

/// Year extent of a tenant's impact data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRangeResponse {
    pub min_year: i32,
    pub max_year: i32,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Scenario store connection status
    pub database: String,
    /// Tenants with a configured impact provider
    pub tenants: Vec<String>,
}
