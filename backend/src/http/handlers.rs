//! HTTP handlers for the REST API.
//!
//! Each handler resolves the tenant's impact provider and delegates to the
//! service layer.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};

use super::dto::{AgeGroupsResponse, HealthResponse, ImpactQueryParams, YearRangeResponse};
use super::error::AppError;
use super::state::AppState;
use crate::api::{ScenarioId, ScenarioImpact, TenantId};
use crate::providers::resolve_provider;
use crate::services::{ImpactQuery, ImpactService};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint reporting scenario store connectivity and the
/// configured tenants.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.stores.assignments.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
        tenants: state
            .registry
            .tenants()
            .into_iter()
            .map(|t| t.0)
            .collect(),
    }))
}

// =============================================================================
// Impact
// =============================================================================

/// GET /v1/tenants/{tenant}/scenarios/{scenario_id}/impact
///
/// Impact summary of a scenario for one age group and optional year window.
pub async fn get_scenario_impact(
    State(state): State<AppState>,
    Path((tenant, scenario_id)): Path<(String, i64)>,
    params: Result<Query<ImpactQueryParams>, QueryRejection>,
) -> HandlerResult<ScenarioImpact> {
    let Query(params) = params.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    if params.age_group.trim().is_empty() {
        return Err(AppError::BadRequest("age_group must not be empty".to_string()));
    }
    let provider = resolve_provider(state.registry.as_ref(), &TenantId::new(tenant))?;
    let service = ImpactService::from_stores(provider, &state.stores);

    let query = ImpactQuery::new(ScenarioId::new(scenario_id), params.age_group)
        .with_years(params.year_from, params.year_to);
    let impact = service.scenario_impact(&query).await?;
    Ok(Json(impact))
}

/// GET /v1/tenants/{tenant}/impact/age-groups
pub async fn get_age_groups(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> HandlerResult<AgeGroupsResponse> {
    let provider = resolve_provider(state.registry.as_ref(), &TenantId::new(tenant))?;
    let age_groups = provider.get_age_groups().await?;
    Ok(Json(AgeGroupsResponse { age_groups }))
}

/// GET /v1/tenants/{tenant}/impact/year-range
pub async fn get_year_range(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> HandlerResult<YearRangeResponse> {
    let provider = resolve_provider(state.registry.as_ref(), &TenantId::new(tenant))?;
    let (min_year, max_year) = provider.get_year_range().await?;
    Ok(Json(YearRangeResponse { min_year, max_year }))
}
