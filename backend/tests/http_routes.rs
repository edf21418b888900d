//! Router-level tests: requests go through `create_router` with in-memory
//! stores and an aggregate provider registered for tenant `bf`.
#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use impact_engine::db::{LocalRepository, ScenarioStores};
use impact_engine::http::{create_router, AppState};
use impact_engine::providers::{AggregateImpactProvider, LocalProviderRegistry};

use support::*;

fn build_router(repo: LocalRepository) -> axum::Router {
    let registry = LocalProviderRegistry::new()
        .with_provider("bf", Arc::new(AggregateImpactProvider::new(aggregate_store())));
    create_router(AppState::new(
        Arc::new(registry),
        ScenarioStores::from_local(repo),
    ))
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    let status = response.status();
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    let payload = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, payload)
}

#[tokio::test]
async fn test_health_lists_tenants() {
    let (status, payload) = get(build_router(seeded_repository()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["database"], "connected");
    assert_eq!(payload["tenants"], serde_json::json!(["bf"]));
}

#[tokio::test]
async fn test_scenario_impact_route() {
    let repo = seeded_repository();
    repo.add_budget(budget(1, 8, 1.0));

    let (status, payload) = get(
        build_router(repo),
        "/v1/tenants/bf/scenarios/1/impact?age_group=0-5",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["scenario_id"], 1);
    assert_eq!(payload["cost"], 35_600.0);
    assert_eq!(payload["number_cases"]["value"], 6000.0);
    assert_eq!(payload["by_year"].as_array().map(Vec::len), Some(2));
    assert_eq!(payload["areas"].as_array().map(Vec::len), Some(3));
    assert_eq!(payload["by_year"][0]["areas"][0]["area_name"], "Hauts-Bassins");
}

#[tokio::test]
async fn test_year_window_query_parameters() {
    let (status, payload) = get(
        build_router(seeded_repository()),
        "/v1/tenants/bf/scenarios/1/impact?age_group=0-5&year_from=2026&year_to=2026",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["by_year"].as_array().map(Vec::len), Some(1));
    assert_eq!(payload["by_year"][0]["year"], 2026);
}

#[tokio::test]
async fn test_tenant_without_provider_is_unavailable() {
    let (status, payload) = get(
        build_router(seeded_repository()),
        "/v1/tenants/ng/scenarios/1/impact?age_group=0-5",
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(payload["code"], "IMPACT_UNAVAILABLE");
}

#[tokio::test]
async fn test_unknown_scenario_is_not_found() {
    let (status, payload) = get(
        build_router(seeded_repository()),
        "/v1/tenants/bf/scenarios/42/impact?age_group=0-5",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(payload["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_parameters_are_bad_requests() {
    let router = build_router(seeded_repository());

    let (status, payload) = get(
        router.clone(),
        "/v1/tenants/bf/scenarios/1/impact?age_group=15-49",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["code"], "INVALID_INPUT");

    let (status, _) = get(
        router.clone(),
        "/v1/tenants/bf/scenarios/1/impact?age_group=0-5&year_from=2027&year_to=2026",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, payload) = get(router.clone(), "/v1/tenants/bf/scenarios/1/impact?age_group=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["code"], "BAD_REQUEST");

    let (status, payload) = get(router, "/v1/tenants/bf/scenarios/1/impact").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_malformed_query_string_gets_json_error() {
    let router = build_router(seeded_repository());

    let (status, payload) = get(
        router,
        "/v1/tenants/bf/scenarios/1/impact?age_group=0-5&year_from=soon",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["code"], "BAD_REQUEST");
    assert!(payload["message"].as_str().unwrap().contains("year_from"));
}

#[tokio::test]
async fn test_store_outage_is_bad_gateway() {
    let repo = seeded_repository();
    repo.set_healthy(false);

    let (status, payload) = get(
        build_router(repo),
        "/v1/tenants/bf/scenarios/1/impact?age_group=0-5",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(payload["code"], "PROVIDER_UNAVAILABLE");
}

#[tokio::test]
async fn test_provider_metadata_routes() {
    let router = build_router(seeded_repository());

    let (status, payload) = get(router.clone(), "/v1/tenants/bf/impact/age-groups").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["age_groups"], serde_json::json!(["0-5", "all"]));

    let (status, payload) = get(router.clone(), "/v1/tenants/bf/impact/year-range").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["min_year"], 2026);
    assert_eq!(payload["max_year"], 2027);

    let (status, _) = get(router, "/v1/tenants/xx/impact/year-range").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
