//! Tests for the repository error types and their mapping onto engine errors.

use impact_engine::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use impact_engine::ImpactError;

#[test]
fn test_error_context_new() {
    let ctx = ErrorContext::new("test_operation");
    assert_eq!(ctx.operation, Some("test_operation".to_string()));
    assert!(ctx.entity.is_none());
    assert!(ctx.entity_id.is_none());
    assert!(ctx.details.is_none());
    assert!(!ctx.retryable);
}

#[test]
fn test_error_context_chaining() {
    let ctx = ErrorContext::new("latest_budget")
        .with_entity("budget")
        .with_entity_id(42)
        .with_details("pool exhausted")
        .retryable();

    assert_eq!(ctx.operation, Some("latest_budget".to_string()));
    assert_eq!(ctx.entity, Some("budget".to_string()));
    assert_eq!(ctx.entity_id, Some("42".to_string()));
    assert_eq!(ctx.details, Some("pool exhausted".to_string()));
    assert!(ctx.retryable);
}

#[test]
fn test_error_context_display() {
    let ctx = ErrorContext::new("get_scenario")
        .with_entity("scenario")
        .with_entity_id("123")
        .retryable();

    let display = format!("{}", ctx);
    assert!(display.contains("operation=get_scenario"));
    assert!(display.contains("entity=scenario"));
    assert!(display.contains("id=123"));
    assert!(display.contains("retryable=true"));
}

#[test]
fn test_transient_errors_are_retryable() {
    assert!(RepositoryError::connection("temp failure").is_retryable());
    assert!(RepositoryError::timeout("timeout").is_retryable());
    assert!(!RepositoryError::not_found("missing").is_retryable());
    assert!(!RepositoryError::validation("invalid").is_retryable());
}

#[test]
fn test_repository_error_with_operation() {
    let err = RepositoryError::query("error").with_operation("fetch_aggregate_rows");
    assert_eq!(
        err.context().operation,
        Some("fetch_aggregate_rows".to_string())
    );
    assert_eq!(err.message(), "error");
}

#[test]
fn test_repository_error_display() {
    let err = RepositoryError::not_found("scenario not found");
    assert!(err.to_string().contains("Not found: scenario not found"));
}

#[test]
fn test_store_failures_become_provider_unavailable() {
    for err in [
        RepositoryError::connection("down"),
        RepositoryError::query("bad column"),
        RepositoryError::internal("lock poisoned"),
        RepositoryError::timeout("slow"),
    ] {
        let mapped = ImpactError::from(err);
        assert!(
            matches!(mapped, ImpactError::ProviderUnavailable { .. }),
            "{mapped}"
        );
    }
}

#[test]
fn test_lookup_failures_become_invalid_input() {
    let mapped = ImpactError::from(RepositoryError::not_found_with_context(
        "Scenario 7 does not exist",
        ErrorContext::new("get_scenario")
            .with_entity("scenario")
            .with_entity_id(7),
    ));
    assert!(matches!(mapped, ImpactError::InvalidInput { .. }));
    assert_eq!(mapped.message(), "Scenario 7 does not exist");
    assert_eq!(mapped.context().entity_id.as_deref(), Some("7"));

    let mapped = ImpactError::from(RepositoryError::validation("bad costs_json"));
    assert_eq!(mapped.code(), "INVALID_INPUT");
}

#[test]
fn test_configuration_stays_configuration() {
    let mapped = ImpactError::from(RepositoryError::configuration("no DATABASE_URL"));
    assert_eq!(mapped.code(), "IMPACT_UNAVAILABLE");
}

#[test]
fn test_repository_result_err() {
    let result: RepositoryResult<i32> = Err(RepositoryError::not_found("test"));
    assert!(result.is_err());
}
