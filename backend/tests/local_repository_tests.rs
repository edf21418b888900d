//! Tests for the in-memory assignment and budget store.
//!
//! Covers soft deletion, budget selection, health toggling and concurrent
//! access through the repository traits.

mod support;

use std::sync::Arc;

use impact_engine::db::repository::{AssignmentRepository, BudgetRepository, RepositoryError};
use impact_engine::db::LocalRepository;
use impact_engine::models::{AreaId, InterventionId, ScenarioId};

use support::*;

#[tokio::test]
async fn test_list_assignments_of_one_scenario() {
    let repo = seeded_repository();
    repo.assign(ScenarioId(2), sahel(), irs());

    let assignments = repo.list_assignments(SCENARIO).await.unwrap();
    assert_eq!(assignments.len(), 5);
    assert_eq!(repo.list_assignments(ScenarioId(2)).await.unwrap().len(), 1);
    assert!(repo.list_assignments(ScenarioId(3)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_soft_deleted_assignments_are_hidden() {
    let repo = seeded_repository();
    let removed = repo.remove_assignment(SCENARIO, AreaId(2), InterventionId(11));
    assert_eq!(removed, 1);
    assert_eq!(repo.remove_assignment(SCENARIO, AreaId(2), InterventionId(11)), 0);

    let assignments = repo.list_assignments(SCENARIO).await.unwrap();
    assert_eq!(assignments.len(), 4);
    assert!(!assignments
        .iter()
        .any(|a| a.area.id == AreaId(2) && a.intervention.id == InterventionId(11)));
    assert_eq!(repo.assignment_count(), 4);
}

#[tokio::test]
async fn test_get_nonexistent_scenario() {
    let repo = LocalRepository::new();
    let err = repo.get_scenario(ScenarioId(999)).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
    assert_eq!(err.context().entity.as_deref(), Some("scenario"));
}

#[tokio::test]
async fn test_latest_budget_by_creation_time() {
    let repo = seeded_repository();
    assert!(repo.latest_budget(SCENARIO).await.unwrap().is_none());

    repo.add_budget(budget(5, 9, 1.0));
    repo.add_budget(budget(6, 12, 2.0));
    repo.add_budget(budget(7, 11, 3.0));

    let latest = repo.latest_budget(SCENARIO).await.unwrap().expect("budget");
    assert_eq!(latest.id.value(), 6);
    assert_eq!(latest.cost_for(2026, AreaId(1)), Some(17_800.0));
    assert_eq!(latest.cost_for(2027, AreaId(2)), None);
    assert!(repo.latest_budget(ScenarioId(2)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unhealthy_repository_fails_reads() {
    let repo = seeded_repository();
    repo.set_healthy(false);

    assert!(!repo.health_check().await.unwrap());
    let err = repo.list_assignments(SCENARIO).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ConnectionError { .. }));
    assert!(err.is_retryable());
    assert!(repo.get_scenario(SCENARIO).await.is_err());
    assert!(repo.latest_budget(SCENARIO).await.is_err());

    repo.set_healthy(true);
    assert!(repo.health_check().await.unwrap());
    assert!(repo.get_scenario(SCENARIO).await.is_ok());
}

#[tokio::test]
async fn test_clear_keeps_health_state() {
    let repo = seeded_repository();
    repo.set_healthy(false);
    repo.clear();
    assert_eq!(repo.assignment_count(), 0);
    assert!(!repo.health_check().await.unwrap());
}

#[tokio::test]
async fn test_concurrent_reads_and_writes() {
    let repo = Arc::new(seeded_repository());
    let mut handles = Vec::new();

    for i in 0..10 {
        let repo_clone = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            repo_clone.assign(ScenarioId(100 + i), sahel(), smc());
            repo_clone.list_assignments(SCENARIO).await.map(|a| a.len())
        }));
    }

    for handle in handles {
        let count = handle.await.expect("task").expect("list");
        assert_eq!(count, 5);
    }
    assert_eq!(repo.assignment_count(), 15);
}

#[tokio::test]
async fn test_seed_round_trip_through_json_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("seed.json");
    std::fs::write(
        &path,
        r#"{
            "scenarios": [{"id": 3, "name": "Test", "start_year": 2026, "end_year": 2026}],
            "assignments": [
                {"scenario_id": 3, "area": {"id": 1, "name": "Kaya"}, "intervention": {"id": 1, "code": "smc"}}
            ],
            "budgets": [
                {"id": 1, "scenario_id": 3, "created_at": "2025-01-01T00:00:00Z", "costs": {"2026": {"1": 250.0}}}
            ]
        }"#,
    )
    .expect("write seed");

    let repo = LocalRepository::from_json_file(&path).expect("seed loads");
    assert_eq!(repo.get_scenario(ScenarioId(3)).await.unwrap().name, "Test");
    let assignments = repo.list_assignments(ScenarioId(3)).await.unwrap();
    assert_eq!(assignments[0].intervention.code, "smc");
    let budget = repo.latest_budget(ScenarioId(3)).await.unwrap().expect("budget");
    assert_eq!(budget.cost_for(2026, AreaId(1)), Some(250.0));
}

#[test]
fn test_malformed_seed_is_configuration_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("seed.json");
    std::fs::write(&path, "{ not json").expect("write seed");
    let err = LocalRepository::from_json_file(&path).err().expect("parse error");
    assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
}
