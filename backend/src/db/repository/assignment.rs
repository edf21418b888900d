//! Assignment store: scenarios and their active (area, intervention) pairs.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{InterventionAssignment, Scenario, ScenarioId};

/// Read access to scenario definitions and intervention assignments.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Look up a scenario.
    ///
    /// # Returns
    /// * `Ok(Scenario)` - The scenario definition
    /// * `Err(RepositoryError::NotFound)` - If no scenario has this id
    async fn get_scenario(&self, scenario_id: ScenarioId) -> RepositoryResult<Scenario>;

    /// List the current (non-deleted) intervention assignments of a scenario.
    ///
    /// An area with several interventions appears once per intervention.
    async fn list_assignments(
        &self,
        scenario_id: ScenarioId,
    ) -> RepositoryResult<Vec<InterventionAssignment>>;
}
