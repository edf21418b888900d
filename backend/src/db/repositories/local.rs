//! In-memory local repository implementation.
//!
//! This module provides a local implementation of the assignment and budget
//! stores suitable for unit testing and local development. All data is kept in
//! memory, giving fast, deterministic and isolated execution.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::db::repository::{
    AssignmentRepository, BudgetRepository, ErrorContext, RepositoryError, RepositoryResult,
};
use crate::models::{
    Area, AreaId, BudgetRecord, Intervention, InterventionAssignment, InterventionId, Scenario,
    ScenarioId,
};

/// Seed document accepted by [`LocalRepository::from_seed`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalSeed {
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub assignments: Vec<SeedAssignment>,
    #[serde(default)]
    pub budgets: Vec<BudgetRecord>,
}

/// One assignment entry in a seed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAssignment {
    pub scenario_id: ScenarioId,
    pub area: Area,
    pub intervention: Intervention,
}

#[derive(Debug, Clone)]
struct StoredAssignment {
    scenario_id: ScenarioId,
    area: Area,
    intervention: Intervention,
    deleted: bool,
}

/// In-memory local repository.
///
/// # Example
/// ```
/// use impact_engine::db::repositories::LocalRepository;
/// use impact_engine::models::{Area, Intervention, Scenario, ScenarioId};
///
/// let repo = LocalRepository::new();
/// repo.insert_scenario(Scenario {
///     id: ScenarioId(1),
///     name: "Baseline".to_string(),
///     start_year: 2025,
///     end_year: 2027,
/// });
/// repo.assign(ScenarioId(1), Area::new(10, "Kaya"), Intervention::new(1, "smc"));
/// assert_eq!(repo.assignment_count(), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    scenarios: HashMap<ScenarioId, Scenario>,
    assignments: Vec<StoredAssignment>,
    budgets: Vec<BudgetRecord>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            scenarios: HashMap::new(),
            assignments: Vec::new(),
            budgets: Vec::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Create a repository pre-populated from a seed document.
    pub fn from_seed(seed: LocalSeed) -> Self {
        let repo = Self::new();
        for scenario in seed.scenarios {
            repo.insert_scenario(scenario);
        }
        for entry in seed.assignments {
            repo.assign(entry.scenario_id, entry.area, entry.intervention);
        }
        for budget in seed.budgets {
            repo.add_budget(budget);
        }
        repo
    }

    /// Load a seed document from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration(format!(
                "Failed to read seed file {}: {}",
                path.display(),
                e
            ))
        })?;
        let seed: LocalSeed = serde_json::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!(
                "Failed to parse seed file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self::from_seed(seed))
    }

    /// Add or replace a scenario.
    pub fn insert_scenario(&self, scenario: Scenario) {
        self.data.write().scenarios.insert(scenario.id, scenario);
    }

    /// Assign an intervention to an area within a scenario.
    pub fn assign(&self, scenario_id: ScenarioId, area: Area, intervention: Intervention) {
        self.data.write().assignments.push(StoredAssignment {
            scenario_id,
            area,
            intervention,
            deleted: false,
        });
    }

    /// Soft-delete an assignment. Returns the number of rows marked deleted.
    pub fn remove_assignment(
        &self,
        scenario_id: ScenarioId,
        area_id: AreaId,
        intervention_id: InterventionId,
    ) -> usize {
        let mut data = self.data.write();
        let mut removed = 0;
        for stored in data.assignments.iter_mut().filter(|a| {
            !a.deleted
                && a.scenario_id == scenario_id
                && a.area.id == area_id
                && a.intervention.id == intervention_id
        }) {
            stored.deleted = true;
            removed += 1;
        }
        removed
    }

    /// Store a budget record.
    pub fn add_budget(&self, budget: BudgetRecord) {
        self.data.write().budgets.push(budget);
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Number of active (non-deleted) assignments across all scenarios.
    pub fn assignment_count(&self) -> usize {
        self.data
            .read()
            .assignments
            .iter()
            .filter(|a| !a.deleted)
            .count()
    }

    fn ensure_healthy(&self, operation: &str) -> RepositoryResult<()> {
        if self.data.read().is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection_with_context(
                "Local repository is marked unhealthy",
                ErrorContext::new(operation),
            ))
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssignmentRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn get_scenario(&self, scenario_id: ScenarioId) -> RepositoryResult<Scenario> {
        self.ensure_healthy("get_scenario")?;
        self.data
            .read()
            .scenarios
            .get(&scenario_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Scenario {} does not exist", scenario_id),
                    ErrorContext::new("get_scenario")
                        .with_entity("scenario")
                        .with_entity_id(scenario_id),
                )
            })
    }

    async fn list_assignments(
        &self,
        scenario_id: ScenarioId,
    ) -> RepositoryResult<Vec<InterventionAssignment>> {
        self.ensure_healthy("list_assignments")?;
        Ok(self
            .data
            .read()
            .assignments
            .iter()
            .filter(|a| !a.deleted && a.scenario_id == scenario_id)
            .map(|a| InterventionAssignment {
                area: a.area.clone(),
                intervention: a.intervention.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl BudgetRepository for LocalRepository {
    async fn latest_budget(
        &self,
        scenario_id: ScenarioId,
    ) -> RepositoryResult<Option<BudgetRecord>> {
        self.ensure_healthy("latest_budget")?;
        Ok(self
            .data
            .read()
            .budgets
            .iter()
            .filter(|b| b.scenario_id == scenario_id)
            .max_by_key(|b| (b.created_at, b.id))
            .cloned())
    }
}
