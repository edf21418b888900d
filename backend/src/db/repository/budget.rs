//! Budget store: costed budget records produced by the budget calculator.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{BudgetRecord, ScenarioId};

/// Read access to stored budgets.
#[async_trait]
pub trait BudgetRepository: Send + Sync {
    /// Fetch the most recently created budget of a scenario.
    ///
    /// # Returns
    /// * `Ok(Some(BudgetRecord))` - The newest record by `created_at`
    /// * `Ok(None)` - If the scenario was never budgeted
    async fn latest_budget(&self, scenario_id: ScenarioId)
        -> RepositoryResult<Option<BudgetRecord>>;
}
