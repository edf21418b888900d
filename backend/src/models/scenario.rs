//! Planning entities read from the assignment and budget stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::ids::{AreaId, BudgetId, InterventionId, ScenarioId};

/// Geographic or administrative planning unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
}

impl Area {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: AreaId(id),
            name: name.into(),
        }
    }
}

/// A control measure identified by a stable, provider-independent code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Intervention {
    pub id: InterventionId,
    pub code: String,
    #[serde(default)]
    pub name: String,
}

impl Intervention {
    pub fn new(id: i64, code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            id: InterventionId(id),
            name: code.clone(),
            code,
        }
    }
}

/// Time-bounded intervention plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub name: String,
    pub start_year: i32,
    pub end_year: i32,
}

/// One active (area, intervention) pair of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionAssignment {
    pub area: Area,
    pub intervention: Intervention,
}

/// Canonical key for a deployed-intervention set.
///
/// Backed by an ordered set so that two areas with the same interventions
/// always produce the same key regardless of assignment order or duplicates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InterventionSetKey(BTreeSet<InterventionId>);

impl InterventionSetKey {
    pub fn from_interventions<'a, I>(interventions: I) -> Self
    where
        I: IntoIterator<Item = &'a Intervention>,
    {
        Self(interventions.into_iter().map(|i| i.id).collect())
    }
}

/// Cost per area for each year: `year -> area -> total cost`.
pub type CostMap = BTreeMap<i32, BTreeMap<AreaId, f64>>;

/// A stored budget computation for a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub id: BudgetId,
    pub scenario_id: ScenarioId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub costs: CostMap,
}

impl BudgetRecord {
    /// Cost of one area in one year, if the budget covers it.
    pub fn cost_for(&self, year: i32, area_id: AreaId) -> Option<f64> {
        self.costs
            .get(&year)
            .and_then(|areas| areas.get(&area_id))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_key_ignores_order_and_duplicates() {
        let a = Intervention::new(1, "smc");
        let b = Intervention::new(2, "irs");
        let first = InterventionSetKey::from_interventions([&a, &b]);
        let second = InterventionSetKey::from_interventions([&b, &a, &b]);
        assert_eq!(first, second);
        assert_ne!(first, InterventionSetKey::from_interventions([&a]));
    }

    #[test]
    fn test_budget_costs_round_trip_with_string_keys() {
        let json = r#"{
            "id": 3,
            "scenario_id": 7,
            "created_at": "2024-05-01T10:00:00Z",
            "costs": { "2025": { "11": 1500.0, "12": 250.5 } }
        }"#;
        let record: BudgetRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.cost_for(2025, AreaId(11)), Some(1500.0));
        assert_eq!(record.cost_for(2025, AreaId(13)), None);
        assert_eq!(record.cost_for(2026, AreaId(11)), None);
    }
}
