use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use super::schema::{aggregate_impact, budgets, replicate_impact, scenarios};
use crate::db::repository::impact_data::{AggregateImpactRow, ReplicateImpactRow};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{BudgetId, BudgetRecord, CostMap, MetricWithCI, Scenario, ScenarioId};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = scenarios)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ScenarioRow {
    pub id: i64,
    pub name: String,
    pub start_year: i32,
    pub end_year: i32,
}

impl From<ScenarioRow> for Scenario {
    fn from(row: ScenarioRow) -> Self {
        Scenario {
            id: ScenarioId(row.id),
            name: row.name,
            start_year: row.start_year,
            end_year: row.end_year,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = budgets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BudgetRow {
    pub id: i64,
    pub scenario_id: i64,
    pub created_at: DateTime<Utc>,
    pub costs_json: Value,
}

impl BudgetRow {
    pub fn into_record(self) -> RepositoryResult<BudgetRecord> {
        let costs: CostMap = serde_json::from_value(self.costs_json).map_err(|e| {
            RepositoryError::ValidationError {
                message: format!("Failed to parse budget costs: {}", e),
                context: ErrorContext::new("latest_budget")
                    .with_entity("budget")
                    .with_entity_id(self.id),
            }
        })?;
        Ok(BudgetRecord {
            id: BudgetId(self.id),
            scenario_id: ScenarioId(self.scenario_id),
            created_at: self.created_at,
            costs,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = aggregate_impact)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AggregateImpactDbRow {
    pub admin_name: String,
    pub year: i32,
    pub age_group: String,
    pub population: f64,
    pub clinical_incidence: Option<f64>,
    pub clinical_incidence_lower: Option<f64>,
    pub clinical_incidence_upper: Option<f64>,
    pub severe_incidence: Option<f64>,
    pub severe_incidence_lower: Option<f64>,
    pub severe_incidence_upper: Option<f64>,
    pub prevalence_rate: Option<f64>,
    pub prevalence_rate_lower: Option<f64>,
    pub prevalence_rate_upper: Option<f64>,
    pub direct_deaths: Option<f64>,
    pub direct_deaths_lower: Option<f64>,
    pub direct_deaths_upper: Option<f64>,
}

impl From<AggregateImpactDbRow> for AggregateImpactRow {
    fn from(row: AggregateImpactDbRow) -> Self {
        AggregateImpactRow {
            admin_name: row.admin_name,
            year: row.year,
            age_group: row.age_group,
            population: row.population,
            clinical_incidence: MetricWithCI::new(
                row.clinical_incidence,
                row.clinical_incidence_lower,
                row.clinical_incidence_upper,
            ),
            severe_incidence: MetricWithCI::new(
                row.severe_incidence,
                row.severe_incidence_lower,
                row.severe_incidence_upper,
            ),
            prevalence_rate: MetricWithCI::new(
                row.prevalence_rate,
                row.prevalence_rate_lower,
                row.prevalence_rate_upper,
            ),
            direct_deaths: MetricWithCI::new(
                row.direct_deaths,
                row.direct_deaths_lower,
                row.direct_deaths_upper,
            ),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = replicate_impact)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReplicateImpactDbRow {
    pub admin_name: String,
    pub year: i32,
    pub age_group: String,
    pub seed: i64,
    pub population: f64,
    pub cases: Option<f64>,
    pub severe_cases: Option<f64>,
    pub prevalence: Option<f64>,
    pub direct_deaths: Option<f64>,
}

impl From<ReplicateImpactDbRow> for ReplicateImpactRow {
    fn from(row: ReplicateImpactDbRow) -> Self {
        ReplicateImpactRow {
            admin_name: row.admin_name,
            year: row.year,
            age_group: row.age_group,
            seed: row.seed,
            population: row.population,
            cases: row.cases,
            severe_cases: row.severe_cases,
            prevalence: row.prevalence,
            direct_deaths: row.direct_deaths,
        }
    }
}
