//! Scenario impact orchestration.
//!
//! [`ImpactService`] joins a scenario's intervention assignments and latest
//! budget with provider data and rolls the result up to area, year and
//! scenario level.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::summary::{summarize_scenario, AreaYearMetrics};
use crate::db::repository::{AssignmentRepository, BudgetRepository, ErrorContext};
use crate::db::ScenarioStores;
use crate::error::{ImpactEngineResult, ImpactError};
use crate::models::{
    Area, AreaId, AreaMetrics, CostMap, ImpactMetrics, ImpactResult, Intervention,
    InterventionSetKey, ScenarioId, ScenarioImpact,
};
use crate::providers::ImpactProvider;

/// Parameters of one impact request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactQuery {
    pub scenario_id: ScenarioId,
    pub age_group: String,
    #[serde(default)]
    pub year_from: Option<i32>,
    #[serde(default)]
    pub year_to: Option<i32>,
}

impl ImpactQuery {
    pub fn new(scenario_id: ScenarioId, age_group: impl Into<String>) -> Self {
        Self {
            scenario_id,
            age_group: age_group.into(),
            year_from: None,
            year_to: None,
        }
    }

    pub fn with_years(mut self, year_from: Option<i32>, year_to: Option<i32>) -> Self {
        self.year_from = year_from;
        self.year_to = year_to;
        self
    }
}

/// An area together with its deployed interventions.
struct AreaPlan {
    area: Area,
    interventions: Vec<Intervention>,
}

/// Areas sharing one deployed-intervention set.
struct InterventionGroup {
    interventions: Vec<Intervention>,
    areas: Vec<Area>,
}

/// Computes scenario impact with one provider and the scenario stores.
pub struct ImpactService {
    provider: Arc<dyn ImpactProvider>,
    assignments: Arc<dyn AssignmentRepository>,
    budgets: Arc<dyn BudgetRepository>,
}

impl ImpactService {
    pub fn new(
        provider: Arc<dyn ImpactProvider>,
        assignments: Arc<dyn AssignmentRepository>,
        budgets: Arc<dyn BudgetRepository>,
    ) -> Self {
        Self {
            provider,
            assignments,
            budgets,
        }
    }

    pub fn from_stores(provider: Arc<dyn ImpactProvider>, stores: &ScenarioStores) -> Self {
        Self::new(
            provider,
            stores.assignments.clone(),
            stores.budgets.clone(),
        )
    }

    /// Compute the impact summary of a scenario.
    ///
    /// Input is validated before any impact data is requested. Any store or
    /// provider failure fails the whole request.
    pub async fn scenario_impact(&self, query: &ImpactQuery) -> ImpactEngineResult<ScenarioImpact> {
        self.validate(query).await?;

        let plans = self.area_plans(query.scenario_id).await?;
        let costs = self.cost_map(query.scenario_id).await?;
        if plans.is_empty() {
            info!(
                "Scenario {} has no intervention assignments; returning empty impact",
                query.scenario_id
            );
            return Ok(ScenarioImpact::empty(query.scenario_id));
        }

        let groups = group_by_interventions(plans);
        debug!(
            "Scenario {}: {} intervention groups, provider '{}' (bulk={})",
            query.scenario_id,
            groups.len(),
            self.provider.name(),
            self.provider.supports_bulk()
        );

        let mut entries = Vec::new();
        for group in &groups {
            let results = self.fetch_group(group, query).await?;
            for area in &group.areas {
                let area_results = results.get(&area.id).map(Vec::as_slice).unwrap_or(&[]);
                ensure_one_result_per_year(area, area_results)?;
                entries.extend(
                    area_results
                        .iter()
                        .map(|result| leaf_metrics(area, result, costs.as_ref())),
                );
            }
        }

        let impact = summarize_scenario(query.scenario_id, entries);
        info!(
            "Scenario {} impact: {} areas, {} years, age group '{}'",
            query.scenario_id,
            impact.areas.len(),
            impact.by_year.len(),
            query.age_group
        );
        Ok(impact)
    }

    async fn validate(&self, query: &ImpactQuery) -> ImpactEngineResult<()> {
        if let (Some(from), Some(to)) = (query.year_from, query.year_to) {
            if from > to {
                return Err(ImpactError::invalid_input_with_context(
                    format!("year_from {} is after year_to {}", from, to),
                    ErrorContext::new("scenario_impact").with_entity("year_range"),
                ));
            }
        }

        self.assignments
            .get_scenario(query.scenario_id)
            .await
            .map_err(|e| ImpactError::from(e).with_operation("scenario_impact"))?;

        let age_groups = self.provider.get_age_groups().await?;
        if !age_groups.iter().any(|group| *group == query.age_group) {
            return Err(ImpactError::invalid_input_with_context(
                format!("Unknown age group '{}'", query.age_group),
                ErrorContext::new("scenario_impact")
                    .with_entity("age_group")
                    .with_details(format!("valid: {}", age_groups.join(", "))),
            ));
        }
        Ok(())
    }

    /// Area -> deployed interventions, each intervention listed once.
    async fn area_plans(&self, scenario_id: ScenarioId) -> ImpactEngineResult<Vec<AreaPlan>> {
        let assignments = self.assignments.list_assignments(scenario_id).await?;

        let mut plans: BTreeMap<AreaId, AreaPlan> = BTreeMap::new();
        for assignment in assignments {
            let plan = plans
                .entry(assignment.area.id)
                .or_insert_with(|| AreaPlan {
                    area: assignment.area.clone(),
                    interventions: Vec::new(),
                });
            if !plan
                .interventions
                .iter()
                .any(|i| i.id == assignment.intervention.id)
            {
                plan.interventions.push(assignment.intervention);
            }
        }
        Ok(plans.into_values().collect())
    }

    /// Year -> area -> cost from the latest budget; empty without a budget.
    async fn cost_map(&self, scenario_id: ScenarioId) -> ImpactEngineResult<Option<CostMap>> {
        let budget = self.budgets.latest_budget(scenario_id).await?;
        if budget.is_none() {
            debug!("Scenario {} has no budget; costs stay undefined", scenario_id);
        }
        Ok(budget.map(|b| b.costs))
    }

    async fn fetch_group(
        &self,
        group: &InterventionGroup,
        query: &ImpactQuery,
    ) -> ImpactEngineResult<BTreeMap<AreaId, Vec<ImpactResult>>> {
        if self.provider.supports_bulk() {
            debug!(
                "Bulk query for {} areas with {} interventions",
                group.areas.len(),
                group.interventions.len()
            );
            return self
                .provider
                .match_impact_bulk(
                    &group.areas,
                    &group.interventions,
                    &query.age_group,
                    query.year_from,
                    query.year_to,
                )
                .await;
        }

        let mut results = BTreeMap::new();
        for area in &group.areas {
            let area_results = self
                .provider
                .match_impact(
                    area,
                    &group.interventions,
                    &query.age_group,
                    query.year_from,
                    query.year_to,
                )
                .await?;
            results.insert(area.id, area_results);
        }
        Ok(results)
    }
}

/// Partition areas by set-equal deployed interventions.
fn group_by_interventions(plans: Vec<AreaPlan>) -> Vec<InterventionGroup> {
    let mut groups: BTreeMap<InterventionSetKey, InterventionGroup> = BTreeMap::new();
    for plan in plans {
        let key = InterventionSetKey::from_interventions(&plan.interventions);
        groups
            .entry(key)
            .or_insert_with(|| {
                let mut interventions = plan.interventions.clone();
                interventions.sort_by_key(|i| i.id);
                InterventionGroup {
                    interventions,
                    areas: Vec::new(),
                }
            })
            .areas
            .push(plan.area);
    }
    groups.into_values().collect()
}

fn ensure_one_result_per_year(area: &Area, results: &[ImpactResult]) -> ImpactEngineResult<()> {
    let mut years = BTreeSet::new();
    for result in results {
        if !years.insert(result.year) {
            return Err(ImpactError::data_consistency_with_context(
                format!(
                    "Provider returned more than one result for area '{}' in {}",
                    area.name, result.year
                ),
                ErrorContext::new("scenario_impact")
                    .with_entity("area")
                    .with_entity_id(area.id)
                    .with_details(format!("year={}", result.year)),
            ));
        }
    }
    Ok(())
}

fn leaf_metrics(area: &Area, result: &ImpactResult, costs: Option<&CostMap>) -> AreaYearMetrics {
    let cost = costs.and_then(|costs| {
        let cost = costs
            .get(&result.year)
            .and_then(|areas| areas.get(&area.id))
            .copied();
        if cost.is_none() {
            warn!(
                "Budget has no cost for area '{}' in {}",
                area.name, result.year
            );
        }
        cost
    });

    AreaYearMetrics {
        year: result.year,
        area: AreaMetrics {
            area_id: area.id,
            area_name: area.name.clone(),
            metrics: ImpactMetrics::from_result(result, cost),
        },
    }
}

#[cfg(test)]
#[path = "impact_tests.rs"]
mod impact_tests;
