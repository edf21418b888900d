//! Provider over the raw per-seed replicate data set.
//!
//! Replicates sharing an (area, year) are summarised as mean / min / max.
//! Each seed must contribute exactly one row to that summary.

use async_trait::async_trait;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::{normalize_code, sort_by_year, AreaAliases, AreaIndex, ImpactProvider};
use crate::db::repository::impact_data::{
    ImpactRowScope, ReplicateFlag, ReplicateImpactRow, ReplicateQuery,
};
use crate::db::repository::{ErrorContext, ReplicateImpactStore};
use crate::error::{ImpactEngineResult, ImpactError};
use crate::models::{Area, AreaId, ImpactResult, Intervention, MetricWithCI};

/// Intervention code -> deployment flag.
const INTERVENTION_FLAGS: &[(&str, ReplicateFlag)] = &[
    ("cm_public", ReplicateFlag::CaseManagement),
    ("cm_private", ReplicateFlag::CaseManagement),
    ("iptp", ReplicateFlag::Iptp),
    ("smc", ReplicateFlag::Smc),
    ("pmc", ReplicateFlag::Pmc),
    ("vacc_r21", ReplicateFlag::Vaccine),
    ("vacc_rtss", ReplicateFlag::Vaccine),
    ("itn_campaign", ReplicateFlag::ItnStandard),
    ("itn_routine", ReplicateFlag::ItnStandard),
    ("itn_campaign_pbo", ReplicateFlag::ItnPbo),
    ("itn_campaign_ig2", ReplicateFlag::ItnDualAi),
    ("irs", ReplicateFlag::Irs),
    ("lsm", ReplicateFlag::Lsm),
];

/// Canonical area name -> name used in the replicate data set.
const AREA_ALIASES: &[(&str, &str)] = &[
    ("Hauts-Bassins", "Hauts Bassins"),
    ("Boucle du Mouhoun", "Boucle Du Mouhoun"),
    ("Plateau-Central", "Plateau Central"),
];

/// Required value of every flag for an intervention set.
fn deployment_flags(interventions: &[Intervention]) -> BTreeMap<ReplicateFlag, bool> {
    let mut flags: BTreeMap<ReplicateFlag, bool> =
        ReplicateFlag::ALL.iter().map(|flag| (*flag, false)).collect();

    for intervention in interventions {
        let code = normalize_code(&intervention.code);
        match INTERVENTION_FLAGS.iter().find(|(known, _)| *known == code) {
            Some((_, flag)) => {
                flags.insert(*flag, true);
                if flag.is_net_variant() {
                    flags.insert(ReplicateFlag::Itn, true);
                }
            }
            None => warn!(
                "Intervention code '{}' has no replicate mapping; ignoring it",
                intervention.code
            ),
        }
    }
    flags
}

/// Mean, min and max over the present values; empty when none are present.
fn summarize<I>(values: I) -> MetricWithCI
where
    I: IntoIterator<Item = Option<f64>>,
{
    let present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        return MetricWithCI::default();
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;
    let lower = present.iter().copied().fold(f64::INFINITY, f64::min);
    let upper = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    MetricWithCI::with_bounds(mean, lower, upper)
}

/// Collapse the replicates of one (area, year).
fn summarize_replicates(year: i32, rows: &[&ReplicateImpactRow]) -> ImpactResult {
    let population =
        rows.iter().map(|r| r.population).sum::<f64>() / rows.len().max(1) as f64;
    ImpactResult {
        year,
        population,
        number_cases: summarize(rows.iter().map(|r| r.cases)),
        number_severe_cases: summarize(rows.iter().map(|r| r.severe_cases)),
        prevalence_rate: summarize(rows.iter().map(|r| r.prevalence)),
        direct_deaths: summarize(rows.iter().map(|r| r.direct_deaths)),
    }
}

/// Provider over [`ReplicateImpactStore`] data.
pub struct ReplicateImpactProvider {
    store: Arc<dyn ReplicateImpactStore>,
    aliases: AreaAliases,
}

impl ReplicateImpactProvider {
    pub fn new(store: Arc<dyn ReplicateImpactStore>) -> Self {
        Self {
            store,
            aliases: AreaAliases::new(AREA_ALIASES),
        }
    }
}

#[async_trait]
impl ImpactProvider for ReplicateImpactProvider {
    fn name(&self) -> &str {
        "replicate"
    }

    async fn match_impact(
        &self,
        area: &Area,
        interventions: &[Intervention],
        age_group: &str,
        year_from: Option<i32>,
        year_to: Option<i32>,
    ) -> ImpactEngineResult<Vec<ImpactResult>> {
        let areas = std::slice::from_ref(area);
        let index = AreaIndex::new(areas, &self.aliases);
        let query = ReplicateQuery {
            scope: ImpactRowScope {
                area_names: index.provider_names(),
                age_group: age_group.to_string(),
                year_from,
                year_to,
            },
            flags: deployment_flags(interventions),
        };

        let rows = self
            .store
            .fetch_replicate_rows(&query)
            .await
            .map_err(|e| ImpactError::from(e).with_operation("match_impact"))?;
        debug!(
            "replicate: {} rows for area '{}' ({} interventions)",
            rows.len(),
            area.name,
            interventions.len()
        );

        let mut by_year: BTreeMap<i32, Vec<&ReplicateImpactRow>> = BTreeMap::new();
        for row in &rows {
            by_year.entry(row.year).or_default().push(row);
        }

        let mut results: BTreeMap<AreaId, Vec<ImpactResult>> = index.empty_results();
        for (year, replicates) in &by_year {
            let seeds: BTreeSet<i64> = replicates.iter().map(|r| r.seed).collect();
            if seeds.len() != replicates.len() {
                return Err(ImpactError::data_consistency_with_context(
                    format!(
                        "{} replicate rows but {} distinct seeds for area '{}' in {}",
                        replicates.len(),
                        seeds.len(),
                        area.name,
                        year
                    ),
                    ErrorContext::new("match_impact")
                        .with_entity("area")
                        .with_entity_id(area.id)
                        .with_details(format!("year={}", year)),
                ));
            }
            results
                .entry(area.id)
                .or_default()
                .push(summarize_replicates(*year, replicates));
        }
        sort_by_year(&mut results);
        Ok(results.remove(&area.id).unwrap_or_default())
    }

    async fn get_year_range(&self) -> ImpactEngineResult<(i32, i32)> {
        self.store
            .replicate_year_range()
            .await
            .map_err(ImpactError::from)
    }

    async fn get_age_groups(&self) -> ImpactEngineResult<Vec<String>> {
        self.store
            .replicate_age_groups()
            .await
            .map_err(ImpactError::from)
    }
}
