//! Provider over the pre-aggregated, population-level data set.

use async_trait::async_trait;
use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::{normalize_code, sort_by_year, AreaAliases, AreaIndex, ImpactProvider};
use crate::db::repository::impact_data::{
    AggregateDimension, AggregateImpactRow, AggregateQuery, DeploymentFilter, ImpactRowScope,
};
use crate::db::repository::{AggregateImpactStore, ErrorContext};
use crate::error::{ImpactEngineResult, ImpactError};
use crate::models::{Area, AreaId, ImpactResult, Intervention};

/// Intervention code -> (dimension, deployed variant id).
///
/// Several codes may share one dimension; they only conflict when they name
/// different variants.
const INTERVENTION_VARIANTS: &[(&str, AggregateDimension, &str)] = &[
    ("cm_public", AggregateDimension::CaseManagement, "cm"),
    ("cm_private", AggregateDimension::CaseManagement, "cm"),
    ("iptp", AggregateDimension::Iptp, "iptp_sp"),
    ("smc", AggregateDimension::Smc, "smc_spaq"),
    ("pmc", AggregateDimension::Pmc, "pmc_sp"),
    ("vacc_r21", AggregateDimension::Vaccine, "r21"),
    ("vacc_rtss", AggregateDimension::Vaccine, "rtss"),
    ("itn_campaign", AggregateDimension::Itn, "itn_std"),
    ("itn_routine", AggregateDimension::Itn, "itn_std"),
    ("itn_campaign_pbo", AggregateDimension::Itn, "itn_pbo"),
    ("itn_campaign_ig2", AggregateDimension::Itn, "itn_ig2"),
    ("irs", AggregateDimension::Irs, "irs"),
    ("lsm", AggregateDimension::Lsm, "lsm"),
];

/// Canonical area name -> name used in the aggregate data set.
const AREA_ALIASES: &[(&str, &str)] = &[
    ("Hauts-Bassins", "Haut-Bassins"),
    ("Boucle du Mouhoun", "Boucle-du-Mouhoun"),
    ("Centre-Est", "Centre Est"),
    ("Centre-Nord", "Centre Nord"),
    ("Centre-Ouest", "Centre Ouest"),
    ("Centre-Sud", "Centre Sud"),
    ("Plateau-Central", "Plateau Central"),
];

/// Incidence columns are stored per this many people.
const RATE_DENOMINATOR: f64 = 1000.0;

/// Build one filter per dimension for an intervention set.
fn deployment_filters(
    interventions: &[Intervention],
) -> ImpactEngineResult<BTreeMap<AggregateDimension, DeploymentFilter>> {
    let mut deployed: BTreeMap<AggregateDimension, (&str, &str)> = BTreeMap::new();

    for intervention in interventions {
        let code = normalize_code(&intervention.code);
        let Some((_, dimension, variant)) = INTERVENTION_VARIANTS
            .iter()
            .find(|(known, _, _)| *known == code)
        else {
            warn!(
                "Intervention code '{}' has no aggregate mapping; ignoring it",
                intervention.code
            );
            continue;
        };

        match deployed.get(dimension) {
            Some((other_code, other_variant)) if other_variant != variant => {
                return Err(ImpactError::invalid_input_with_context(
                    format!(
                        "Interventions '{}' and '{}' select different variants of one dimension",
                        other_code, intervention.code
                    ),
                    ErrorContext::new("match_impact")
                        .with_entity("intervention")
                        .with_details(format!("{:?}", dimension)),
                ));
            }
            Some(_) => {}
            None => {
                deployed.insert(*dimension, (intervention.code.as_str(), *variant));
            }
        }
    }

    Ok(AggregateDimension::ALL
        .iter()
        .map(|dimension| {
            let filter = match deployed.get(dimension) {
                Some((_, variant)) => DeploymentFilter::Deployed((*variant).to_string()),
                None => DeploymentFilter::Baseline,
            };
            (*dimension, filter)
        })
        .collect())
}

/// Convert a stored row into a provider result.
///
/// The rate to count conversion (`rate * population / 1000`) is an
/// approximation kept until the data set carries absolute counts.
fn to_result(row: &AggregateImpactRow) -> ImpactResult {
    let population = row.population;
    let to_count = |rate: f64| rate * population / RATE_DENOMINATOR;
    ImpactResult {
        year: row.year,
        population,
        number_cases: row.clinical_incidence.map(to_count),
        number_severe_cases: row.severe_incidence.map(to_count),
        prevalence_rate: row.prevalence_rate,
        direct_deaths: row.direct_deaths,
    }
}

/// Provider over [`AggregateImpactStore`] data.
pub struct AggregateImpactProvider {
    store: Arc<dyn AggregateImpactStore>,
    aliases: AreaAliases,
}

impl AggregateImpactProvider {
    pub fn new(store: Arc<dyn AggregateImpactStore>) -> Self {
        Self {
            store,
            aliases: AreaAliases::new(AREA_ALIASES),
        }
    }

    async fn fetch(
        &self,
        areas: &[Area],
        interventions: &[Intervention],
        age_group: &str,
        year_from: Option<i32>,
        year_to: Option<i32>,
    ) -> ImpactEngineResult<BTreeMap<AreaId, Vec<ImpactResult>>> {
        let deployments = deployment_filters(interventions)?;
        let index = AreaIndex::new(areas, &self.aliases);
        let query = AggregateQuery {
            scope: ImpactRowScope {
                area_names: index.provider_names(),
                age_group: age_group.to_string(),
                year_from,
                year_to,
            },
            deployments,
        };

        let rows = self
            .store
            .fetch_aggregate_rows(&query)
            .await
            .map_err(|e| ImpactError::from(e).with_operation("match_impact"))?;
        debug!(
            "aggregate: {} rows for {} areas ({} interventions)",
            rows.len(),
            areas.len(),
            interventions.len()
        );

        // Structurally identical rows collapse; anything left must be unique
        // per (area, year).
        let mut unique: Vec<AggregateImpactRow> = Vec::with_capacity(rows.len());
        for row in rows {
            if !unique.contains(&row) {
                unique.push(row);
            }
        }

        let mut seen: HashSet<(&str, i32)> = HashSet::new();
        for row in &unique {
            if !seen.insert((row.admin_name.as_str(), row.year)) {
                return Err(ImpactError::data_consistency_with_context(
                    format!(
                        "Multiple distinct aggregate rows for area '{}' in {}",
                        self.aliases.canonical_name(&row.admin_name),
                        row.year
                    ),
                    ErrorContext::new("match_impact")
                        .with_entity("area")
                        .with_entity_id(&row.admin_name)
                        .with_details(format!("year={}", row.year)),
                ));
            }
        }

        let mut results = index.empty_results();
        for row in &unique {
            let result = to_result(row);
            for area in index.areas_for(&row.admin_name) {
                results.entry(area.id).or_default().push(result.clone());
            }
        }
        sort_by_year(&mut results);
        Ok(results)
    }
}

#[async_trait]
impl ImpactProvider for AggregateImpactProvider {
    fn name(&self) -> &str {
        "aggregate"
    }

    fn supports_bulk(&self) -> bool {
        true
    }

    async fn match_impact(
        &self,
        area: &Area,
        interventions: &[Intervention],
        age_group: &str,
        year_from: Option<i32>,
        year_to: Option<i32>,
    ) -> ImpactEngineResult<Vec<ImpactResult>> {
        let mut results = self
            .fetch(
                std::slice::from_ref(area),
                interventions,
                age_group,
                year_from,
                year_to,
            )
            .await?;
        Ok(results.remove(&area.id).unwrap_or_default())
    }

    async fn match_impact_bulk(
        &self,
        areas: &[Area],
        interventions: &[Intervention],
        age_group: &str,
        year_from: Option<i32>,
        year_to: Option<i32>,
    ) -> ImpactEngineResult<BTreeMap<AreaId, Vec<ImpactResult>>> {
        self.fetch(areas, interventions, age_group, year_from, year_to)
            .await
    }

    async fn get_year_range(&self) -> ImpactEngineResult<(i32, i32)> {
        self.store
            .aggregate_year_range()
            .await
            .map_err(ImpactError::from)
    }

    async fn get_age_groups(&self) -> ImpactEngineResult<Vec<String>> {
        self.store
            .aggregate_age_groups()
            .await
            .map_err(ImpactError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalAggregateStore;
    use crate::db::repository::impact_data::{AggregateImpactRecord, DeploymentStatus};
    use crate::models::MetricWithCI;

    fn record(
        admin_name: &str,
        year: i32,
        cases_rate: f64,
        deployments: &[(AggregateDimension, &str)],
    ) -> AggregateImpactRecord {
        AggregateImpactRecord {
            row: AggregateImpactRow {
                admin_name: admin_name.to_string(),
                year,
                age_group: "0-5".to_string(),
                population: 2000.0,
                clinical_incidence: MetricWithCI::with_bounds(
                    cases_rate,
                    cases_rate - 10.0,
                    cases_rate + 10.0,
                ),
                severe_incidence: MetricWithCI::point(5.0),
                prevalence_rate: MetricWithCI::point(0.2),
                direct_deaths: MetricWithCI::point(3.0),
            },
            deployments: deployments
                .iter()
                .map(|(d, v)| (*d, DeploymentStatus::deployed(*v, "80")))
                .collect(),
        }
    }

    fn provider(records: Vec<AggregateImpactRecord>) -> AggregateImpactProvider {
        AggregateImpactProvider::new(Arc::new(LocalAggregateStore::new(records)))
    }

    #[test]
    fn test_synonym_codes_share_a_variant() {
        let filters = deployment_filters(&[
            Intervention::new(1, "cm_public"),
            Intervention::new(2, " CM_PRIVATE "),
        ])
        .unwrap();
        assert_eq!(
            filters[&AggregateDimension::CaseManagement],
            DeploymentFilter::Deployed("cm".to_string())
        );
        assert_eq!(filters[&AggregateDimension::Smc], DeploymentFilter::Baseline);
        assert_eq!(filters.len(), AggregateDimension::ALL.len());
    }

    #[test]
    fn test_conflicting_variants_are_rejected() {
        let err = deployment_filters(&[
            Intervention::new(1, "itn_campaign"),
            Intervention::new(2, "itn_campaign_pbo"),
        ])
        .unwrap_err();
        assert!(matches!(err, ImpactError::InvalidInput { .. }));
    }

    #[test]
    fn test_unknown_codes_are_ignored() {
        let filters = deployment_filters(&[Intervention::new(9, "mda")]).unwrap();
        assert!(filters
            .values()
            .all(|f| *f == DeploymentFilter::Baseline));
    }

    #[tokio::test]
    async fn test_rates_become_counts() {
        let provider = provider(vec![record("Kaya", 2025, 100.0, &[])]);
        let results = provider
            .match_impact(&Area::new(1, "Kaya"), &[], "0-5", None, None)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        // 100 per 1000 of 2000 people
        assert_eq!(
            results[0].number_cases,
            MetricWithCI::with_bounds(200.0, 180.0, 220.0)
        );
        assert_eq!(results[0].number_severe_cases, MetricWithCI::point(10.0));
        assert_eq!(results[0].prevalence_rate, MetricWithCI::point(0.2));
        assert_eq!(results[0].direct_deaths, MetricWithCI::point(3.0));
    }

    #[tokio::test]
    async fn test_only_matching_deployment_rows_are_used() {
        let provider = provider(vec![
            record("Kaya", 2025, 100.0, &[]),
            record("Kaya", 2025, 60.0, &[(AggregateDimension::Smc, "smc_spaq")]),
        ]);
        let results = provider
            .match_impact(
                &Area::new(1, "Kaya"),
                &[Intervention::new(3, "smc")],
                "0-5",
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(results[0].number_cases.value, Some(120.0));
    }

    #[tokio::test]
    async fn test_identical_rows_collapse() {
        let provider = provider(vec![
            record("Kaya", 2025, 100.0, &[]),
            record("Kaya", 2025, 100.0, &[]),
        ]);
        let results = provider
            .match_impact(&Area::new(1, "Kaya"), &[], "0-5", None, None)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_rows_for_one_year_fail() {
        let provider = provider(vec![
            record("Kaya", 2025, 100.0, &[]),
            record("Kaya", 2025, 90.0, &[]),
        ]);
        let err = provider
            .match_impact(&Area::new(1, "Kaya"), &[], "0-5", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ImpactError::DataConsistency { .. }));
    }

    #[tokio::test]
    async fn test_bulk_resolves_aliases_and_keeps_empty_areas() {
        let provider = provider(vec![
            record("Haut-Bassins", 2026, 100.0, &[]),
            record("Haut-Bassins", 2025, 100.0, &[]),
            record("Kaya", 2025, 50.0, &[]),
        ]);
        let areas = vec![
            Area::new(1, "Hauts-Bassins"),
            Area::new(2, "Kaya"),
            Area::new(3, "Dori"),
        ];
        let results = provider
            .match_impact_bulk(&areas, &[], "0-5", Some(2025), Some(2026))
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        let years: Vec<i32> = results[&AreaId(1)].iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2025, 2026]);
        assert_eq!(results[&AreaId(2)].len(), 1);
        assert!(results[&AreaId(3)].is_empty());
    }
}
