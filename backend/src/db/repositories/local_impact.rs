//! In-memory impact-data stores.
//!
//! Both stores hold their records behind an `Arc` so that providers built for
//! several tenants can share one loaded data set. Filters are evaluated with
//! the same predicates the SQL back-end applies.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::db::repository::impact_data::{
    AggregateImpactRecord, AggregateImpactRow, AggregateQuery, ReplicateImpactRecord,
    ReplicateImpactRow, ReplicateQuery,
};
use crate::db::repository::{
    AggregateImpactStore, ErrorContext, RepositoryError, RepositoryResult, ReplicateImpactStore,
};

fn load_records<T: DeserializeOwned>(path: &Path) -> RepositoryResult<Vec<T>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RepositoryError::configuration(format!(
            "Failed to read impact data {}: {}",
            path.display(),
            e
        ))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        RepositoryError::configuration(format!(
            "Failed to parse impact data {}: {}",
            path.display(),
            e
        ))
    })
}

fn year_range_of<I>(years: I, operation: &str) -> RepositoryResult<(i32, i32)>
where
    I: Iterator<Item = i32>,
{
    let (min, max) = years.fold((None, None), |(min, max): (Option<i32>, Option<i32>), y| {
        (
            Some(min.map_or(y, |m| m.min(y))),
            Some(max.map_or(y, |m| m.max(y))),
        )
    });
    match (min, max) {
        (Some(min), Some(max)) => Ok((min, max)),
        _ => Err(RepositoryError::not_found_with_context(
            "Impact data set is empty",
            ErrorContext::new(operation),
        )),
    }
}

fn sorted_labels<'a, I>(labels: I) -> Vec<String>
where
    I: Iterator<Item = &'a str>,
{
    labels
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// In-memory aggregate (population-level) data set.
#[derive(Clone, Default)]
pub struct LocalAggregateStore {
    records: Arc<Vec<AggregateImpactRecord>>,
}

impl LocalAggregateStore {
    pub fn new(records: Vec<AggregateImpactRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    /// Load a JSON array of aggregate records.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        Ok(Self::new(load_records(path.as_ref())?))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl AggregateImpactStore for LocalAggregateStore {
    async fn fetch_aggregate_rows(
        &self,
        query: &AggregateQuery,
    ) -> RepositoryResult<Vec<AggregateImpactRow>> {
        Ok(self
            .records
            .iter()
            .filter(|record| record.matches(query))
            .map(|record| record.row.clone())
            .collect())
    }

    async fn aggregate_year_range(&self) -> RepositoryResult<(i32, i32)> {
        year_range_of(
            self.records.iter().map(|r| r.row.year),
            "aggregate_year_range",
        )
    }

    async fn aggregate_age_groups(&self) -> RepositoryResult<Vec<String>> {
        Ok(sorted_labels(
            self.records.iter().map(|r| r.row.age_group.as_str()),
        ))
    }
}

/// In-memory replicate (per-seed) data set.
#[derive(Clone, Default)]
pub struct LocalReplicateStore {
    records: Arc<Vec<ReplicateImpactRecord>>,
}

impl LocalReplicateStore {
    pub fn new(records: Vec<ReplicateImpactRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    /// Load a JSON array of replicate records.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        Ok(Self::new(load_records(path.as_ref())?))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ReplicateImpactStore for LocalReplicateStore {
    async fn fetch_replicate_rows(
        &self,
        query: &ReplicateQuery,
    ) -> RepositoryResult<Vec<ReplicateImpactRow>> {
        Ok(self
            .records
            .iter()
            .filter(|record| record.matches(query))
            .map(|record| record.row.clone())
            .collect())
    }

    async fn replicate_year_range(&self) -> RepositoryResult<(i32, i32)> {
        year_range_of(
            self.records.iter().map(|r| r.row.year),
            "replicate_year_range",
        )
    }

    async fn replicate_age_groups(&self) -> RepositoryResult<Vec<String>> {
        Ok(sorted_labels(
            self.records.iter().map(|r| r.row.age_group.as_str()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::impact_data::{
        AggregateDimension, DeploymentFilter, DeploymentStatus, ImpactRowScope, ReplicateFlag,
    };
    use crate::models::MetricWithCI;
    use std::collections::BTreeMap;

    fn aggregate_record(year: i32, age_group: &str, smc: Option<&str>) -> AggregateImpactRecord {
        let mut deployments = BTreeMap::new();
        if let Some(variant) = smc {
            deployments.insert(
                AggregateDimension::Smc,
                DeploymentStatus::deployed(variant, "high"),
            );
        }
        AggregateImpactRecord {
            row: AggregateImpactRow {
                admin_name: "Kaya".to_string(),
                year,
                age_group: age_group.to_string(),
                population: 1000.0,
                clinical_incidence: MetricWithCI::point(100.0),
                severe_incidence: MetricWithCI::default(),
                prevalence_rate: MetricWithCI::default(),
                direct_deaths: MetricWithCI::default(),
            },
            deployments,
        }
    }

    fn scope() -> ImpactRowScope {
        ImpactRowScope {
            area_names: vec!["Kaya".to_string()],
            age_group: "0-5".to_string(),
            year_from: None,
            year_to: None,
        }
    }

    #[tokio::test]
    async fn test_aggregate_store_filters_by_deployment() {
        let store = LocalAggregateStore::new(vec![
            aggregate_record(2025, "0-5", None),
            aggregate_record(2025, "0-5", Some("smc_spaq")),
        ]);

        let mut deployments: BTreeMap<_, _> = AggregateDimension::ALL
            .iter()
            .map(|d| (*d, DeploymentFilter::Baseline))
            .collect();
        let baseline = AggregateQuery {
            scope: scope(),
            deployments: deployments.clone(),
        };
        assert_eq!(store.fetch_aggregate_rows(&baseline).await.unwrap().len(), 1);

        deployments.insert(
            AggregateDimension::Smc,
            DeploymentFilter::Deployed("smc_spaq".to_string()),
        );
        let deployed = AggregateQuery {
            scope: scope(),
            deployments,
        };
        assert_eq!(store.fetch_aggregate_rows(&deployed).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_aggregate_store_reports_extent() {
        let store = LocalAggregateStore::new(vec![
            aggregate_record(2027, "0-5", None),
            aggregate_record(2024, "all", None),
            aggregate_record(2025, "0-5", None),
        ]);
        assert_eq!(store.aggregate_year_range().await.unwrap(), (2024, 2027));
        assert_eq!(
            store.aggregate_age_groups().await.unwrap(),
            vec!["0-5".to_string(), "all".to_string()]
        );
    }

    #[tokio::test]
    async fn test_empty_store_has_no_year_range() {
        let store = LocalReplicateStore::default();
        let err = store.replicate_year_range().await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert!(store.replicate_age_groups().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replicate_store_matches_every_flag() {
        let record = ReplicateImpactRecord {
            row: ReplicateImpactRow {
                admin_name: "Kaya".to_string(),
                year: 2025,
                age_group: "0-5".to_string(),
                seed: 1,
                population: 1000.0,
                cases: Some(50.0),
                severe_cases: None,
                prevalence: None,
                direct_deaths: None,
            },
            deployed: [ReplicateFlag::Itn, ReplicateFlag::ItnPbo].into_iter().collect(),
        };
        let store = LocalReplicateStore::new(vec![record]);

        let mut flags: BTreeMap<_, _> = ReplicateFlag::ALL.iter().map(|f| (*f, false)).collect();
        let query = ReplicateQuery {
            scope: scope(),
            flags: flags.clone(),
        };
        assert!(store.fetch_replicate_rows(&query).await.unwrap().is_empty());

        flags.insert(ReplicateFlag::Itn, true);
        flags.insert(ReplicateFlag::ItnPbo, true);
        let query = ReplicateQuery {
            scope: scope(),
            flags,
        };
        assert_eq!(store.fetch_replicate_rows(&query).await.unwrap().len(), 1);
    }
}
