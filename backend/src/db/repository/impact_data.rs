//! Impact-data stores backing the two provider families.
//!
//! Providers translate a request (areas, interventions, age group, years) into
//! one of the typed queries below. Stores evaluate the query and return raw
//! rows; they never aggregate, convert units or check consistency.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::error::RepositoryResult;
use crate::models::MetricWithCI;

/// Deployment status value meaning "intervention not deployed".
pub const BASELINE_VARIANT: &str = "baseline";

/// Area, age group and year window shared by every impact query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactRowScope {
    /// Area names in the provider's own naming scheme.
    pub area_names: Vec<String>,
    pub age_group: String,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}

impl ImpactRowScope {
    /// Whether a row with these keys falls inside the scope.
    pub fn contains(&self, admin_name: &str, year: i32, age_group: &str) -> bool {
        self.age_group == age_group
            && self.year_from.map_or(true, |from| year >= from)
            && self.year_to.map_or(true, |to| year <= to)
            && self.area_names.iter().any(|name| name == admin_name)
    }
}

// ==================== Aggregate (population-level) data ====================

/// Deployment axes of the aggregate data set. Each axis is stored as a
/// status column (baseline or variant id) plus a coverage column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateDimension {
    CaseManagement,
    Iptp,
    Smc,
    Pmc,
    Vaccine,
    Itn,
    Irs,
    Lsm,
}

impl AggregateDimension {
    pub const ALL: [AggregateDimension; 8] = [
        AggregateDimension::CaseManagement,
        AggregateDimension::Iptp,
        AggregateDimension::Smc,
        AggregateDimension::Pmc,
        AggregateDimension::Vaccine,
        AggregateDimension::Itn,
        AggregateDimension::Irs,
        AggregateDimension::Lsm,
    ];
}

/// Stored deployment status of one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub variant: String,
    #[serde(default)]
    pub coverage: Option<String>,
}

impl DeploymentStatus {
    pub fn baseline() -> Self {
        Self {
            variant: BASELINE_VARIANT.to_string(),
            coverage: None,
        }
    }

    pub fn deployed(variant: impl Into<String>, coverage: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            coverage: Some(coverage.into()),
        }
    }
}

/// Filter applied to one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentFilter {
    /// Status must be the baseline id and coverage must be empty.
    Baseline,
    /// Status must be this variant id and coverage must be set.
    Deployed(String),
}

impl DeploymentFilter {
    pub fn matches(&self, status: &DeploymentStatus) -> bool {
        match self {
            DeploymentFilter::Baseline => {
                status.variant == BASELINE_VARIANT && status.coverage.is_none()
            }
            DeploymentFilter::Deployed(variant) => {
                status.variant == *variant && status.coverage.is_some()
            }
        }
    }
}

/// Query against the aggregate data set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateQuery {
    pub scope: ImpactRowScope,
    /// One filter per dimension.
    pub deployments: BTreeMap<AggregateDimension, DeploymentFilter>,
}

/// Metric columns of one aggregate row.
///
/// Clinical and severe incidence are rates per 1000 population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateImpactRow {
    pub admin_name: String,
    pub year: i32,
    pub age_group: String,
    pub population: f64,
    #[serde(default)]
    pub clinical_incidence: MetricWithCI,
    #[serde(default)]
    pub severe_incidence: MetricWithCI,
    #[serde(default)]
    pub prevalence_rate: MetricWithCI,
    #[serde(default)]
    pub direct_deaths: MetricWithCI,
}

/// A full stored aggregate record: metrics plus deployment columns.
///
/// Dimensions absent from `deployments` are at baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateImpactRecord {
    #[serde(flatten)]
    pub row: AggregateImpactRow,
    #[serde(default)]
    pub deployments: BTreeMap<AggregateDimension, DeploymentStatus>,
}

impl AggregateImpactRecord {
    pub fn status(&self, dimension: AggregateDimension) -> DeploymentStatus {
        self.deployments
            .get(&dimension)
            .cloned()
            .unwrap_or_else(DeploymentStatus::baseline)
    }

    pub fn matches(&self, query: &AggregateQuery) -> bool {
        query
            .scope
            .contains(&self.row.admin_name, self.row.year, &self.row.age_group)
            && query
                .deployments
                .iter()
                .all(|(dimension, filter)| filter.matches(&self.status(*dimension)))
    }
}

/// Store holding pre-aggregated impact rows.
#[async_trait]
pub trait AggregateImpactStore: Send + Sync {
    /// Fetch every row matching the query.
    async fn fetch_aggregate_rows(
        &self,
        query: &AggregateQuery,
    ) -> RepositoryResult<Vec<AggregateImpactRow>>;

    /// Smallest and largest year present in the data set.
    async fn aggregate_year_range(&self) -> RepositoryResult<(i32, i32)>;

    /// Distinct age-group labels, sorted.
    async fn aggregate_age_groups(&self) -> RepositoryResult<Vec<String>>;
}

// ==================== Replicate (per-seed) data ====================

/// Boolean deployment flags of the replicate data set.
///
/// `Itn` is the generic net flag; the three net sub-variants each imply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicateFlag {
    CaseManagement,
    Iptp,
    Smc,
    Pmc,
    Vaccine,
    Irs,
    Lsm,
    Itn,
    ItnStandard,
    ItnPbo,
    ItnDualAi,
}

impl ReplicateFlag {
    pub const ALL: [ReplicateFlag; 11] = [
        ReplicateFlag::CaseManagement,
        ReplicateFlag::Iptp,
        ReplicateFlag::Smc,
        ReplicateFlag::Pmc,
        ReplicateFlag::Vaccine,
        ReplicateFlag::Irs,
        ReplicateFlag::Lsm,
        ReplicateFlag::Itn,
        ReplicateFlag::ItnStandard,
        ReplicateFlag::ItnPbo,
        ReplicateFlag::ItnDualAi,
    ];

    pub fn is_net_variant(self) -> bool {
        matches!(
            self,
            ReplicateFlag::ItnStandard | ReplicateFlag::ItnPbo | ReplicateFlag::ItnDualAi
        )
    }
}

/// Query against the replicate data set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicateQuery {
    pub scope: ImpactRowScope,
    /// Required value of every flag.
    pub flags: BTreeMap<ReplicateFlag, bool>,
}

/// One stochastic replicate for an (area, year, age group) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateImpactRow {
    pub admin_name: String,
    pub year: i32,
    pub age_group: String,
    pub seed: i64,
    pub population: f64,
    #[serde(default)]
    pub cases: Option<f64>,
    #[serde(default)]
    pub severe_cases: Option<f64>,
    #[serde(default)]
    pub prevalence: Option<f64>,
    #[serde(default)]
    pub direct_deaths: Option<f64>,
}

/// A stored replicate row plus the set of flags that are `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateImpactRecord {
    #[serde(flatten)]
    pub row: ReplicateImpactRow,
    #[serde(default)]
    pub deployed: BTreeSet<ReplicateFlag>,
}

impl ReplicateImpactRecord {
    pub fn matches(&self, query: &ReplicateQuery) -> bool {
        query
            .scope
            .contains(&self.row.admin_name, self.row.year, &self.row.age_group)
            && query
                .flags
                .iter()
                .all(|(flag, wanted)| self.deployed.contains(flag) == *wanted)
    }
}

/// Store holding raw replicate rows.
#[async_trait]
pub trait ReplicateImpactStore: Send + Sync {
    /// Fetch every replicate row matching the query.
    async fn fetch_replicate_rows(
        &self,
        query: &ReplicateQuery,
    ) -> RepositoryResult<Vec<ReplicateImpactRow>>;

    /// Smallest and largest year present in the data set.
    async fn replicate_year_range(&self) -> RepositoryResult<(i32, i32)>;

    /// Distinct age-group labels, sorted.
    async fn replicate_age_groups(&self) -> RepositoryResult<Vec<String>>;
}
