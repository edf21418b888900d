//! Impact data providers.
//!
//! An [`ImpactProvider`] answers "what are the yearly epidemiological numbers
//! for these areas under this set of interventions?" against one external
//! data set. Two families exist:
//!
//! - [`AggregateImpactProvider`]: pre-aggregated population-level rows with a
//!   deployment status column per intervention dimension. Supports bulk
//!   queries.
//! - [`ReplicateImpactProvider`]: raw stochastic replicates with boolean
//!   deployment flags, summarised to mean / min / max per (area, year).
//!
//! Each provider owns its intervention-code vocabulary, its area-name aliases
//! and its cross-replicate policy. Providers are resolved per tenant through a
//! [`ProviderRegistry`].

pub mod aggregate;
pub mod factory;
pub mod names;
pub mod registry;
pub mod replicate;

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};

use crate::error::{ImpactEngineResult, ImpactError};
use crate::models::{Area, AreaId, ImpactResult, Intervention};

pub use aggregate::AggregateImpactProvider;
pub use factory::{ProviderFactory, ProviderKind};
pub use names::AreaAliases;
pub use registry::{resolve_provider, LocalProviderRegistry, ProviderRegistry};
pub use replicate::ReplicateImpactProvider;

/// Source of per-area, per-year impact data.
///
/// Implementations guarantee at most one [`ImpactResult`] per year for an
/// area and fail with [`ImpactError::DataConsistency`] when the backing data
/// would yield more.
#[async_trait]
pub trait ImpactProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Whether [`match_impact_bulk`](Self::match_impact_bulk) is available.
    fn supports_bulk(&self) -> bool {
        false
    }

    /// Yearly results for one area under the given interventions.
    async fn match_impact(
        &self,
        area: &Area,
        interventions: &[Intervention],
        age_group: &str,
        year_from: Option<i32>,
        year_to: Option<i32>,
    ) -> ImpactEngineResult<Vec<ImpactResult>>;

    /// Yearly results for many areas sharing the same interventions.
    ///
    /// Every requested area is present in the returned map, with an empty
    /// list when the data set has nothing for it.
    async fn match_impact_bulk(
        &self,
        _areas: &[Area],
        _interventions: &[Intervention],
        _age_group: &str,
        _year_from: Option<i32>,
        _year_to: Option<i32>,
    ) -> ImpactEngineResult<BTreeMap<AreaId, Vec<ImpactResult>>> {
        Err(ImpactError::configuration(format!(
            "Provider '{}' does not support bulk queries",
            self.name()
        ))
        .with_operation("match_impact_bulk"))
    }

    /// Smallest and largest year in the provider's data.
    async fn get_year_range(&self) -> ImpactEngineResult<(i32, i32)>;

    /// Valid age-group labels, sorted.
    async fn get_age_groups(&self) -> ImpactEngineResult<Vec<String>>;
}

/// Trimmed, lower-cased intervention code.
pub(crate) fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Maps provider-side area names back to the requested areas.
pub(crate) struct AreaIndex<'a> {
    by_provider_name: HashMap<String, Vec<&'a Area>>,
}

impl<'a> AreaIndex<'a> {
    pub(crate) fn new(areas: &'a [Area], aliases: &AreaAliases) -> Self {
        let mut by_provider_name: HashMap<String, Vec<&'a Area>> = HashMap::new();
        for area in areas {
            by_provider_name
                .entry(aliases.provider_name(&area.name).to_string())
                .or_default()
                .push(area);
        }
        Self { by_provider_name }
    }

    /// Provider-side names to query for, sorted.
    pub(crate) fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_provider_name.keys().cloned().collect();
        names.sort();
        names
    }

    /// Requested areas a provider-side name belongs to.
    pub(crate) fn areas_for(&self, provider_name: &str) -> &[&'a Area] {
        self.by_provider_name
            .get(provider_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// An empty result list for every requested area.
    pub(crate) fn empty_results(&self) -> BTreeMap<AreaId, Vec<ImpactResult>> {
        self.by_provider_name
            .values()
            .flatten()
            .map(|area| (area.id, Vec::new()))
            .collect()
    }
}

/// Sort each area's results chronologically.
pub(crate) fn sort_by_year(results: &mut BTreeMap<AreaId, Vec<ImpactResult>>) {
    for list in results.values_mut() {
        list.sort_by_key(|r| r.year);
    }
}
