//! Impact measurements and the area / year / scenario summaries built from them.

use serde::{Deserialize, Serialize};

use super::ids::{AreaId, ScenarioId};
use super::metric::MetricWithCI;

/// One year of epidemiological data for a single area, as reported by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    pub year: i32,
    pub population: f64,
    pub number_cases: MetricWithCI,
    pub number_severe_cases: MetricWithCI,
    pub prevalence_rate: MetricWithCI,
    pub direct_deaths: MetricWithCI,
}

/// Metric set shared by every summary level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetrics {
    pub number_cases: MetricWithCI,
    pub number_severe_cases: MetricWithCI,
    pub prevalence_rate: MetricWithCI,
    pub averted_cases: MetricWithCI,
    pub direct_deaths: MetricWithCI,
    pub cost: Option<f64>,
    pub cost_per_averted_case: MetricWithCI,
    /// Averted cases of the entries that carry a cost; denominator for
    /// re-deriving `cost_per_averted_case` at higher levels.
    #[serde(skip)]
    pub(crate) costed_averted_cases: MetricWithCI,
}

/// Metrics for one area, either for a single year or summed over all years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaMetrics {
    pub area_id: AreaId,
    pub area_name: String,
    #[serde(flatten)]
    pub metrics: ImpactMetrics,
}

/// Totals for one year with the per-area breakdown of that year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearMetrics {
    pub year: i32,
    #[serde(flatten)]
    pub metrics: ImpactMetrics,
    pub areas: Vec<AreaMetrics>,
}

/// Complete impact estimate for a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioImpact {
    pub scenario_id: ScenarioId,
    #[serde(flatten)]
    pub metrics: ImpactMetrics,
    pub by_year: Vec<YearMetrics>,
    /// Lifetime totals per area.
    pub areas: Vec<AreaMetrics>,
}

impl ScenarioImpact {
    /// An estimate without any data: empty breakdowns and all-`None` totals.
    pub fn empty(scenario_id: ScenarioId) -> Self {
        Self {
            scenario_id,
            metrics: ImpactMetrics::default(),
            by_year: Vec::new(),
            areas: Vec::new(),
        }
    }
}
