//! Derived metrics and cross-entry aggregation.
//!
//! Averted cases and cost per averted case both fall as their inputs rise, so
//! their lower bound is computed from the inputs' upper bounds and vice versa.

use crate::models::{ImpactMetrics, ImpactResult, MetricWithCI};

fn population_minus(population: f64, cases: Option<f64>, severe: Option<f64>) -> Option<f64> {
    match (cases, severe) {
        (Some(cases), Some(severe)) => Some(population - (cases + severe)),
        _ => None,
    }
}

/// Cases averted: `population - (cases + severe cases)`.
///
/// Each component is computed only when both inputs are present. The lower
/// bound uses the upper bounds of the inputs and the upper bound their lower
/// bounds.
pub fn averted_cases(
    population: f64,
    number_cases: &MetricWithCI,
    number_severe_cases: &MetricWithCI,
) -> MetricWithCI {
    MetricWithCI {
        value: population_minus(population, number_cases.value, number_severe_cases.value),
        lower: population_minus(population, number_cases.upper, number_severe_cases.upper),
        upper: population_minus(population, number_cases.lower, number_severe_cases.lower),
    }
}

fn cost_over(cost: f64, averted: Option<f64>) -> Option<f64> {
    averted.filter(|a| *a > 0.0).map(|a| cost / a)
}

/// Cost per averted case.
///
/// Empty without a cost. A component is present only when the averted bound
/// it divides by is strictly positive; the lower bound divides by the averted
/// upper bound.
pub fn cost_per_averted(cost: Option<f64>, averted_cases: &MetricWithCI) -> MetricWithCI {
    let Some(cost) = cost else {
        return MetricWithCI::default();
    };
    MetricWithCI {
        value: cost_over(cost, averted_cases.value),
        lower: cost_over(cost, averted_cases.upper),
        upper: cost_over(cost, averted_cases.lower),
    }
}

impl ImpactMetrics {
    /// Metrics for one area and year, with the area's cost for that year.
    pub fn from_result(result: &ImpactResult, cost: Option<f64>) -> Self {
        let averted = averted_cases(
            result.population,
            &result.number_cases,
            &result.number_severe_cases,
        );
        Self {
            number_cases: result.number_cases,
            number_severe_cases: result.number_severe_cases,
            prevalence_rate: result.prevalence_rate,
            averted_cases: averted,
            direct_deaths: result.direct_deaths,
            cost,
            cost_per_averted_case: cost_per_averted(cost, &averted),
            costed_averted_cases: if cost.is_some() {
                averted
            } else {
                MetricWithCI::default()
            },
        }
    }
}

/// Running per-component mean; a component is averaged over the entries
/// that have it.
#[derive(Default)]
struct ComponentMean {
    sum: MetricWithCI,
    value_count: usize,
    lower_count: usize,
    upper_count: usize,
}

impl ComponentMean {
    fn push(&mut self, metric: &MetricWithCI) {
        self.sum += *metric;
        self.value_count += usize::from(metric.value.is_some());
        self.lower_count += usize::from(metric.lower.is_some());
        self.upper_count += usize::from(metric.upper.is_some());
    }

    fn mean(&self) -> MetricWithCI {
        let over = |sum: Option<f64>, count: usize| {
            sum.filter(|_| count > 0).map(|s| s / count as f64)
        };
        MetricWithCI {
            value: over(self.sum.value, self.value_count),
            lower: over(self.sum.lower, self.lower_count),
            upper: over(self.sum.upper, self.upper_count),
        }
    }
}

/// Combine metrics of several entries into one higher-level summary.
///
/// Counts are summed. Prevalence is averaged over the entries that report a
/// prevalence value, each bound over those of them that report that bound.
/// Cost sums only the entries that have one, and cost per
/// averted case is re-derived from that sum and the averted cases of the same
/// entries.
pub fn aggregate_metrics<'a, I>(entries: I) -> ImpactMetrics
where
    I: IntoIterator<Item = &'a ImpactMetrics>,
{
    let mut total = ImpactMetrics::default();
    let mut prevalence = ComponentMean::default();

    for entry in entries {
        total.number_cases += entry.number_cases;
        total.number_severe_cases += entry.number_severe_cases;
        total.averted_cases += entry.averted_cases;
        total.direct_deaths += entry.direct_deaths;

        if entry.prevalence_rate.value.is_some() {
            prevalence.push(&entry.prevalence_rate);
        }

        if let Some(cost) = entry.cost {
            total.cost = Some(total.cost.unwrap_or(0.0) + cost);
            total.costed_averted_cases += entry.costed_averted_cases;
        }
    }

    total.prevalence_rate = prevalence.mean();
    total.cost_per_averted_case = cost_per_averted(total.cost, &total.costed_averted_cases);
    total
}
