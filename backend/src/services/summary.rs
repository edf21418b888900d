//! Roll-up of per-area, per-year metrics into year, area and scenario summaries.

use std::collections::BTreeMap;

use super::derived::aggregate_metrics;
use crate::models::{AreaId, AreaMetrics, ImpactMetrics, ScenarioId, ScenarioImpact, YearMetrics};

/// Metrics of one area in one year.
#[derive(Debug, Clone)]
pub struct AreaYearMetrics {
    pub year: i32,
    pub area: AreaMetrics,
}

/// Build the scenario summary from per-area, per-year entries.
///
/// Year totals sum that year's areas, lifetime area totals sum that area's
/// years, and scenario totals sum the year totals. Output lists are ordered
/// by year and area id.
pub fn summarize_scenario(scenario_id: ScenarioId, entries: Vec<AreaYearMetrics>) -> ScenarioImpact {
    let mut by_year: BTreeMap<i32, Vec<AreaMetrics>> = BTreeMap::new();
    let mut by_area: BTreeMap<AreaId, (String, Vec<ImpactMetrics>)> = BTreeMap::new();

    for entry in entries {
        by_area
            .entry(entry.area.area_id)
            .or_insert_with(|| (entry.area.area_name.clone(), Vec::new()))
            .1
            .push(entry.area.metrics.clone());
        by_year.entry(entry.year).or_default().push(entry.area);
    }

    let by_year: Vec<YearMetrics> = by_year
        .into_iter()
        .map(|(year, mut areas)| {
            areas.sort_by_key(|a| a.area_id);
            YearMetrics {
                year,
                metrics: aggregate_metrics(areas.iter().map(|a| &a.metrics)),
                areas,
            }
        })
        .collect();

    let areas: Vec<AreaMetrics> = by_area
        .into_iter()
        .map(|(area_id, (area_name, yearly))| AreaMetrics {
            area_id,
            area_name,
            metrics: aggregate_metrics(&yearly),
        })
        .collect();

    ScenarioImpact {
        scenario_id,
        metrics: aggregate_metrics(by_year.iter().map(|y| &y.metrics)),
        by_year,
        areas,
    }
}
