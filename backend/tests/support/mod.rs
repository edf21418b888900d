//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};

use impact_engine::db::repository::impact_data::{
    AggregateDimension, AggregateImpactRecord, AggregateImpactRow, DeploymentStatus,
    ReplicateFlag, ReplicateImpactRecord, ReplicateImpactRow,
};
use impact_engine::db::{LocalAggregateStore, LocalReplicateStore, LocalRepository};
use impact_engine::models::{
    Area, AreaId, BudgetId, BudgetRecord, Intervention, MetricWithCI, Scenario, ScenarioId,
};

pub const AGE_GROUP: &str = "0-5";
pub const SCENARIO: ScenarioId = ScenarioId(1);

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to process-global env
/// vars across parallel tests. `None` removes the variable.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// ==================== Planning data ====================

pub fn hauts_bassins() -> Area {
    Area::new(1, "Hauts-Bassins")
}

pub fn sahel() -> Area {
    Area::new(2, "Sahel")
}

pub fn centre_nord() -> Area {
    Area::new(3, "Centre-Nord")
}

pub fn itn_campaign() -> Intervention {
    Intervention::new(10, "itn_campaign")
}

pub fn smc() -> Intervention {
    Intervention::new(11, "smc")
}

pub fn irs() -> Intervention {
    Intervention::new(12, "irs")
}

/// Scenario 1: nets + SMC in Hauts-Bassins and Sahel, IRS in Centre-Nord.
pub fn seeded_repository() -> LocalRepository {
    let repo = LocalRepository::new();
    repo.insert_scenario(Scenario {
        id: SCENARIO,
        name: "NSP 2026-2027".to_string(),
        start_year: 2026,
        end_year: 2027,
    });
    repo.assign(SCENARIO, hauts_bassins(), itn_campaign());
    repo.assign(SCENARIO, hauts_bassins(), smc());
    repo.assign(SCENARIO, sahel(), smc());
    repo.assign(SCENARIO, sahel(), itn_campaign());
    repo.assign(SCENARIO, centre_nord(), irs());
    repo
}

/// Budget covering 2026 for every area and 2027 for Hauts-Bassins only.
pub fn budget(id: i64, created_hour: u32, scale: f64) -> BudgetRecord {
    let mut costs: BTreeMap<i32, BTreeMap<AreaId, f64>> = BTreeMap::new();
    costs.insert(
        2026,
        BTreeMap::from([
            (AreaId(1), 8900.0 * scale),
            (AreaId(2), 8900.0 * scale),
            (AreaId(3), 8900.0 * scale),
        ]),
    );
    costs.insert(2027, BTreeMap::from([(AreaId(1), 8900.0 * scale)]));
    BudgetRecord {
        id: BudgetId(id),
        scenario_id: SCENARIO,
        created_at: Utc
            .with_ymd_and_hms(2025, 6, 1, created_hour, 0, 0)
            .single()
            .expect("valid timestamp"),
        costs,
    }
}

// ==================== Aggregate impact data ====================

/// One aggregate row: population 10 000, 100 clinical and 10 severe cases per
/// 1000 with +-20% bounds, prevalence 0.25.
pub fn aggregate_record(
    admin_name: &str,
    year: i32,
    age_group: &str,
    deployments: &[(AggregateDimension, &str)],
) -> AggregateImpactRecord {
    AggregateImpactRecord {
        row: AggregateImpactRow {
            admin_name: admin_name.to_string(),
            year,
            age_group: age_group.to_string(),
            population: 10_000.0,
            clinical_incidence: MetricWithCI::with_bounds(100.0, 80.0, 120.0),
            severe_incidence: MetricWithCI::with_bounds(10.0, 8.0, 12.0),
            prevalence_rate: MetricWithCI::with_bounds(0.25, 0.2, 0.3),
            direct_deaths: MetricWithCI::point(2.0),
        },
        deployments: deployments
            .iter()
            .map(|(dimension, variant)| (*dimension, DeploymentStatus::deployed(*variant, "0.8")))
            .collect(),
    }
}

const NETS_AND_SMC: &[(AggregateDimension, &str)] = &[
    (AggregateDimension::Itn, "itn_std"),
    (AggregateDimension::Smc, "smc_spaq"),
];

const IRS_ONLY: &[(AggregateDimension, &str)] = &[(AggregateDimension::Irs, "irs")];

/// Rows for the seeded scenario in both years, plus decoys that must never
/// match (baseline rows, another age group, a different net variant).
pub fn aggregate_records() -> Vec<AggregateImpactRecord> {
    let mut records = Vec::new();
    for year in [2026, 2027] {
        records.push(aggregate_record("Haut-Bassins", year, AGE_GROUP, NETS_AND_SMC));
        records.push(aggregate_record("Sahel", year, AGE_GROUP, NETS_AND_SMC));
        records.push(aggregate_record("Centre Nord", year, AGE_GROUP, IRS_ONLY));

        records.push(aggregate_record("Sahel", year, AGE_GROUP, &[]));
        records.push(aggregate_record("Sahel", year, "all", NETS_AND_SMC));
        records.push(aggregate_record(
            "Sahel",
            year,
            AGE_GROUP,
            &[
                (AggregateDimension::Itn, "itn_pbo"),
                (AggregateDimension::Smc, "smc_spaq"),
            ],
        ));
    }
    records
}

pub fn aggregate_store() -> Arc<LocalAggregateStore> {
    Arc::new(LocalAggregateStore::new(aggregate_records()))
}

// ==================== Replicate impact data ====================

pub fn replicate_record(
    admin_name: &str,
    year: i32,
    seed: i64,
    cases: f64,
    deployed: &[ReplicateFlag],
) -> ReplicateImpactRecord {
    ReplicateImpactRecord {
        row: ReplicateImpactRow {
            admin_name: admin_name.to_string(),
            year,
            age_group: AGE_GROUP.to_string(),
            seed,
            population: 10_000.0,
            cases: Some(cases),
            severe_cases: Some(cases / 10.0),
            prevalence: Some(0.2),
            direct_deaths: None,
        },
        deployed: deployed.iter().copied().collect(),
    }
}

/// Three seeds per year for Hauts-Bassins and Sahel with nets + SMC, and for
/// Centre-Nord with IRS.
pub fn replicate_store() -> Arc<LocalReplicateStore> {
    let nets_and_smc = [ReplicateFlag::Itn, ReplicateFlag::ItnStandard, ReplicateFlag::Smc];
    let mut records = Vec::new();
    for year in [2026, 2027] {
        for (seed, cases) in [(1, 900.0), (2, 1000.0), (3, 1100.0)] {
            records.push(replicate_record("Hauts Bassins", year, seed, cases, &nets_and_smc));
            records.push(replicate_record("Sahel", year, seed, cases, &nets_and_smc));
            records.push(replicate_record("Centre-Nord", year, seed, cases, &[ReplicateFlag::Irs]));
            records.push(replicate_record("Sahel", year, seed, 5000.0, &[]));
        }
    }
    Arc::new(LocalReplicateStore::new(records))
}
