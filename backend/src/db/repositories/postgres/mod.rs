//! Postgres repository implementation using Diesel.
//!
//! A single [`PostgresRepository`] serves every store the engine reads from:
//! scenario assignments, budgets and both impact data sets. All queries are
//! read-only.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)

use async_trait::async_trait;
use diesel::dsl::{max, min};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use std::time::Duration;
use tokio::task;

use crate::db::repository::impact_data::{
    AggregateDimension, AggregateImpactRow, AggregateQuery, DeploymentFilter, ReplicateFlag,
    ReplicateImpactRow, ReplicateQuery, BASELINE_VARIANT,
};
use crate::db::repository::{
    AggregateImpactStore, AssignmentRepository, BudgetRepository, ErrorContext, RepositoryError,
    RepositoryResult, ReplicateImpactStore,
};
use crate::models::{
    Area, AreaId, BudgetRecord, Intervention, InterventionAssignment, InterventionId, Scenario,
    ScenarioId,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Create a new repository backed by a connection pool.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        Ok(Self { pool })
    }

    /// Run a blocking database operation on the blocking thread pool.
    ///
    /// Failures are returned as-is; nothing is retried.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new(operation).with_details("get_connection"),
                )
            })?;
            f(&mut conn).map_err(|e| e.with_operation(operation))
        })
        .await
        .map_err(|e| RepositoryError::InternalError {
            message: format!("Task join error: {}", e),
            context: ErrorContext::new("spawn_blocking"),
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

type AggregateBoxed = aggregate_impact::BoxedQuery<'static, Pg, aggregate_impact::SqlType>;

/// Applies one dimension filter to a boxed aggregate query.
macro_rules! filter_deployment {
    ($query:expr, $filter:expr, $status:expr, $coverage:expr) => {
        match $filter {
            DeploymentFilter::Baseline => $query
                .filter($status.eq(BASELINE_VARIANT))
                .filter($coverage.is_null()),
            DeploymentFilter::Deployed(variant) => $query
                .filter($status.eq(variant.clone()))
                .filter($coverage.is_not_null()),
        }
    };
}

fn aggregate_rows_query(query: &AggregateQuery) -> AggregateBoxed {
    use schema::aggregate_impact::dsl::*;

    let scope = &query.scope;
    let mut boxed = aggregate_impact
        .into_boxed()
        .filter(admin_name.eq_any(scope.area_names.clone()))
        .filter(age_group.eq(scope.age_group.clone()));
    if let Some(from) = scope.year_from {
        boxed = boxed.filter(year.ge(from));
    }
    if let Some(to) = scope.year_to {
        boxed = boxed.filter(year.le(to));
    }

    for (dimension, filter) in &query.deployments {
        boxed = match dimension {
            AggregateDimension::CaseManagement => {
                filter_deployment!(boxed, filter, deployed_cm, coverage_cm)
            }
            AggregateDimension::Iptp => {
                filter_deployment!(boxed, filter, deployed_iptp, coverage_iptp)
            }
            AggregateDimension::Smc => filter_deployment!(boxed, filter, deployed_smc, coverage_smc),
            AggregateDimension::Pmc => filter_deployment!(boxed, filter, deployed_pmc, coverage_pmc),
            AggregateDimension::Vaccine => {
                filter_deployment!(boxed, filter, deployed_vaccine, coverage_vaccine)
            }
            AggregateDimension::Itn => filter_deployment!(boxed, filter, deployed_itn, coverage_itn),
            AggregateDimension::Irs => filter_deployment!(boxed, filter, deployed_irs, coverage_irs),
            AggregateDimension::Lsm => filter_deployment!(boxed, filter, deployed_lsm, coverage_lsm),
        };
    }
    boxed
}

type ReplicateBoxed = replicate_impact::BoxedQuery<'static, Pg, replicate_impact::SqlType>;

fn replicate_rows_query(query: &ReplicateQuery) -> ReplicateBoxed {
    use schema::replicate_impact::dsl::*;

    let scope = &query.scope;
    let mut boxed = replicate_impact
        .into_boxed()
        .filter(admin_name.eq_any(scope.area_names.clone()))
        .filter(age_group.eq(scope.age_group.clone()));
    if let Some(from) = scope.year_from {
        boxed = boxed.filter(year.ge(from));
    }
    if let Some(to) = scope.year_to {
        boxed = boxed.filter(year.le(to));
    }

    for (flag, wanted) in &query.flags {
        let wanted = *wanted;
        boxed = match flag {
            ReplicateFlag::CaseManagement => boxed.filter(deployed_cm.eq(wanted)),
            ReplicateFlag::Iptp => boxed.filter(deployed_iptp.eq(wanted)),
            ReplicateFlag::Smc => boxed.filter(deployed_smc.eq(wanted)),
            ReplicateFlag::Pmc => boxed.filter(deployed_pmc.eq(wanted)),
            ReplicateFlag::Vaccine => boxed.filter(deployed_vaccine.eq(wanted)),
            ReplicateFlag::Irs => boxed.filter(deployed_irs.eq(wanted)),
            ReplicateFlag::Lsm => boxed.filter(deployed_lsm.eq(wanted)),
            ReplicateFlag::Itn => boxed.filter(deployed_itn.eq(wanted)),
            ReplicateFlag::ItnStandard => boxed.filter(deployed_itn_standard.eq(wanted)),
            ReplicateFlag::ItnPbo => boxed.filter(deployed_itn_pbo.eq(wanted)),
            ReplicateFlag::ItnDualAi => boxed.filter(deployed_itn_dual_ai.eq(wanted)),
        };
    }
    boxed
}

fn year_extent(extent: (Option<i32>, Option<i32>), operation: &str) -> RepositoryResult<(i32, i32)> {
    match extent {
        (Some(min_year), Some(max_year)) => Ok((min_year, max_year)),
        _ => Err(RepositoryError::not_found_with_context(
            "Impact data set is empty",
            ErrorContext::new(operation),
        )),
    }
}

#[async_trait]
impl AssignmentRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_scenario(&self, scenario_id: ScenarioId) -> RepositoryResult<Scenario> {
        let row = self
            .with_conn("get_scenario", move |conn| {
                scenarios::table
                    .find(scenario_id.value())
                    .select(ScenarioRow::as_select())
                    .first(conn)
                    .optional()
                    .map_err(map_diesel_error)
            })
            .await?;

        row.map(Scenario::from).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Scenario {} does not exist", scenario_id),
                ErrorContext::new("get_scenario")
                    .with_entity("scenario")
                    .with_entity_id(scenario_id),
            )
        })
    }

    async fn list_assignments(
        &self,
        scenario_id: ScenarioId,
    ) -> RepositoryResult<Vec<InterventionAssignment>> {
        let rows: Vec<(i64, String, i64, String, String)> = self
            .with_conn("list_assignments", move |conn| {
                intervention_assignments::table
                    .inner_join(areas::table)
                    .inner_join(interventions::table)
                    .filter(intervention_assignments::scenario_id.eq(scenario_id.value()))
                    .filter(intervention_assignments::deleted_at.is_null())
                    .select((
                        areas::id,
                        areas::name,
                        interventions::id,
                        interventions::code,
                        interventions::name,
                    ))
                    .order((areas::id.asc(), interventions::id.asc()))
                    .load(conn)
                    .map_err(map_diesel_error)
            })
            .await?;

        Ok(rows
            .into_iter()
            .map(
                |(area_id, area_name, intervention_id, code, name)| InterventionAssignment {
                    area: Area {
                        id: AreaId(area_id),
                        name: area_name,
                    },
                    intervention: Intervention {
                        id: InterventionId(intervention_id),
                        code,
                        name,
                    },
                },
            )
            .collect())
    }
}

#[async_trait]
impl BudgetRepository for PostgresRepository {
    async fn latest_budget(
        &self,
        scenario_id: ScenarioId,
    ) -> RepositoryResult<Option<BudgetRecord>> {
        let row = self
            .with_conn("latest_budget", move |conn| {
                budgets::table
                    .filter(budgets::scenario_id.eq(scenario_id.value()))
                    .order((budgets::created_at.desc(), budgets::id.desc()))
                    .select(BudgetRow::as_select())
                    .first(conn)
                    .optional()
                    .map_err(map_diesel_error)
            })
            .await?;

        row.map(BudgetRow::into_record).transpose()
    }
}

#[async_trait]
impl AggregateImpactStore for PostgresRepository {
    async fn fetch_aggregate_rows(
        &self,
        query: &AggregateQuery,
    ) -> RepositoryResult<Vec<AggregateImpactRow>> {
        let boxed = aggregate_rows_query(query);
        let rows: Vec<AggregateImpactDbRow> = self
            .with_conn("fetch_aggregate_rows", move |conn| {
                boxed
                    .select(AggregateImpactDbRow::as_select())
                    .load(conn)
                    .map_err(map_diesel_error)
            })
            .await?;
        Ok(rows.into_iter().map(AggregateImpactRow::from).collect())
    }

    async fn aggregate_year_range(&self) -> RepositoryResult<(i32, i32)> {
        let extent = self
            .with_conn("aggregate_year_range", |conn| {
                aggregate_impact::table
                    .select((min(aggregate_impact::year), max(aggregate_impact::year)))
                    .first::<(Option<i32>, Option<i32>)>(conn)
                    .map_err(map_diesel_error)
            })
            .await?;
        year_extent(extent, "aggregate_year_range")
    }

    async fn aggregate_age_groups(&self) -> RepositoryResult<Vec<String>> {
        self.with_conn("aggregate_age_groups", |conn| {
            aggregate_impact::table
                .select(aggregate_impact::age_group)
                .distinct()
                .order(aggregate_impact::age_group.asc())
                .load::<String>(conn)
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl ReplicateImpactStore for PostgresRepository {
    async fn fetch_replicate_rows(
        &self,
        query: &ReplicateQuery,
    ) -> RepositoryResult<Vec<ReplicateImpactRow>> {
        let boxed = replicate_rows_query(query);
        let rows: Vec<ReplicateImpactDbRow> = self
            .with_conn("fetch_replicate_rows", move |conn| {
                boxed
                    .select(ReplicateImpactDbRow::as_select())
                    .load(conn)
                    .map_err(map_diesel_error)
            })
            .await?;
        Ok(rows.into_iter().map(ReplicateImpactRow::from).collect())
    }

    async fn replicate_year_range(&self) -> RepositoryResult<(i32, i32)> {
        let extent = self
            .with_conn("replicate_year_range", |conn| {
                replicate_impact::table
                    .select((min(replicate_impact::year), max(replicate_impact::year)))
                    .first::<(Option<i32>, Option<i32>)>(conn)
                    .map_err(map_diesel_error)
            })
            .await?;
        year_extent(extent, "replicate_year_range")
    }

    async fn replicate_age_groups(&self) -> RepositoryResult<Vec<String>> {
        self.with_conn("replicate_age_groups", |conn| {
            replicate_impact::table
                .select(replicate_impact::age_group)
                .distinct()
                .order(replicate_impact::age_group.asc())
                .load::<String>(conn)
                .map_err(map_diesel_error)
        })
        .await
    }
}
