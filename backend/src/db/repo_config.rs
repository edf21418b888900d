//! Engine configuration file support.
//!
//! This module reads `impact.toml`, which selects the store back-end and
//! declares which impact provider serves each tenant.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::RepositoryError;
use crate::db::PostgresConfig;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "IMPACT_CONFIG";

/// Engine configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub postgres: PostgresSettings,
    #[serde(default)]
    pub local: LocalSettings,
    #[serde(default)]
    pub tenants: Vec<TenantSettings>,
    /// Directory of the file this configuration was read from. Relative
    /// data paths are resolved against it.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// Postgres connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresSettings {
    #[serde(default)]
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout: default_connect_timeout(),
            idle_timeout: default_idle_timeout(),
        }
    }
}

/// In-memory back-end settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalSettings {
    /// JSON seed with scenarios, assignments and budgets.
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

/// Impact provider configured for one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSettings {
    pub tenant: String,
    /// Provider kind, e.g. `"aggregate"` or `"replicate"`.
    pub provider: String,
    /// JSON data set for the provider. Required with the local back-end.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            repository: RepositorySettings {
                repo_type: "local".to_string(),
            },
            postgres: PostgresSettings::default(),
            local: LocalSettings::default(),
            tenants: Vec::new(),
            base_dir: None,
        }
    }
}

impl ImpactConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        let mut config: ImpactConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);

        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Uses the file named by `IMPACT_CONFIG` when set, otherwise the first
    /// `impact.toml` found in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(explicit);
        }

        let search_paths = [
            PathBuf::from("impact.toml"),
            PathBuf::from("backend/impact.toml"),
            PathBuf::from("../impact.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::configuration(
            "No impact.toml found in standard locations",
        ))
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// Resolve a configured path against the configuration file's directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Convert to PostgresConfig if this is a Postgres configuration.
    #[cfg(feature = "postgres-repo")]
    pub fn to_postgres_config(&self) -> Result<Option<PostgresConfig>, RepositoryError> {
        let repo_type = self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        if repo_type != RepositoryType::Postgres {
            return Ok(None);
        }

        if self.postgres.database_url.is_empty() {
            return Err(RepositoryError::configuration(
                "Postgres repository requires 'postgres.database_url' setting",
            ));
        }

        Ok(Some(PostgresConfig {
            database_url: self.postgres.database_url.clone(),
            max_pool_size: self.postgres.max_connections,
            min_pool_size: self.postgres.min_connections,
            connection_timeout_sec: self.postgres.connect_timeout,
            idle_timeout_sec: self.postgres.idle_timeout,
        }))
    }

    /// Convert to PostgresConfig when the feature is disabled.
    #[cfg(not(feature = "postgres-repo"))]
    pub fn to_postgres_config(&self) -> Result<Option<PostgresConfig>, RepositoryError> {
        let repo_type = self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        if repo_type == RepositoryType::Postgres {
            return Err(RepositoryError::configuration(
                "Postgres repository feature not enabled",
            ));
        }

        Ok(None)
    }
}
