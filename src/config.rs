//! Configuration for the pipeline and the repository backend.
//!
//! All tunables live in explicit configuration objects passed into the
//! orchestrator at call time; nothing is read from ambient process state by
//! the pipeline itself. A TOML file supplies the repository selection and may
//! override the pipeline defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::repository::RepositoryError;

/// Performance and display knobs for the query/aggregation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Hard cap on trajectory rows per fetch, protecting the rendering layer
    /// from unbounded result sets.
    #[serde(default = "default_max_trajectory_rows")]
    pub max_trajectory_rows: u32,
    /// Base simplification distance in meters, scaled by the display
    /// decimation factor when deriving a degrees tolerance.
    #[serde(default = "default_simplify_base_m")]
    pub simplify_base_m: f64,
    /// Server-side geometry simplification tolerance in degrees. Independent
    /// of the client-side decimation factor, which is a display-only knob.
    #[serde(default = "default_simplify_tol_deg")]
    pub simplify_tol_deg: f64,
    /// Per-point hover detail is built only while the flight count stays at
    /// or below this limit.
    #[serde(default = "default_hover_max_flights")]
    pub hover_max_flights: usize,
    /// Demand bin width in minutes.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
}

fn default_max_trajectory_rows() -> u32 {
    2000
}

fn default_simplify_base_m() -> f64 {
    400.0
}

fn default_simplify_tol_deg() -> f64 {
    0.0005
}

fn default_hover_max_flights() -> usize {
    30
}

fn default_interval_minutes() -> u32 {
    20
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_trajectory_rows: default_max_trajectory_rows(),
            simplify_base_m: default_simplify_base_m(),
            simplify_tol_deg: default_simplify_tol_deg(),
            hover_max_flights: default_hover_max_flights(),
            interval_minutes: default_interval_minutes(),
        }
    }
}

impl PipelineConfig {
    /// Degrees tolerance derived from the base meter distance scaled by the
    /// display decimation factor, floored at 50 m (~111 km per degree).
    ///
    /// Callers that want the query to coarsen along with a coarser display
    /// use this instead of the fixed [`simplify_tol_deg`](Self::simplify_tol_deg).
    pub fn tolerance_for_decimation(&self, decimation: usize) -> f64 {
        let meters = (self.simplify_base_m * decimation.max(1) as f64).max(50.0);
        meters / 111_000.0
    }
}

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// SQL Server connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_trust_cert")]
    pub trust_cert: bool,
}

fn default_port() -> u16 {
    1433
}

fn default_trust_cert() -> bool {
    true
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;

        let config: RepositoryConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::ConfigurationError(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load repository configuration from the default locations
    /// (`repository.toml` in the current or parent directory).
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = vec![
            PathBuf::from("repository.toml"),
            PathBuf::from("../repository.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::ConfigurationError(
            "No repository.toml found in standard locations".to_string(),
        ))
    }

    /// Convert to a database configuration if this selects the SQL Server
    /// backend.
    ///
    /// # Returns
    /// * `Ok(Some(DbConfig))` for an azure repository with valid settings
    /// * `Ok(None)` for any other repository type
    /// * `Err(RepositoryError)` for an azure repository with missing settings
    pub fn to_db_config(&self) -> Result<Option<crate::db::DbConfig>, RepositoryError> {
        if !self.repository.repo_type.eq_ignore_ascii_case("azure") {
            return Ok(None);
        }

        if self.database.server.is_empty() {
            return Err(RepositoryError::ConfigurationError(
                "Azure repository requires 'database.server' setting".to_string(),
            ));
        }
        if self.database.database.is_empty() {
            return Err(RepositoryError::ConfigurationError(
                "Azure repository requires 'database.database' setting".to_string(),
            ));
        }
        if self.database.username.is_empty() || self.database.password.is_empty() {
            return Err(RepositoryError::ConfigurationError(
                "Azure repository requires 'database.username' and 'database.password'"
                    .to_string(),
            ));
        }

        Ok(Some(crate::db::DbConfig {
            server: self.database.server.clone(),
            database: self.database.database.clone(),
            username: self.database.username.clone(),
            password: self.database.password.clone(),
            port: self.database.port,
            trust_cert: self.database.trust_cert,
        }))
    }
}
