//! Data access for sector and trajectory records.
//!
//! The module follows the repository pattern: a trait abstracts the two query
//! shapes the dashboard needs (fetch one sector by id; fetch trajectories
//! intersecting a sector within a window), and backends implement it.
//!
//! - `repository`: trait definition and error types
//! - `repositories::local`: in-memory implementation for unit testing and
//!   local development
//! - `repositories::azure`: SQL Server implementation (trajectories live in
//!   `FlightTrajectory`/`Flight`, sector geography in `StaticAirspace`)
//! - `factory`: creation of repository instances from configuration

#[cfg(all(feature = "azure-repo", feature = "local-repo"))]
compile_error!("Enable only one repository backend feature at a time.");
#[cfg(not(any(feature = "azure-repo", feature = "local-repo")))]
compile_error!("Enable exactly one repository backend feature.");

pub mod config;
pub mod factory;
pub mod models;
pub mod repositories;
pub mod repository;

pub use config::DbConfig;
pub use factory::{RepositoryFactory, RepositoryType};
pub use models::{LevelRange, SectorRow, TrajectoryQuery, TrajectoryRow};
#[cfg(feature = "azure-repo")]
pub use repositories::AzureRepository;
#[cfg(feature = "local-repo")]
pub use repositories::LocalRepository;
pub use repository::{RepositoryError, RepositoryResult, TrafficRepository};
