//! Repository trait and error types for sector/trajectory queries.

use async_trait::async_trait;

use super::models::{SectorRow, TrajectoryQuery, TrajectoryRow};

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<String> for RepositoryError {
    fn from(s: String) -> Self {
        RepositoryError::InternalError(s)
    }
}

impl From<&str> for RepositoryError {
    fn from(s: &str) -> Self {
        RepositoryError::InternalError(s.to_string())
    }
}

/// Read-only access to sector and trajectory records.
///
/// Backends evaluate the window overlap, the optional flight level filter,
/// the row cap, and the exclusion of cancelled flights and inactive
/// trajectory records at the query boundary; callers never re-apply those
/// filters. Failures propagate to the caller - there is no retry here, a
/// failed query must surface as an error state rather than stale data.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TrafficRepository: Send + Sync {
    /// List all sectors, ordered by name (dropdown options).
    async fn list_sectors(&self) -> RepositoryResult<Vec<SectorRow>>;

    /// Fetch a single sector by id, with fresh geometry.
    ///
    /// `Ok(None)` when the id does not resolve; reserved errors for
    /// connection/query failures only.
    async fn fetch_sector(&self, sector_id: i64) -> RepositoryResult<Option<SectorRow>>;

    /// Fetch trajectory rows intersecting the query's sector within its time
    /// window, ordered by start time ascending and capped at
    /// `query.max_rows`.
    async fn fetch_trajectories(
        &self,
        query: &TrajectoryQuery,
    ) -> RepositoryResult<Vec<TrajectoryRow>>;

    /// Verify the backend is reachable.
    async fn health_check(&self) -> RepositoryResult<()>;
}
