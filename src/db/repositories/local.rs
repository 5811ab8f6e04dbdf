//! In-memory local repository implementation.
//!
//! Stores sectors and trajectory rows in memory and evaluates the same
//! boundary filters the SQL backend evaluates server-side: window overlap,
//! optional flight level range, active/cancelled exclusion, ordering, and
//! the row cap. Suitable for unit tests and local development; fast,
//! deterministic, and isolated.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::db::models::{SectorRow, TrajectoryQuery, TrajectoryRow};
use crate::db::repository::{RepositoryError, RepositoryResult, TrafficRepository};
use crate::parsing::parse_numeric_profile;

/// Trajectory row plus the record-status flags the SQL backend filters on.
#[derive(Debug, Clone)]
struct StoredTrajectory {
    row: TrajectoryRow,
    is_active: bool,
    is_cancelled: bool,
}

#[derive(Default)]
struct LocalData {
    sectors: HashMap<i64, SectorRow>,
    // Keyed by sector id; the in-memory backend associates rows with sectors
    // explicitly instead of evaluating a geometric intersection.
    trajectories: HashMap<i64, Vec<StoredTrajectory>>,
    is_healthy: bool,
}

/// In-memory local repository.
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData {
                is_healthy: true,
                ..Default::default()
            })),
        }
    }

    /// Add a sector.
    pub fn insert_sector(&self, sector: SectorRow) {
        let mut data = self.data.write().unwrap();
        data.sectors.insert(sector.id, sector);
    }

    /// Add an active, non-cancelled trajectory row under a sector.
    pub fn insert_trajectory(&self, sector_id: i64, row: TrajectoryRow) {
        self.insert_trajectory_with_status(sector_id, row, true, false);
    }

    /// Add a trajectory row with explicit record-status flags, for exercising
    /// the boundary filters.
    pub fn insert_trajectory_with_status(
        &self,
        sector_id: i64,
        row: TrajectoryRow,
        is_active: bool,
        is_cancelled: bool,
    ) {
        let mut data = self.data.write().unwrap();
        data.trajectories.entry(sector_id).or_default().push(StoredTrajectory {
            row,
            is_active,
            is_cancelled,
        });
    }

    /// Simulate a connection failure for testing.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().unwrap().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write().unwrap();
        let healthy = data.is_healthy;
        *data = LocalData {
            is_healthy: healthy,
            ..Default::default()
        };
    }

    pub fn sector_count(&self) -> usize {
        self.data.read().unwrap().sectors.len()
    }

    fn ensure_healthy(data: &LocalData) -> RepositoryResult<()> {
        if data.is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::ConnectionError(
                "local repository marked unhealthy".to_string(),
            ))
        }
    }
}

/// True when any parsed altitude token falls inside the inclusive range,
/// matching the SQL backend's `STRING_SPLIT`/`TRY_CAST` filter.
fn altitude_in_range(profile: &Option<String>, min_ft: i32, max_ft: i32) -> bool {
    let Some(profile) = profile else {
        return false;
    };
    parse_numeric_profile(profile)
        .into_iter()
        .flatten()
        .any(|ft| ft >= min_ft && ft <= max_ft)
}

#[async_trait]
impl TrafficRepository for LocalRepository {
    async fn list_sectors(&self) -> RepositoryResult<Vec<SectorRow>> {
        let data = self.data.read().unwrap();
        Self::ensure_healthy(&data)?;
        let mut sectors: Vec<SectorRow> = data.sectors.values().cloned().collect();
        sectors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sectors)
    }

    async fn fetch_sector(&self, sector_id: i64) -> RepositoryResult<Option<SectorRow>> {
        let data = self.data.read().unwrap();
        Self::ensure_healthy(&data)?;
        Ok(data.sectors.get(&sector_id).cloned())
    }

    async fn fetch_trajectories(
        &self,
        query: &TrajectoryQuery,
    ) -> RepositoryResult<Vec<TrajectoryRow>> {
        let data = self.data.read().unwrap();
        Self::ensure_healthy(&data)?;

        let mut rows: Vec<TrajectoryRow> = data
            .trajectories
            .get(&query.sector_id)
            .map(|stored| stored.as_slice())
            .unwrap_or_default()
            .iter()
            .filter(|stored| stored.is_active && !stored.is_cancelled)
            .map(|stored| &stored.row)
            // Window overlap mirrors SQL NULL semantics: rows without both
            // timestamps never match the comparison.
            .filter(|row| match (row.start_time, row.end_time) {
                (Some(start), Some(end)) => start < query.window_end && end >= query.window_start,
                _ => false,
            })
            .filter(|row| match query.level_filter {
                Some(range) => altitude_in_range(&row.altitude_profile, range.min_ft, range.max_ft),
                None => true,
            })
            .cloned()
            .collect();

        rows.sort_by_key(|row| row.start_time);
        rows.truncate(query.max_rows as usize);
        Ok(rows)
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        let data = self.data.read().unwrap();
        Self::ensure_healthy(&data)
    }
}
