//! The fetch-cycle orchestrator.
//!
//! One call per (sector, window, filter) combination rebuilds everything the
//! dashboard shows: the sector overlay, the map trace, the animation series,
//! the demand bins and their histogram. Nothing is cached across cycles.

use std::fmt;

use chrono::{DateTime, Utc};
use geojson::Feature;
use log::{debug, info};
use serde_json::{json, Map};

use crate::config::PipelineConfig;
use crate::core::{Coordinate, DemandBin, TimedSeries};
use crate::db::models::{LevelRange, TrajectoryQuery, TrajectoryRow};
use crate::db::repository::{RepositoryError, TrafficRepository};
use crate::geometry::region_feature;
use crate::services::animation::sample_flights;
use crate::services::demand::{assign_bins, demand_histogram, HistogramBin};
use crate::services::map_view::{group_rows, map_center, path_layer, PathLayer};

/// What the dashboard asked for: a sector (possibly none yet), a half-open
/// time window, an optional flight level filter, and the display decimation.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRequest {
    pub sector_id: Option<i64>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub level_filter: Option<LevelRange>,
    pub decimation: usize,
}

/// Outcome of a fetch cycle, rendered as the dashboard status line.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewStatus {
    NoSectorSelected,
    SectorNotFound,
    Loaded {
        rows: usize,
        flights: usize,
        cap: u32,
        level_filter: Option<LevelRange>,
    },
}

impl fmt::Display for ViewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewStatus::NoSectorSelected => write!(f, "No sector selected"),
            ViewStatus::SectorNotFound => write!(f, "Sector not found"),
            ViewStatus::Loaded {
                rows,
                flights,
                cap,
                level_filter,
            } => {
                write!(f, "Loaded {rows} trajectories, {flights} flights (cap {cap})")?;
                if let Some(range) = level_filter {
                    write!(f, " | FL filter: FL{}-FL{}", range.min_ft / 100, range.max_ft / 100)?;
                }
                Ok(())
            }
        }
    }
}

/// Everything one fetch cycle produces. Owned by the caller; rebuilt whole on
/// the next cycle.
#[derive(Debug, Clone)]
pub struct SectorView {
    pub status: ViewStatus,
    /// GeoJSON overlay for the sector polygon; absent when the sector has no
    /// usable polygonal geometry or nothing is selected.
    pub region: Option<Feature>,
    pub path: PathLayer,
    pub center: Coordinate,
    pub series: Vec<TimedSeries>,
    pub bins: Vec<DemandBin>,
    pub histogram: Vec<HistogramBin>,
    /// The raw rows of this cycle, kept for per-bin and per-flight redraws.
    pub rows: Vec<TrajectoryRow>,
}

impl SectorView {
    fn empty(status: ViewStatus) -> Self {
        Self {
            status,
            region: None,
            path: PathLayer::default(),
            center: map_center(&PathLayer::default()),
            series: Vec::new(),
            bins: Vec::new(),
            histogram: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// Run one full fetch cycle against the repository.
///
/// Repository failures propagate as errors; the caller shows an error state
/// rather than stale data. An unknown sector id and the no-selection case
/// are ordinary outcomes, reported through [`ViewStatus`].
pub async fn build_view(
    repo: &dyn TrafficRepository,
    config: &PipelineConfig,
    request: &ViewRequest,
) -> Result<SectorView, RepositoryError> {
    let Some(sector_id) = request.sector_id else {
        return Ok(SectorView::empty(ViewStatus::NoSectorSelected));
    };

    let Some(sector) = repo.fetch_sector(sector_id).await? else {
        return Ok(SectorView::empty(ViewStatus::SectorNotFound));
    };

    let query = TrajectoryQuery {
        sector_id,
        window_start: request.window_start,
        window_end: request.window_end,
        level_filter: request.level_filter,
        max_rows: config.max_trajectory_rows,
        tolerance_deg: config.simplify_tol_deg,
    };
    debug!("Fetch cycle for sector '{}' ({sector_id})", sector.name);
    let rows = repo.fetch_trajectories(&query).await?;

    let groups = group_rows(&rows);
    let path = path_layer(&groups, request.decimation, config.hover_max_flights);
    let center = map_center(&path);
    let series = sample_flights(&rows);
    let bins = assign_bins(&groups, request.window_start, config.interval_minutes);
    let histogram = demand_histogram(
        &bins,
        request.window_start,
        request.window_end,
        config.interval_minutes,
    );

    let mut props = Map::new();
    props.insert("lower_limit_ft".to_string(), json!(sector.lower_limit_ft));
    props.insert("upper_limit_ft".to_string(), json!(sector.upper_limit_ft));
    let region = Some(region_feature(&sector.name, &sector.wkt, props));

    let status = ViewStatus::Loaded {
        rows: rows.len(),
        flights: groups.len(),
        cap: config.max_trajectory_rows,
        level_filter: request.level_filter,
    };
    info!("{status}");

    Ok(SectorView {
        status,
        region,
        path,
        center,
        series,
        bins,
        histogram,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap()
    }

    fn request(sector_id: Option<i64>) -> ViewRequest {
        ViewRequest {
            sector_id,
            window_start: at(10),
            window_end: at(12),
            level_filter: None,
            decimation: 1,
        }
    }

    #[cfg(feature = "local-repo")]
    #[tokio::test]
    async fn no_selection_and_unknown_sector_are_ordinary_outcomes() {
        use crate::db::repositories::LocalRepository;

        let repo = LocalRepository::new();
        let config = PipelineConfig::default();

        let view = build_view(&repo, &config, &request(None)).await.unwrap();
        assert_eq!(view.status, ViewStatus::NoSectorSelected);
        assert!(view.region.is_none());
        assert!(view.path.is_empty());

        let view = build_view(&repo, &config, &request(Some(99))).await.unwrap();
        assert_eq!(view.status, ViewStatus::SectorNotFound);
    }

    #[test]
    fn status_line_formats() {
        assert_eq!(ViewStatus::NoSectorSelected.to_string(), "No sector selected");
        let loaded = ViewStatus::Loaded {
            rows: 12,
            flights: 7,
            cap: 2000,
            level_filter: Some(LevelRange {
                min_ft: 30_000,
                max_ft: 40_000,
            }),
        };
        assert_eq!(
            loaded.to_string(),
            "Loaded 12 trajectories, 7 flights (cap 2000) | FL filter: FL300-FL400"
        );
    }
}
