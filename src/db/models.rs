//! Typed row schemas for the two query shapes the dashboard issues.
//!
//! Rows are converted from the store's nullable columns at the boundary:
//! empty strings become `None`, timestamps stay optional, and geometry is
//! carried as WKT text for the decoders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::FlightTimes;

/// One airspace sector record, geometry as WKT text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRow {
    pub id: i64,
    pub name: String,
    pub lower_limit_ft: i32,
    pub upper_limit_ft: i32,
    pub wkt: String,
}

/// One raw trajectory record joined with its flight attributes.
///
/// Immutable once fetched; scoped to a single fetch cycle. Multiple rows may
/// exist per flight when the trajectory is segmented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRow {
    pub trajectory_id: i64,
    pub flight_id: i64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// POINT or LINESTRING/MULTILINESTRING text; may be empty when the store
    /// produced no usable geometry for this record.
    pub wkt: String,
    /// Comma-separated per-vertex profiles, parallel to the geometry.
    pub altitude_profile: Option<String>,
    pub speed_profile: Option<String>,
    pub heading_profile: Option<String>,
    pub callsign: Option<String>,
    pub airport_departure: Option<String>,
    pub airport_arrival: Option<String>,
    pub times: FlightTimes,
}

/// Inclusive flight level filter, in feet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRange {
    pub min_ft: i32,
    pub max_ft: i32,
}

/// Parameters of the trajectory query: sector, half-open time window
/// `[window_start, window_end)`, optional flight level filter, row cap, and
/// server-side simplification tolerance in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryQuery {
    pub sector_id: i64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub level_filter: Option<LevelRange>,
    pub max_rows: u32,
    pub tolerance_deg: f64,
}
