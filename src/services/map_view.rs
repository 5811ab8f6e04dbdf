//! Flight grouping and map path layer construction.
//!
//! Trajectory rows are folded into per-flight groups, then flattened into
//! single flat coordinate vectors with `None` sentinel gaps between flights
//! so the rendering layer draws all paths as one trace.

use std::collections::HashMap;

use crate::core::{Coordinate, FlightGroup};
use crate::db::models::TrajectoryRow;
use crate::geometry::{decimate, wkt_to_points, wkt_to_segments};
use crate::parsing::parse_numeric_profile;

/// Fallback map center when no trajectory produced any coordinate.
const DEFAULT_CENTER: Coordinate = Coordinate {
    lat: 13.75,
    lon: 100.50,
};

/// Flat per-vertex layer data for one map trace. Flights (and geometry parts,
/// in the highlight layer) are separated by a single `None` in every column.
///
/// Invariant: `lat`, `lon` and `hover` always have equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathLayer {
    pub lat: Vec<Option<f64>>,
    pub lon: Vec<Option<f64>>,
    pub hover: Vec<Option<String>>,
}

impl PathLayer {
    pub fn is_empty(&self) -> bool {
        self.lat.is_empty()
    }

    fn push(&mut self, point: Coordinate, hover: Option<String>) {
        self.lat.push(Some(point.lat));
        self.lon.push(Some(point.lon));
        self.hover.push(hover);
    }

    fn push_gap(&mut self) {
        self.lat.push(None);
        self.lon.push(None);
        self.hover.push(None);
    }
}

/// Fold trajectory rows into one [`FlightGroup`] per flight id, preserving
/// first-seen row order.
///
/// Coordinates are concatenated undecimated in row order; attributes refine
/// monotonically (first non-empty callsign and airports, earliest start).
pub fn group_rows(rows: &[TrajectoryRow]) -> Vec<FlightGroup> {
    let mut groups: Vec<FlightGroup> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        let idx = *index.entry(row.flight_id).or_insert_with(|| {
            groups.push(FlightGroup::new(row.flight_id));
            groups.len() - 1
        });
        groups[idx].absorb(
            wkt_to_points(&row.wkt),
            row.start_time,
            &row.callsign,
            &row.airport_departure,
            &row.airport_arrival,
            &row.times,
        );
    }
    groups
}

/// Build the map trace for all grouped flights.
///
/// Each group's concatenated points are decimated by `decimation`, flights
/// left with fewer than two points are skipped entirely, and a `None` gap
/// separates consecutive flights. Route detail in the hover is attached only
/// while the flight count stays at or below `hover_max_flights`; beyond that
/// every point still carries the plain display name.
pub fn path_layer(groups: &[FlightGroup], decimation: usize, hover_max_flights: usize) -> PathLayer {
    let rich = groups.len() <= hover_max_flights;
    let mut layer = PathLayer::default();

    for group in groups {
        let points = decimate(&group.points, decimation.max(1));
        if points.len() < 2 {
            continue;
        }
        let label = hover_label(group, rich);
        if !layer.is_empty() {
            layer.push_gap();
        }
        for point in points {
            layer.push(point, Some(label.clone()));
        }
    }
    layer
}

fn hover_label(group: &FlightGroup, rich: bool) -> String {
    if rich {
        if let (Some(dep), Some(arr)) = (&group.airport_departure, &group.airport_arrival) {
            return format!("{} {}-{}", group.display_name(), dep, arr);
        }
    }
    group.display_name()
}

/// Mean of every drawn coordinate in the layer, falling back to the
/// reference deployment's area when nothing was drawn. Computed from the
/// trace itself, so skipped flights and decimation affect the center the
/// same way they affect the drawing.
pub fn map_center(layer: &PathLayer) -> Coordinate {
    let mut lat = 0.0;
    let mut lon = 0.0;
    let mut count = 0usize;
    for (la, lo) in layer.lat.iter().zip(&layer.lon) {
        if let (Some(la), Some(lo)) = (la, lo) {
            lat += la;
            lon += lo;
            count += 1;
        }
    }
    if count == 0 {
        DEFAULT_CENTER
    } else {
        Coordinate::new(lat / count as f64, lon / count as f64)
    }
}

fn level_hover(alt_ft: Option<i32>, speed_kn: Option<i32>) -> String {
    let fl = match alt_ft {
        Some(ft) => format!("FL{}", ft / 100),
        None => "FL?".to_string(),
    };
    let kt = match speed_kn {
        Some(kn) => kn.to_string(),
        None => "?".to_string(),
    };
    format!("{fl} - {kt} kt")
}

/// Build the emphasized trace for one selected flight's rows.
///
/// Geometry parts keep their row/part boundaries (a `None` gap between
/// parts), and every vertex carries a flight level / ground speed hover built
/// from the per-vertex profiles, aligned positionally with the undecimated
/// vertex sequence of the whole row. A non-empty profile shorter than the
/// vertex list truncates the drawn vertices to the common prefix; an entirely
/// absent profile renders unknowns instead. Decimation is applied per part,
/// to vertices and hover labels in step.
pub fn highlight_layer(rows: &[TrajectoryRow], decimation: usize) -> PathLayer {
    let step = decimation.max(1);
    let mut layer = PathLayer::default();

    for row in rows {
        let altitudes = row
            .altitude_profile
            .as_deref()
            .map(parse_numeric_profile)
            .unwrap_or_default();
        let speeds = row
            .speed_profile
            .as_deref()
            .map(parse_numeric_profile)
            .unwrap_or_default();

        let parts = wkt_to_segments(&row.wkt, 1);
        let mut limit: usize = parts.iter().map(Vec::len).sum();
        if !altitudes.is_empty() {
            limit = limit.min(altitudes.len());
        }
        if !speeds.is_empty() {
            limit = limit.min(speeds.len());
        }

        // Profile index runs over the row's full vertex sequence, across
        // part boundaries.
        let mut vertex = 0usize;
        for part in parts {
            if vertex >= limit {
                break;
            }
            let take = part.len().min(limit - vertex);
            let hovers: Vec<String> = (0..take)
                .map(|i| {
                    let alt = altitudes.get(vertex + i).copied().flatten();
                    let spd = speeds.get(vertex + i).copied().flatten();
                    level_hover(alt, spd)
                })
                .collect();
            vertex += take;

            let points = decimate(&part[..take], step);
            let hovers = decimate(&hovers, step);
            if points.is_empty() {
                continue;
            }
            if !layer.is_empty() {
                layer.push_gap();
            }
            for (point, hover) in points.into_iter().zip(hovers) {
                layer.push(point, Some(hover));
            }
        }
    }
    layer
}

/// Build a map trace for a subset of flights, identified by id, from the raw
/// rows of the current fetch cycle. Used when a histogram bin is selected to
/// redraw only that bin's flights.
pub fn path_layer_for_flights(
    rows: &[TrajectoryRow],
    flight_ids: &[i64],
    decimation: usize,
    hover_max_flights: usize,
) -> PathLayer {
    let selected: Vec<TrajectoryRow> = rows
        .iter()
        .filter(|row| flight_ids.contains(&row.flight_id))
        .cloned()
        .collect();
    let groups = group_rows(&selected);
    path_layer(&groups, decimation, hover_max_flights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FlightTimes;
    use chrono::{TimeZone, Utc};

    fn row(flight_id: i64, wkt: &str) -> TrajectoryRow {
        TrajectoryRow {
            trajectory_id: flight_id * 10,
            flight_id,
            start_time: Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()),
            end_time: Some(Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap()),
            wkt: wkt.to_string(),
            altitude_profile: None,
            speed_profile: None,
            heading_profile: None,
            callsign: Some(format!("TST{flight_id}")),
            airport_departure: None,
            airport_arrival: None,
            times: FlightTimes::default(),
        }
    }

    #[test]
    fn grouping_preserves_first_seen_order_and_concatenates_rows() {
        let rows = vec![
            row(2, "LINESTRING(0 0, 1 1)"),
            row(1, "LINESTRING(5 5, 6 6)"),
            row(2, "LINESTRING(2 2, 3 3)"),
        ];
        let groups = group_rows(&rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].flight_id, 2);
        assert_eq!(groups[0].points.len(), 4);
        assert_eq!(groups[1].flight_id, 1);
        assert_eq!(groups[1].points.len(), 2);
    }

    #[test]
    fn layer_separates_flights_with_gaps_and_skips_degenerate_paths() {
        let rows = vec![
            row(1, "LINESTRING(0 0, 1 1, 2 2)"),
            row(2, "POINT(9 9)"),
            row(3, "LINESTRING(5 5, 6 6)"),
        ];
        let layer = path_layer(&group_rows(&rows), 1, 30);

        // Flight 2 has a single point and is skipped; one gap remains.
        assert_eq!(layer.lat.len(), 6);
        assert_eq!(layer.lat[3], None);
        assert_eq!(layer.lon[3], None);
        assert_eq!(layer.hover[0].as_deref(), Some("TST1"));
        assert_eq!(layer.hover[4].as_deref(), Some("TST3"));
    }

    #[test]
    fn hover_detail_degrades_to_plain_names_above_the_flight_cap() {
        let mut a = row(1, "LINESTRING(0 0, 1 1)");
        a.airport_departure = Some("VTBS".to_string());
        a.airport_arrival = Some("WSSS".to_string());
        let mut b = row(2, "LINESTRING(2 2, 3 3)");
        b.airport_departure = Some("VTBD".to_string());
        b.airport_arrival = Some("VHHH".to_string());
        let rows = vec![a, b];

        let rich = path_layer(&group_rows(&rows), 1, 30);
        assert_eq!(rich.hover[0].as_deref(), Some("TST1 VTBS-WSSS"));

        // Above the cap every point still names its flight, route detail only
        // is dropped.
        let capped = path_layer(&group_rows(&rows), 1, 1);
        assert_eq!(capped.hover[0].as_deref(), Some("TST1"));
        assert_eq!(capped.hover[3].as_deref(), Some("TST2"));
        assert!(capped.hover.iter().flatten().all(|h| !h.contains('-')));
    }

    #[test]
    fn decimation_applies_per_group() {
        let rows = vec![row(1, "LINESTRING(0 0, 1 1, 2 2, 3 3, 4 4)")];
        let layer = path_layer(&group_rows(&rows), 2, 30);
        assert_eq!(layer.lat.len(), 3);
        assert_eq!(layer.lat[0], Some(0.0));
        assert_eq!(layer.lat[1], Some(2.0));
        assert_eq!(layer.lat[2], Some(4.0));
    }

    #[test]
    fn center_averages_the_drawn_trace_and_falls_back_when_empty() {
        let rows = vec![row(1, "LINESTRING(100 10, 102 14)")];
        let layer = path_layer(&group_rows(&rows), 1, 30);
        assert_eq!(map_center(&layer), Coordinate::new(12.0, 101.0));

        assert_eq!(map_center(&PathLayer::default()), Coordinate::new(13.75, 100.50));
    }

    #[test]
    fn single_point_flights_leave_the_center_at_the_fallback() {
        // A lone point is skipped by the layer, so nothing is drawn and the
        // center must not chase the invisible coordinate.
        let rows = vec![row(1, "POINT(50 5)")];
        let layer = path_layer(&group_rows(&rows), 1, 30);
        assert!(layer.is_empty());
        assert_eq!(map_center(&layer), Coordinate::new(13.75, 100.50));
    }

    #[test]
    fn highlight_aligns_profiles_and_marks_unknown_tokens() {
        let mut r = row(1, "LINESTRING(0 0, 1 1, 2 2)");
        r.altitude_profile = Some("35000,junk,37000".to_string());

        let layer = highlight_layer(&[r], 1);
        assert_eq!(layer.hover.len(), 3);
        assert_eq!(layer.hover[0].as_deref(), Some("FL350 - ? kt"));
        assert_eq!(layer.hover[1].as_deref(), Some("FL? - ? kt"));
        assert_eq!(layer.hover[2].as_deref(), Some("FL370 - ? kt"));
    }

    #[test]
    fn highlight_truncates_to_the_profile_common_prefix() {
        let mut r = row(1, "LINESTRING(0 0, 1 1, 2 2)");
        r.speed_profile = Some("450".to_string());

        // One speed token against three vertices: only the common prefix is
        // drawn.
        let layer = highlight_layer(&[r], 1);
        assert_eq!(layer.lat.len(), 1);
        assert_eq!(layer.hover[0].as_deref(), Some("FL? - 450 kt"));
    }

    #[test]
    fn highlight_truncation_spans_part_boundaries() {
        let mut r = row(1, "MULTILINESTRING((0 0, 1 1),(2 2, 3 3))");
        r.altitude_profile = Some("31000,32000,33000".to_string());

        let layer = highlight_layer(&[r], 1);
        // Two vertices, a gap, then only the first vertex of the second part.
        assert_eq!(layer.lat.len(), 4);
        assert_eq!(layer.lat[2], None);
        assert_eq!(layer.hover[3].as_deref(), Some("FL330 - ? kt"));
    }

    #[test]
    fn highlight_keeps_part_boundaries_and_profile_offsets() {
        let mut r = row(1, "MULTILINESTRING((0 0, 1 1),(2 2, 3 3))");
        r.altitude_profile = Some("31000,32000,33000,34000".to_string());

        let layer = highlight_layer(&[r], 1);
        // Two vertices, a gap, two vertices.
        assert_eq!(layer.lat.len(), 5);
        assert_eq!(layer.lat[2], None);
        // The second part's profile continues where the first left off.
        assert_eq!(layer.hover[3].as_deref(), Some("FL330 - ? kt"));
    }

    #[test]
    fn subset_layer_draws_only_requested_flights() {
        let rows = vec![
            row(1, "LINESTRING(0 0, 1 1)"),
            row(2, "LINESTRING(2 2, 3 3)"),
            row(3, "LINESTRING(4 4, 5 5)"),
        ];
        let layer = path_layer_for_flights(&rows, &[1, 3], 1, 30);
        let labels: Vec<&str> = layer.hover.iter().flatten().map(String::as_str).collect();
        assert!(labels.contains(&"TST1"));
        assert!(!labels.contains(&"TST2"));
        assert!(labels.contains(&"TST3"));
    }
}
