//! Temporal sampling of trajectories for the playback slider.
//!
//! Vertex timestamps are not stored; each row's are reconstructed by spacing
//! the row's time span evenly across its undecimated vertices. Rows of one
//! flight merge into a single series sorted by timestamp, so a binary search
//! per flight answers "where was everyone at time t".

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::core::{NowMarker, TimedSeries};
use crate::db::models::TrajectoryRow;
use crate::geometry::wkt_to_points;

/// Evenly spaced timestamps for `len` vertices across `[start, end]`,
/// inclusive at both ends. A single vertex gets `start`. A missing span, or
/// one where the end does not come after the start, yields all-`None` so the
/// vertices are still drawn but never matched by a time lookup.
fn sample_times(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    len: usize,
) -> Vec<Option<DateTime<Utc>>> {
    let (Some(start), Some(end)) = (start, end) else {
        return vec![None; len];
    };
    if end <= start {
        return vec![None; len];
    }
    if len == 1 {
        return vec![Some(start)];
    }
    let total = (end - start).num_milliseconds();
    (0..len)
        .map(|i| {
            let offset = (i128::from(total) * i as i128 / (len - 1) as i128) as i64;
            Some(start + Duration::milliseconds(offset))
        })
        .collect()
}

/// Build one timed series per flight from the fetch cycle's raw rows.
///
/// Each row is decoded undecimated (animation accuracy is independent of the
/// display decimation), timestamped by [`sample_times`], and merged with the
/// flight's other rows. The merged series is sorted by timestamp ascending,
/// untimed samples after all timed ones, ties keeping row order. The result
/// is ordered by flight id.
pub fn sample_flights(rows: &[TrajectoryRow]) -> Vec<TimedSeries> {
    let mut merged: HashMap<i64, TimedSeries> = HashMap::new();

    for row in rows {
        let points = wkt_to_points(&row.wkt);
        if points.is_empty() {
            continue;
        }
        let times = sample_times(row.start_time, row.end_time, points.len());

        let series = merged.entry(row.flight_id).or_insert_with(|| TimedSeries {
            flight_id: row.flight_id,
            label: format!("FID {}", row.flight_id),
            points: Vec::new(),
            timestamps: Vec::new(),
        });
        if let Some(callsign) = row.callsign.as_deref().filter(|c| !c.is_empty()) {
            if series.label.starts_with("FID ") {
                series.label = callsign.to_string();
            }
        }
        series.points.extend(points);
        series.timestamps.extend(times);
    }

    let mut result: Vec<TimedSeries> = merged
        .into_values()
        .map(|series| {
            let mut order: Vec<usize> = (0..series.len()).collect();
            // Stable sort: untimed samples last, ties keep insertion order.
            order.sort_by_key(|&i| match series.timestamps[i] {
                Some(t) => (false, t),
                None => (true, DateTime::<Utc>::MIN_UTC),
            });
            TimedSeries {
                flight_id: series.flight_id,
                label: series.label.clone(),
                points: order.iter().map(|&i| series.points[i]).collect(),
                timestamps: order.iter().map(|&i| series.timestamps[i]).collect(),
            }
        })
        .collect();
    result.sort_by_key(|series| series.flight_id);
    result
}

/// The "now" marker set for one slider position: one marker per flight whose
/// series has a timed sample at or before `t`, ordered by flight id.
pub fn positions_at(series: &[TimedSeries], t: DateTime<Utc>) -> Vec<NowMarker> {
    series
        .iter()
        .filter_map(|s| {
            s.position_at(t).map(|coordinate| NowMarker {
                flight_id: s.flight_id,
                coordinate,
                label: s.label.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Coordinate, FlightTimes};
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    fn row(
        flight_id: i64,
        wkt: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> TrajectoryRow {
        TrajectoryRow {
            trajectory_id: flight_id * 10,
            flight_id,
            start_time: start,
            end_time: end,
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
    fn timestamps_span_the_row_inclusively() {
        let rows = vec![row(
            1,
            "LINESTRING(0 0, 1 1, 2 2)",
            Some(at(10, 0)),
            Some(at(10, 40)),
        )];
        let series = sample_flights(&rows);
        assert_eq!(series.len(), 1);
        assert_eq!(
            series[0].timestamps,
            vec![Some(at(10, 0)), Some(at(10, 20)), Some(at(10, 40))]
        );
    }

    #[test]
    fn single_vertex_gets_the_start_time() {
        let rows = vec![row(1, "POINT(5 5)", Some(at(10, 0)), Some(at(11, 0)))];
        let series = sample_flights(&rows);
        assert_eq!(series[0].timestamps, vec![Some(at(10, 0))]);
    }

    #[test]
    fn degenerate_spans_yield_untimed_samples() {
        let rows = vec![
            row(1, "LINESTRING(0 0, 1 1)", None, Some(at(11, 0))),
            row(2, "LINESTRING(0 0, 1 1)", Some(at(11, 0)), Some(at(10, 0))),
            row(3, "LINESTRING(0 0, 1 1)", Some(at(10, 0)), Some(at(10, 0))),
        ];
        let series = sample_flights(&rows);
        for s in &series {
            assert!(s.timestamps.iter().all(Option::is_none));
        }
        // Untimed flights are drawn but never produce a marker.
        assert!(positions_at(&series, at(12, 0)).is_empty());
    }

    #[test]
    fn five_points_over_100_seconds_land_every_25() {
        let start = at(10, 0);
        let end = start + Duration::seconds(100);
        let rows = vec![row(
            1,
            "LINESTRING(0 0, 1 1, 2 2, 3 3, 4 4)",
            Some(start),
            Some(end),
        )];
        let series = sample_flights(&rows);
        let expected: Vec<_> = (0..5)
            .map(|i| Some(start + Duration::seconds(25 * i)))
            .collect();
        assert_eq!(series[0].timestamps, expected);
    }

    #[test]
    fn segmented_rows_merge_sorted_with_untimed_last() {
        let rows = vec![
            row(
                1,
                "LINESTRING(2 2, 3 3)",
                Some(at(11, 0)),
                Some(at(11, 30)),
            ),
            row(1, "POINT(9 9)", None, None),
            row(
                1,
                "LINESTRING(0 0, 1 1)",
                Some(at(10, 0)),
                Some(at(10, 30)),
            ),
        ];
        let series = sample_flights(&rows);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].len(), 5);
        assert_eq!(
            series[0].timestamps,
            vec![
                Some(at(10, 0)),
                Some(at(10, 30)),
                Some(at(11, 0)),
                Some(at(11, 30)),
                None,
            ]
        );
        assert_eq!(series[0].points[0], Coordinate::new(0.0, 0.0));
        assert_eq!(series[0].points[4], Coordinate::new(9.0, 9.0));
    }

    #[test]
    fn markers_report_the_last_position_at_or_before_t() {
        let rows = vec![
            row(
                1,
                "LINESTRING(0 0, 1 1, 2 2)",
                Some(at(10, 0)),
                Some(at(10, 40)),
            ),
            row(2, "LINESTRING(5 5, 6 6)", Some(at(10, 30)), Some(at(11, 0))),
        ];
        let series = sample_flights(&rows);

        let markers = positions_at(&series, at(10, 30));
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].flight_id, 1);
        assert_eq!(markers[0].coordinate, Coordinate::new(1.0, 1.0));
        assert_eq!(markers[0].label, "TST1");
        assert_eq!(markers[1].coordinate, Coordinate::new(5.0, 5.0));
        // Flight 2 appears only once its first sample is reached.
        assert_eq!(positions_at(&series, at(10, 29)).len(), 1);
    }
}
