//! Demand binning over fixed-width intervals.
//!
//! The displayed window start is floored to the interval grid, every flight
//! is assigned the interval its start time falls into, and the histogram
//! covers the whole window even where bins are empty. Flights starting
//! before the aligned window start are drawn on the map but excluded from
//! the histogram; see [`bin_index`](crate::time::bin_index).

use chrono::{DateTime, Utc};

use crate::core::{DemandBin, FlightGroup, FlightTimes};
use crate::time::{bin_index, floor_to_interval};

/// One histogram bar: the bin's aligned start, its display label, and the
/// number of flights that start inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: DateTime<Utc>,
    pub label: String,
    pub count: usize,
}

/// One row of the per-bin flight table, numbered from 1 for display.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightTableRow {
    pub rownum: usize,
    pub flight_id: i64,
    pub callsign: Option<String>,
    pub airport_departure: Option<String>,
    pub airport_arrival: Option<String>,
    pub times: FlightTimes,
}

/// Assign each grouped flight to a demand bin.
///
/// Flights without a start time, or starting before the aligned window
/// start, receive no bin. Output order follows the input group order.
pub fn assign_bins(
    groups: &[FlightGroup],
    window_start: DateTime<Utc>,
    interval_minutes: u32,
) -> Vec<DemandBin> {
    let aligned = floor_to_interval(window_start, interval_minutes);
    groups
        .iter()
        .filter_map(|group| {
            let start = group.start_time?;
            let bin = bin_index(start, aligned, interval_minutes)?;
            Some(DemandBin {
                flight_id: group.flight_id,
                bin,
                callsign: group.callsign.clone(),
                airport_departure: group.airport_departure.clone(),
                airport_arrival: group.airport_arrival.clone(),
                times: group.times.clone(),
            })
        })
        .collect()
}

/// Count assigned bins into a histogram covering the whole display window.
///
/// The bin axis starts at the aligned window start and extends to cover
/// `window_end` (a partial trailing interval still gets a bar). At least one
/// bin is always produced, so an empty or degenerate window renders an empty
/// bar rather than nothing.
pub fn demand_histogram(
    bins: &[DemandBin],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    interval_minutes: u32,
) -> Vec<HistogramBin> {
    let aligned = floor_to_interval(window_start, interval_minutes);
    let bin_seconds = i64::from(interval_minutes.max(1)) * 60;
    let total = (window_end - aligned).num_seconds().max(0);
    let n_bins = ((total + bin_seconds - 1) / bin_seconds).max(1) as usize;

    let mut counts = vec![0usize; n_bins];
    for bin in bins {
        if let Some(count) = counts.get_mut(bin.bin as usize) {
            *count += 1;
        }
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let start = aligned + chrono::Duration::seconds(bin_seconds * i as i64);
            HistogramBin {
                start,
                label: start.format("%Y-%m-%d %H:%M").to_string(),
                count,
            }
        })
        .collect()
}

/// The flight table for one selected histogram bin, numbered from 1 in
/// assignment order.
pub fn rows_for_bin(bins: &[DemandBin], bin: u32) -> Vec<FlightTableRow> {
    bins.iter()
        .filter(|b| b.bin == bin)
        .enumerate()
        .map(|(i, b)| FlightTableRow {
            rownum: i + 1,
            flight_id: b.flight_id,
            callsign: b.callsign.clone(),
            airport_departure: b.airport_departure.clone(),
            airport_arrival: b.airport_arrival.clone(),
            times: b.times.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, 0).unwrap()
    }

    fn group(flight_id: i64, start: Option<DateTime<Utc>>) -> FlightGroup {
        let mut g = FlightGroup::new(flight_id);
        g.start_time = start;
        g.callsign = Some(format!("TST{flight_id}"));
        g
    }

    #[test]
    fn flights_fall_into_their_start_interval() {
        let groups = vec![
            group(1, Some(at(12, 5))),
            group(2, Some(at(12, 25))),
            group(3, Some(at(12, 39))),
            group(4, None),
        ];
        // Window opens mid-interval; the grid aligns to 12:00.
        let bins = assign_bins(&groups, at(12, 7), 20);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins[0].bin, 0);
        assert_eq!(bins[1].bin, 1);
        assert_eq!(bins[2].bin, 1);
    }

    #[test]
    fn early_starters_get_no_bin() {
        let groups = vec![group(1, Some(at(11, 55))), group(2, Some(at(12, 0)))];
        let bins = assign_bins(&groups, at(12, 0), 20);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].flight_id, 2);
        assert_eq!(bins[0].bin, 0);
    }

    #[test]
    fn histogram_covers_the_window_including_partial_tail() {
        let groups = vec![group(1, Some(at(12, 5))), group(2, Some(at(12, 50)))];
        let bins = assign_bins(&groups, at(12, 0), 20);
        // 12:00 to 12:50 needs three 20-minute bins, the last one partial.
        let hist = demand_histogram(&bins, at(12, 0), at(12, 50), 20);
        assert_eq!(hist.len(), 3);
        assert_eq!(hist[0].count, 1);
        assert_eq!(hist[1].count, 0);
        assert_eq!(hist[2].count, 1);
        assert_eq!(hist[0].label, "2024-06-01 12:00");
        assert_eq!(hist[2].start, at(12, 40));
    }

    #[test]
    fn degenerate_window_still_renders_one_bin() {
        let hist = demand_histogram(&[], at(12, 0), at(12, 0), 20);
        assert_eq!(hist.len(), 1);
        assert_eq!(hist[0].count, 0);
    }

    #[test]
    fn bin_table_numbers_rows_from_one() {
        let groups = vec![
            group(1, Some(at(12, 5))),
            group(2, Some(at(12, 10))),
            group(3, Some(at(12, 30))),
        ];
        let bins = assign_bins(&groups, at(12, 0), 20);
        let table = rows_for_bin(&bins, 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].rownum, 1);
        assert_eq!(table[0].callsign.as_deref(), Some("TST1"));
        assert_eq!(table[1].rownum, 2);
        assert!(rows_for_bin(&bins, 5).is_empty());
    }
}
