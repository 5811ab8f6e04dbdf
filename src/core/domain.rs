//! Domain models for flight trajectories, animation samples, and demand bins.
//!
//! These types are transient and request-scoped: they are rebuilt on every
//! fetch cycle (sector + time window + filter combination) and carry no cache
//! across cycles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A position in degrees, latitude first.
///
/// The WKT encoding stores `(lon, lat)`; every decoder in this crate performs
/// the axis swap so that downstream consumers only ever see lat-first pairs.
/// The one deliberate exception is the GeoJSON region overlay, whose rings
/// stay in `[lon, lat]` order per the GeoJSON convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Scheduled/estimated/calculated/actual take-off and landing times carried
/// through from the flight record for table display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightTimes {
    pub etot: Option<DateTime<Utc>>,
    pub eldt: Option<DateTime<Utc>>,
    pub ctot: Option<DateTime<Utc>>,
    pub cldt: Option<DateTime<Utc>>,
    pub atot: Option<DateTime<Utc>>,
    pub aldt: Option<DateTime<Utc>>,
}

impl FlightTimes {
    /// Fill any unset field from `other`. First non-empty value wins; a value
    /// already present is never overwritten.
    pub fn merge_missing(&mut self, other: &FlightTimes) {
        fn fill(slot: &mut Option<DateTime<Utc>>, value: &Option<DateTime<Utc>>) {
            if slot.is_none() {
                *slot = *value;
            }
        }
        fill(&mut self.etot, &other.etot);
        fill(&mut self.eldt, &other.eldt);
        fill(&mut self.ctot, &other.ctot);
        fill(&mut self.cldt, &other.cldt);
        fill(&mut self.atot, &other.atot);
        fill(&mut self.aldt, &other.aldt);
    }
}

/// All trajectory rows for one flight, combined.
///
/// A flight's trajectory may be segmented across several records
/// (re-activation, update splits). Folding rows into a `FlightGroup`
/// concatenates their coordinates in row order and refines the flight
/// attributes monotonically: airport codes and callsign keep the first
/// non-empty value seen, `start_time` only ever moves earlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightGroup {
    pub flight_id: i64,
    pub callsign: Option<String>,
    pub points: Vec<Coordinate>,
    pub start_time: Option<DateTime<Utc>>,
    pub airport_departure: Option<String>,
    pub airport_arrival: Option<String>,
    pub times: FlightTimes,
}

impl FlightGroup {
    pub fn new(flight_id: i64) -> Self {
        Self {
            flight_id,
            callsign: None,
            points: Vec::new(),
            start_time: None,
            airport_departure: None,
            airport_arrival: None,
            times: FlightTimes::default(),
        }
    }

    /// Callsign when known, otherwise a stable fallback built from the id.
    pub fn display_name(&self) -> String {
        match &self.callsign {
            Some(cs) => cs.clone(),
            None => format!("FID {}", self.flight_id),
        }
    }

    /// Fold one row's attributes and decoded coordinates into the group.
    pub fn absorb(
        &mut self,
        points: Vec<Coordinate>,
        row_start: Option<DateTime<Utc>>,
        callsign: &Option<String>,
        airport_departure: &Option<String>,
        airport_arrival: &Option<String>,
        times: &FlightTimes,
    ) {
        fn fill_nonempty(slot: &mut Option<String>, value: &Option<String>) {
            if slot.is_none() {
                if let Some(v) = value {
                    if !v.is_empty() {
                        *slot = Some(v.clone());
                    }
                }
            }
        }
        fill_nonempty(&mut self.callsign, callsign);
        fill_nonempty(&mut self.airport_departure, airport_departure);
        fill_nonempty(&mut self.airport_arrival, airport_arrival);
        self.times.merge_missing(times);

        if let Some(start) = row_start {
            match self.start_time {
                Some(current) if current <= start => {}
                _ => self.start_time = Some(start),
            }
        }
        self.points.extend(points);
    }
}

/// A flight's coordinates paired with interpolated timestamps, sorted
/// ascending with untimed samples after all timed ones.
///
/// Invariant: `points.len() == timestamps.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedSeries {
    pub flight_id: i64,
    pub label: String,
    pub points: Vec<Coordinate>,
    pub timestamps: Vec<Option<DateTime<Utc>>>,
}

impl TimedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The interpolated position at time `t`: the last sample whose timestamp
    /// is at or before `t`. Untimed samples never match. Pure and safe to
    /// call repeatedly while an animation plays.
    pub fn position_at(&self, t: DateTime<Utc>) -> Option<Coordinate> {
        let idx = self
            .timestamps
            .partition_point(|ts| ts.map_or(false, |v| v <= t));
        if idx == 0 {
            None
        } else {
            Some(self.points[idx - 1])
        }
    }
}

/// Animated "now" marker for one flight at one lookup time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowMarker {
    pub flight_id: i64,
    pub coordinate: Coordinate,
    pub label: String,
}

/// An assignment of a flight to a fixed-width time interval, with the display
/// attributes the flight table needs.
///
/// Invariant: `bin` counts whole intervals since the aligned window start and
/// is therefore never negative; flights starting before the aligned window
/// start receive no `DemandBin` at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandBin {
    pub flight_id: i64,
    pub bin: u32,
    pub callsign: Option<String>,
    pub airport_departure: Option<String>,
    pub airport_arrival: Option<String>,
    pub times: FlightTimes,
}
