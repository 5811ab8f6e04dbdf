//! Core domain types shared across the pipeline.

pub mod domain;

pub use domain::{Coordinate, DemandBin, FlightGroup, FlightTimes, NowMarker, TimedSeries};
