//! TDI Rust backend - trajectory and demand analysis for airspace sector dashboards.
//!
//! This crate turns raw flight trajectory records (WKT geometry plus start/end
//! timestamps) into the render-ready structures an interactive dashboard needs:
//! decimated map polylines, per-flight time-indexed position samples for an
//! animated "now" marker, and fixed-width temporal demand bins.
//!
//! The rendering surface (map widget, bar chart, flight table) is not part of
//! this crate; services emit plain serializable data structures. The relational
//! store is consumed through the repository traits in [`db`].

pub mod config;
pub mod core;
pub mod db;
pub mod geometry;
pub mod parsing;
pub mod services;
pub mod time;
