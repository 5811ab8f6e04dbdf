//! Pipeline services: grouping, map layers, animation sampling, demand
//! binning, and the fetch-cycle orchestrator.

pub mod animation;
pub mod demand;
pub mod map_view;
pub mod sector_view;

pub use animation::{positions_at, sample_flights};
pub use demand::{assign_bins, demand_histogram, rows_for_bin, FlightTableRow, HistogramBin};
pub use map_view::{
    group_rows, highlight_layer, map_center, path_layer, path_layer_for_flights, PathLayer,
};
pub use sector_view::{build_view, SectorView, ViewRequest, ViewStatus};
