//! WKT decoding into lat-first coordinate sequences.

use geo_types::{Geometry, LineString};
use log::warn;

use crate::core::Coordinate;
use crate::geometry::decimate;

/// Parse WKT text into a geo-types geometry. `None` on empty or malformed
/// input; decode failures are logged, never raised.
pub(crate) fn parse_geometry(text: &str) -> Option<Geometry<f64>> {
    use std::str::FromStr;

    if text.trim().is_empty() {
        return None;
    }
    let parsed = wkt::Wkt::from_str(text)
        .map_err(|e| format!("{e:?}"))
        .and_then(|w| {
            w.try_into()
                .map_err(|e: wkt::conversion::Error| format!("{e:?}"))
        });
    match parsed {
        Ok(geom) => Some(geom),
        Err(e) => {
            warn!("unparseable WKT geometry: {e}");
            None
        }
    }
}

fn line_coordinates(line: &LineString<f64>) -> Vec<Coordinate> {
    line.coords().map(|c| Coordinate::new(c.y, c.x)).collect()
}

/// Flatten WKT to an ordered list of `(lat, lon)` coordinates.
///
/// A point yields one element, a linestring its vertices in encoded order,
/// and a multi-linestring the concatenation of its parts in collection order
/// with no separator. Anything else decodes to an empty list. Callers that
/// need per-part grouping use [`wkt_to_segments`] instead.
pub fn wkt_to_points(text: &str) -> Vec<Coordinate> {
    let Some(geom) = parse_geometry(text) else {
        return Vec::new();
    };
    match geom {
        Geometry::Point(p) => vec![Coordinate::new(p.y(), p.x())],
        Geometry::LineString(line) => line_coordinates(&line),
        Geometry::MultiLineString(lines) => lines
            .0
            .iter()
            .flat_map(|line| line_coordinates(line))
            .collect(),
        _ => {
            warn!("unsupported WKT kind for trajectory decoding");
            Vec::new()
        }
    }
}

/// Decode WKT into one coordinate list per geometric part, each part
/// independently decimated by `max(1, decimation)`.
///
/// Used where segment boundaries matter (highlighting a segmented flight
/// keeps hover data aligned per row part). A point or single line produces
/// one part; a multi-linestring one part per member.
pub fn wkt_to_segments(text: &str, decimation: usize) -> Vec<Vec<Coordinate>> {
    let Some(geom) = parse_geometry(text) else {
        return Vec::new();
    };
    let step = decimation.max(1);
    match geom {
        Geometry::Point(p) => vec![vec![Coordinate::new(p.y(), p.x())]],
        Geometry::LineString(line) => vec![decimate(&line_coordinates(&line), step)],
        Geometry::MultiLineString(lines) => lines
            .0
            .iter()
            .map(|line| decimate(&line_coordinates(line), step))
            .collect(),
        _ => {
            warn!("unsupported WKT kind for segment decoding");
            Vec::new()
        }
    }
}
