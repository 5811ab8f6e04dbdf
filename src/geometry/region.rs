//! Sector polygon conversion into a GeoJSON feature for the map overlay.

use geo_types::Geometry;
use geojson::{Feature, JsonObject};
use log::warn;
use serde_json::json;

use crate::geometry::decode::parse_geometry;

/// Convert a named POLYGON or MULTIPOLYGON WKT into a GeoJSON `Feature`.
///
/// Ring order follows the GeoJSON convention: the exterior ring first, then
/// one ring per interior hole, in encoded order, with `[lon, lat]` coordinate
/// pairs. Rings are emitted exactly as encoded - no re-closing and no vertex
/// de-duplication. Note this is the opposite axis order from the trajectory
/// decoders, which emit lat-first; map overlay consumers expect ring order,
/// point/line consumers expect lat-first.
///
/// Any other geometry kind, or a decode failure, yields a feature carrying
/// the same name and properties but no geometry; callers omit the overlay
/// rather than failing the request.
pub fn region_feature(name: &str, text: &str, properties: JsonObject) -> Feature {
    let mut props = properties;
    props.insert("name".to_string(), json!(name));

    let geometry = parse_geometry(text).and_then(|geom| match geom {
        Geometry::Polygon(polygon) => Some(geojson::Geometry::new(geojson::Value::from(&polygon))),
        Geometry::MultiPolygon(multi) => Some(geojson::Geometry::new(geojson::Value::from(&multi))),
        _ => {
            warn!("region '{name}' has a non-polygonal geometry, overlay omitted");
            None
        }
    });

    Feature {
        bbox: None,
        geometry,
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}
