//! WKT geometry decoding, decimation, and region overlay conversion.
//!
//! Decoders are deliberately lenient: empty input, malformed WKT, or an
//! unexpected geometry kind produce an empty result (logged at `warn`), never
//! an error. Callers treat "no geometry" as "nothing to draw" for that row.

pub mod decimate;
pub mod decode;
pub mod region;

pub use decimate::decimate;
pub use decode::{wkt_to_points, wkt_to_segments};
pub use region::region_feature;
