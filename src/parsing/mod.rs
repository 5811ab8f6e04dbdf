//! Parsers for per-trajectory profile strings.
//!
//! Trajectory rows carry altitude, speed, and heading as comma-separated
//! numeric strings parallel to the geometry vertices. Tokens that fail to
//! parse become `None` entries ("unknown", never zero) rather than aborting
//! the row.

pub mod profiles;


pub use profiles::parse_numeric_profile;
