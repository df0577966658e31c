//! Join and Polar computations on a local E/N survey grid.
//!
//! Purpose
//! - One canonical implementation of the two classical methods: Join (distance and
//!   direction between two known points) and Polar (new point from a known point, a
//!   distance and a direction).
//! - Keep the angle conventions explicit: bearings from East and azimuths from North
//!   are converted through a single pair of functions, always normalized to [0, 360).
//!
//! Inputs are validated, not propagated: non-finite coordinates or angles and
//! negative distances are rejected with `SurveyError::InvalidInput`.
//!
//! Code cross-refs: `Point`, `join`, `polar`, `Dms`, `azimuth_from_bearing`

mod angle;
mod dms;
mod methods;
mod types;

pub use angle::{
    angular_separation, azimuth_from_bearing, bearing_from_azimuth, normalize_degrees, Direction,
};
pub use dms::{format_dms, from_dms, to_dms, Dms};
pub use methods::{join, polar, polar_toward};
pub use types::{JoinResult, Point, PolarResult, SurveyError};
