//! Angle normalization and the bearing/azimuth duality.
//!
//! `azimuth = (90 − bearing) mod 360` and `bearing = (90 − azimuth) mod 360`:
//! the map is its own inverse, so both directions share `reflect_about_north_east`.

use serde::{Deserialize, Serialize};

use super::types::{ensure_finite, SurveyError};
use crate::cfg::FULL_TURN;

/// Normalize degrees into [0, 360).
///
/// `rem_euclid` may round a tiny negative input up to exactly 360, and returns
/// -0.0 for -0.0; both collapse to 0.
#[inline]
pub fn normalize_degrees(deg: f64) -> f64 {
    let r = deg.rem_euclid(FULL_TURN);
    if r >= FULL_TURN || r == 0.0 {
        0.0
    } else {
        r
    }
}

#[inline]
fn reflect_about_north_east(deg: f64) -> f64 {
    normalize_degrees(90.0 - deg)
}

/// Azimuth (from North, clockwise) for a bearing from East (counter-clockwise).
#[inline]
pub fn azimuth_from_bearing(bearing_from_east: f64) -> f64 {
    reflect_about_north_east(bearing_from_east)
}

/// Bearing from East (counter-clockwise) for an azimuth (from North, clockwise).
#[inline]
pub fn bearing_from_azimuth(azimuth: f64) -> f64 {
    reflect_about_north_east(azimuth)
}

/// Smallest absolute difference between two directions, in [0, 180].
#[inline]
pub fn angular_separation(a: f64, b: f64) -> f64 {
    let d = normalize_degrees(a - b);
    d.min(FULL_TURN - d)
}

/// Direction of a Polar leg in either convention (decimal degrees).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "convention", content = "degrees")]
pub enum Direction {
    /// 0° = East, counter-clockwise positive.
    BearingFromEast(f64),
    /// 0° = North, clockwise positive.
    Azimuth(f64),
}

impl Direction {
    /// Bearing from East in [0, 360).
    pub fn bearing_from_east(self) -> Result<f64, SurveyError> {
        match self {
            Direction::BearingFromEast(b) => {
                Ok(normalize_degrees(ensure_finite("bearing_from_east", b)?))
            }
            Direction::Azimuth(a) => Ok(bearing_from_azimuth(ensure_finite("azimuth", a)?)),
        }
    }

    /// Azimuth in [0, 360).
    pub fn azimuth(self) -> Result<f64, SurveyError> {
        match self {
            Direction::BearingFromEast(b) => {
                Ok(azimuth_from_bearing(ensure_finite("bearing_from_east", b)?))
            }
            Direction::Azimuth(a) => Ok(normalize_degrees(ensure_finite("azimuth", a)?)),
        }
    }
}
