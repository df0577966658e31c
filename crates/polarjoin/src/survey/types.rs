//! Value types for the survey computations.
//!
//! - `Point`: planar E/N coordinate, convertible to `Vector2` for the math.
//! - `JoinResult`, `PolarResult`: immutable outputs of the two methods.
//! - `SurveyError`: the single recoverable error of the core.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Planar coordinate on a local survey grid (E ≙ x, N ≙ y).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub easting: f64,
    pub northing: f64,
}

impl Point {
    #[inline]
    pub fn new(easting: f64, northing: f64) -> Self {
        Self { easting, northing }
    }
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.easting.is_finite() && self.northing.is_finite()
    }
    #[inline]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.easting, self.northing)
    }
}

impl From<Vector2<f64>> for Point {
    #[inline]
    fn from(v: Vector2<f64>) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Point> for Vector2<f64> {
    #[inline]
    fn from(p: Point) -> Self {
        p.to_vector()
    }
}

/// Output of the Join method.
///
/// Invariants:
/// - `distance >= 0`, and `distance == 0` only for identical points.
/// - `bearing_from_east` and `azimuth` lie in [0, 360). Identical points report
///   bearing 0 (due East), hence azimuth 90.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct JoinResult {
    pub distance: f64,
    pub bearing_from_east: f64,
    pub azimuth: f64,
    pub delta_e: f64,
    pub delta_n: f64,
}

/// Output of the Polar method.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PolarResult {
    pub end_easting: f64,
    pub end_northing: f64,
    pub delta_e: f64,
    pub delta_n: f64,
}

impl PolarResult {
    #[inline]
    pub fn end_point(&self) -> Point {
        Point::new(self.end_easting, self.end_northing)
    }
}

/// Errors surfaced by the survey core and its adapters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurveyError {
    /// A numeric input is absent, not a number, non-finite, or out of range.
    InvalidInput { field: String, reason: String },
}

impl SurveyError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending input.
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidInput { field, .. } => field,
        }
    }
}

impl fmt::Display for SurveyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for SurveyError {}

/// Reject NaN and ±∞ for a named scalar input.
pub(crate) fn ensure_finite(field: &str, value: f64) -> Result<f64, SurveyError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SurveyError::invalid(field, format!("must be finite, got {value}")))
    }
}

/// Reject non-finite coordinates of a named point.
pub(crate) fn ensure_finite_point(field: &str, p: Point) -> Result<Point, SurveyError> {
    if p.is_finite() {
        Ok(p)
    } else {
        Err(SurveyError::invalid(
            field,
            format!(
                "coordinates must be finite, got ({}, {})",
                p.easting, p.northing
            ),
        ))
    }
}
