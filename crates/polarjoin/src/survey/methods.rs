use nalgebra::Vector2;

use super::angle::{azimuth_from_bearing, normalize_degrees, Direction};
use super::types::{ensure_finite, ensure_finite_point, JoinResult, Point, PolarResult, SurveyError};

/// Join method: distance and direction from `a` to `b`.
///
/// Identical points (signed zeros included) give distance 0, bearing 0 and
/// azimuth 90.
pub fn join(a: Point, b: Point) -> Result<JoinResult, SurveyError> {
    let a = ensure_finite_point("point A", a)?;
    let b = ensure_finite_point("point B", b)?;
    let delta: Vector2<f64> = b.to_vector() - a.to_vector();
    if !(delta.x.is_finite() && delta.y.is_finite()) {
        return Err(SurveyError::invalid(
            "point B",
            "coordinate difference overflows f64",
        ));
    }
    // Adding +0.0 turns -0.0 into +0.0; atan2 reads the sign of a zero.
    let (delta_e, delta_n) = (delta.x + 0.0, delta.y + 0.0);
    // hypot scales internally: no underflow to 0 or overflow to inf.
    let distance = delta_e.hypot(delta_n);
    let bearing_from_east = if distance == 0.0 {
        0.0
    } else {
        normalize_degrees(delta_n.atan2(delta_e).to_degrees())
    };
    Ok(JoinResult {
        distance,
        bearing_from_east,
        azimuth: azimuth_from_bearing(bearing_from_east),
        delta_e,
        delta_n,
    })
}

/// Polar method: the point `distance` away from `start` along `bearing_from_east`
/// (degrees, any real value).
pub fn polar(start: Point, distance: f64, bearing_from_east: f64) -> Result<PolarResult, SurveyError> {
    let start = ensure_finite_point("start point", start)?;
    let distance = ensure_finite("distance", distance)?;
    if distance < 0.0 {
        return Err(SurveyError::invalid(
            "distance",
            format!("must be non-negative, got {distance}"),
        ));
    }
    let bearing = ensure_finite("bearing_from_east", bearing_from_east)?.to_radians();
    let delta = Vector2::new(bearing.cos(), bearing.sin()) * distance;
    let end = start.to_vector() + delta;
    Ok(PolarResult {
        end_easting: end.x,
        end_northing: end.y,
        delta_e: delta.x,
        delta_n: delta.y,
    })
}

/// Polar method with the direction in either angle convention.
pub fn polar_toward(
    start: Point,
    distance: f64,
    direction: Direction,
) -> Result<PolarResult, SurveyError> {
    polar(start, distance, direction.bearing_from_east()?)
}
