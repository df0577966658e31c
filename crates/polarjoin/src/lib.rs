//! Planar surveying computations on Easting/Northing coordinates.
//!
//! The crate is split the same way callers use it:
//! - `survey`: the pure Join/Polar math, angle conventions and DMS handling.
//!   Stateless, no I/O, no logging; safe to call from any thread.
//! - `points`: a small caller-owned store of named points. The math never reads it;
//!   callers resolve names to `Point` values before calling `join`/`polar`.
//! - `request`: the JSON calculation payload/response used by remote callers
//!   (HTTP handlers) and local ones (the CLI). Both go through
//!   `request::calculate`, so the two paths always produce identical numbers.
//!
//! Conventions
//! - Bearing from East: 0° = East, counter-clockwise positive (mathematical angle).
//! - Azimuth: 0° = North, clockwise positive (surveying angle).
//! - Reported angles are always normalized into [0, 360).

pub mod cfg;
pub mod points;
pub mod request;
pub mod survey;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::DisplayCfg;
pub use survey::{
    azimuth_from_bearing, bearing_from_azimuth, format_dms, from_dms, join, polar,
    polar_toward, to_dms, Direction, Dms, JoinResult, Point, PolarResult, SurveyError,
};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::DisplayCfg;
    pub use crate::points::{NamedPoint, PointStore, StoreError};
    pub use crate::request::{calculate, respond, CalculationRequest, CalculationResponse};
    pub use crate::survey::{
        angular_separation, azimuth_from_bearing, bearing_from_azimuth, format_dms, from_dms,
        join, normalize_degrees, polar, polar_toward, to_dms, Direction, Dms, JoinResult,
        Point, PolarResult, SurveyError,
    };
}
