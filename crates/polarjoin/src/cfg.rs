//! Fixed constants and display settings.
//!
//! Policy
//! - Angle and matching constants are fixed; they are part of the numeric
//!   contract shared by every caller.
//! - Display settings live in `DisplayCfg`, which callers build once and pass down.

use crate::survey::SurveyError;

/// Degrees in a full turn.
pub const FULL_TURN: f64 = 360.0;
/// Default number of decimals for distances and coordinates.
pub const DEFAULT_PRECISION: usize = 2;
/// Largest accepted display precision.
pub const MAX_PRECISION: usize = 10;
/// Decimals of DMS seconds in results and default displays.
pub const DMS_SECONDS_DECIMALS: usize = 2;
/// Decimals at which two saved points count as the same coordinates.
pub const COORD_MATCH_DECIMALS: usize = 3;

/// Display configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayCfg {
    /// Decimals for distances, coordinates and coordinate differences.
    pub precision: usize,
    /// Decimals for the seconds field of DMS angles.
    pub dms_seconds: usize,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            dms_seconds: DMS_SECONDS_DECIMALS,
        }
    }
}

impl DisplayCfg {
    /// Display config with the given coordinate precision (0..=10).
    pub fn with_precision(precision: usize) -> Result<Self, SurveyError> {
        if precision > MAX_PRECISION {
            return Err(SurveyError::invalid(
                "precision",
                format!("decimal places must be an integer 0-{MAX_PRECISION}, got {precision}"),
            ));
        }
        Ok(Self {
            precision,
            ..Self::default()
        })
    }
}
