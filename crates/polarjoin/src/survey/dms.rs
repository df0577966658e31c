//! Degrees-minutes-seconds conversion and formatting.
//!
//! Invariants of `Dms`:
//! - `minutes` in [0, 59], `seconds` in [0, 60).
//! - The sign lives in `negative` so that angles in (-1°, 0) keep it.
//!
//! Rounding seconds for display can produce 60 (e.g. 59.996" at 2 decimals);
//! `Dms::rounded` carries into minutes and degrees so "12° 60' 00.00"" never appears.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::{ensure_finite, SurveyError};
use crate::cfg::DMS_SECONDS_DECIMALS;

/// Sexagesimal angle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dms {
    pub negative: bool,
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: f64,
}

impl Dms {
    /// Degrees with the sign applied (`-0` collapses to `0`; use `negative`).
    #[inline]
    pub fn signed_degrees(&self) -> i64 {
        if self.negative {
            -i64::from(self.degrees)
        } else {
            i64::from(self.degrees)
        }
    }

    /// Decimal degrees.
    pub fn to_decimal(&self) -> f64 {
        let abs = f64::from(self.degrees) + f64::from(self.minutes) / 60.0 + self.seconds / 3600.0;
        if self.negative {
            -abs
        } else {
            abs
        }
    }

    /// Round seconds to `decimals` and carry 60" → 1' and 60' → 1°.
    pub fn rounded(self, decimals: usize) -> Dms {
        let out = carry(Dms {
            seconds: round_to(self.seconds, decimals),
            ..self
        });
        if out.degrees == 0 && out.minutes == 0 && out.seconds == 0.0 {
            Dms {
                negative: false,
                seconds: 0.0,
                ..out
            }
        } else {
            out
        }
    }
}

/// Formats as `45° 30' 15.00"`; `{:.N}` selects N decimals of seconds.
impl fmt::Display for Dms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decimals = f.precision().unwrap_or(DMS_SECONDS_DECIMALS);
        let r = self.rounded(decimals);
        let width = if decimals == 0 { 2 } else { decimals + 3 };
        let sign = if r.negative { "-" } else { "" };
        write!(
            f,
            "{sign}{}° {:02}' {:0width$.decimals$}\"",
            r.degrees, r.minutes, r.seconds
        )
    }
}

#[inline]
fn round_to(x: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals.min(15) as i32);
    (x * scale).round() / scale
}

fn carry(mut d: Dms) -> Dms {
    if d.seconds >= 60.0 {
        let whole = (d.seconds / 60.0).floor();
        d.seconds -= whole * 60.0;
        d.minutes = d.minutes.saturating_add(whole as u32);
    }
    if d.minutes >= 60 {
        d.degrees = d.degrees.saturating_add(d.minutes / 60);
        d.minutes %= 60;
    }
    d
}

/// Split decimal degrees into degrees, minutes and unrounded seconds.
pub fn to_dms(decimal_degrees: f64) -> Result<Dms, SurveyError> {
    let value = ensure_finite("angle", decimal_degrees)?;
    let abs = value.abs();
    if abs >= f64::from(u32::MAX) {
        return Err(SurveyError::invalid(
            "angle",
            format!("{value} is out of range for DMS"),
        ));
    }
    let degrees = abs.floor();
    let minutes_float = (abs - degrees) * 60.0;
    let minutes = minutes_float.floor();
    let seconds = (minutes_float - minutes) * 60.0;
    Ok(carry(Dms {
        negative: value < 0.0,
        degrees: degrees as u32,
        minutes: minutes as u32,
        seconds,
    }))
}

/// Join degrees, minutes and seconds into decimal degrees.
///
/// The sign of `degrees` applies to the whole angle; minutes and seconds must be
/// non-negative and below 60.
pub fn from_dms(degrees: f64, minutes: f64, seconds: f64) -> Result<f64, SurveyError> {
    let degrees = ensure_finite("degrees", degrees)?;
    let minutes = ensure_finite("minutes", minutes)?;
    let seconds = ensure_finite("seconds", seconds)?;
    if !(0.0..60.0).contains(&minutes) {
        return Err(SurveyError::invalid(
            "minutes",
            format!("must be in [0, 60), got {minutes}"),
        ));
    }
    if !(0.0..60.0).contains(&seconds) {
        return Err(SurveyError::invalid(
            "seconds",
            format!("must be in [0, 60), got {seconds}"),
        ));
    }
    let abs = degrees.abs() + minutes / 60.0 + seconds / 3600.0;
    Ok(if degrees.is_sign_negative() { -abs } else { abs })
}

/// Format a DMS triple as `{d}° {mm}' {ss.precision}"`.
///
/// The sign is taken from `degrees` and printed once. Seconds are rounded to
/// `precision` decimals with carry.
pub fn format_dms(degrees: i32, minutes: u32, seconds: f64, precision: usize) -> String {
    let dms = Dms {
        negative: degrees < 0,
        degrees: degrees.unsigned_abs(),
        minutes,
        seconds,
    };
    format!("{dms:.precision$}")
}
