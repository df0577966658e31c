//! Plain-text rendering of results and saved points.

use anyhow::Result;
use polarjoin::points::PointStore;
use polarjoin::request::CalculationResult;
use polarjoin::survey::{to_dms, Point};
use polarjoin::DisplayCfg;
use std::fmt::Write as _;

/// Angles are shown at a fixed 6 decimals, like the calculator form.
const ANGLE_DECIMALS: usize = 6;

fn point_line(label: &str, p: Point, cfg: DisplayCfg) -> String {
    let prec = cfg.precision;
    format!(
        "{label}: E={:.prec$} N={:.prec$}",
        p.easting, p.northing
    )
}

pub fn result_text(r: &CalculationResult, cfg: DisplayCfg) -> Result<String> {
    let prec = cfg.precision;
    let secs = cfg.dms_seconds;
    let dms = to_dms(r.azimuth)?;
    let angle = ANGLE_DECIMALS;
    let mut out = String::new();
    writeln!(out, "Method: {}", r.method)?;
    writeln!(out, "Distance: {:.prec$} m", r.distance)?;
    writeln!(
        out,
        "Azimuth: {:.angle$}° ({dms:.secs$})",
        r.azimuth
    )?;
    writeln!(
        out,
        "Bearing from East: {:.angle$}°",
        r.bearing_from_east
    )?;
    writeln!(out, "ΔE: {:.prec$} m", r.delta_e)?;
    writeln!(out, "ΔN: {:.prec$} m", r.delta_n)?;
    if let Some(p) = r.start_point {
        writeln!(out, "{}", point_line("Start", p, cfg))?;
    }
    if let Some(p) = r.end_point {
        writeln!(out, "{}", point_line("End", p, cfg))?;
    }
    Ok(out)
}

pub fn points_table(store: &PointStore, cfg: DisplayCfg) -> String {
    if store.is_empty() {
        return "no saved points\n".to_string();
    }
    let prec = cfg.precision;
    let width = store
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    let mut out = format!("{:<width$}  {:>14}  {:>14}\n", "Name", "Easting", "Northing");
    for p in store.iter() {
        out.push_str(&format!(
            "{:<width$}  {:>14.prec$}  {:>14.prec$}\n",
            p.name, p.point.easting, p.point.northing
        ));
    }
    out
}
