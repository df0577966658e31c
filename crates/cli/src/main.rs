use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use polarjoin::points::PointStore;
use polarjoin::request::{
    calculate, respond_str, CalculationRequest, CalculationResult, JoinRequest, PolarRequest,
};
use polarjoin::survey::Point;
use polarjoin::DisplayCfg;
use serde::Serialize;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

mod render;
mod store;

#[derive(Parser)]
#[command(name = "polarjoin", version)]
#[command(about = "Join and Polar survey calculations on Easting/Northing coordinates")]
struct Cmd {
    /// Decimal places for distances and coordinates (0-10)
    #[arg(long, global = true, default_value_t = polarjoin::cfg::DEFAULT_PRECISION)]
    precision: usize,

    /// Saved points CSV (Name,Easting,Northing)
    #[arg(long, global = true, default_value = "points.csv")]
    store: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Distance and direction between two points (Join method)
    Join {
        /// Saved name of point A
        #[arg(long = "a", value_name = "NAME", conflicts_with_all = ["ea", "na"])]
        a: Option<String>,
        #[arg(long, allow_hyphen_values = true, requires = "na")]
        ea: Option<f64>,
        #[arg(long, allow_hyphen_values = true, requires = "ea")]
        na: Option<f64>,
        /// Saved name of point B
        #[arg(long = "b", value_name = "NAME", conflicts_with_all = ["eb", "nb"])]
        b: Option<String>,
        #[arg(long, allow_hyphen_values = true, requires = "nb")]
        eb: Option<f64>,
        #[arg(long, allow_hyphen_values = true, requires = "eb")]
        nb: Option<f64>,
    },
    /// New point from a start point, distance and direction (Polar method)
    Polar {
        /// Saved name of the start point
        #[arg(long, value_name = "NAME", conflicts_with_all = ["ea", "na"])]
        from: Option<String>,
        #[arg(long, allow_hyphen_values = true, requires = "na")]
        ea: Option<f64>,
        #[arg(long, allow_hyphen_values = true, requires = "ea")]
        na: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        distance: f64,
        #[command(flatten)]
        direction: DirectionArgs,
        /// Save the end point under this name
        #[arg(long, value_name = "NAME")]
        save: Option<String>,
    },
    /// Evaluate a JSON calculation payload and print the response envelope
    Calculate {
        /// Payload file; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Manage saved points
    Points {
        #[command(subcommand)]
        action: PointsAction,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct DirectionArgs {
    /// Bearing from East in decimal degrees (counter-clockwise)
    #[arg(long, allow_hyphen_values = true)]
    angle: Option<f64>,
    /// Azimuth from North in decimal degrees (clockwise)
    #[arg(long, allow_hyphen_values = true)]
    azimuth: Option<f64>,
    /// Azimuth from North as degrees, minutes, seconds
    #[arg(long, num_args = 3, value_names = ["DEG", "MIN", "SEC"], allow_hyphen_values = true)]
    azimuth_dms: Option<Vec<f64>>,
}

#[derive(Subcommand)]
enum PointsAction {
    /// List saved points
    List,
    /// Save a point
    Add {
        name: String,
        #[arg(allow_hyphen_values = true)]
        easting: f64,
        #[arg(allow_hyphen_values = true)]
        northing: f64,
    },
    /// Delete a saved point
    Remove { name: String },
    /// Write saved points as CSV with coordinates fixed to --precision decimals
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Serialize)]
struct PolarOutput<'a> {
    #[serde(flatten)]
    result: &'a CalculationResult,
    /// Saved point whose coordinates match the end point at display precision.
    end_point_name: Option<String>,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose { Level::DEBUG } else { Level::WARN };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    let stdout = std::io::stdout();
    run(cmd, &mut stdout.lock())
}

fn run(cmd: Cmd, out: &mut impl Write) -> Result<()> {
    let cfg = DisplayCfg::with_precision(cmd.precision)?;
    match cmd.action {
        Action::Join {
            a,
            ea,
            na,
            b,
            eb,
            nb,
        } => {
            let points = store::load(&cmd.store)?;
            let pa = resolve_point(&points, "A", a.as_deref(), ea, na)?
                .context("point A: give --a NAME or --ea/--na")?;
            let pb = resolve_point(&points, "B", b.as_deref(), eb, nb)?
                .context("point B: give --b NAME or --eb/--nb")?;
            tracing::info!(?pa, ?pb, "join");
            let r = calculate(&CalculationRequest::Join(JoinRequest {
                ea: Some(pa.easting),
                na: Some(pa.northing),
                eb: Some(pb.easting),
                nb: Some(pb.northing),
            }))?;
            emit(out, cmd.json, &r, &r, cfg)
        }
        Action::Polar {
            from,
            ea,
            na,
            distance,
            direction,
            save,
        } => {
            let mut points = store::load(&cmd.store)?;
            let start = resolve_point(&points, "start", from.as_deref(), ea, na)?;
            if save.is_some() && start.is_none() {
                bail!("--save needs a start point (--from NAME or --ea/--na)");
            }
            let req = polar_request(start, distance, &direction)?;
            tracing::info!(?start, distance, "polar");
            let r = calculate(&CalculationRequest::Polar(req))?;
            let mut end_name = None;
            if let Some(end) = r.end_point {
                if let Some(name) = save {
                    let saved = points.insert(&name, end)?.name.clone();
                    store::save(&points, &cmd.store, None)?;
                    tracing::info!(name = %saved, store = %cmd.store.display(), "saved end point");
                }
                end_name = points
                    .find_by_coords(end, cfg.precision)
                    .map(|p| p.name.clone());
            }
            let json = PolarOutput {
                result: &r,
                end_point_name: end_name.clone(),
            };
            emit(out, cmd.json, &json, &r, cfg)?;
            if let (false, Some(name)) = (cmd.json, end_name) {
                writeln!(out, "End point matches saved point \"{name}\"")?;
            }
            Ok(())
        }
        Action::Calculate { input } => {
            let body = read_input(input.as_deref())?;
            let resp = respond_str(&body);
            writeln!(out, "{}", serde_json::to_string_pretty(&resp)?)?;
            if !resp.is_ok() {
                bail!("calculation rejected (status {})", resp.status());
            }
            Ok(())
        }
        Action::Points { action } => points_cmd(action, &cmd.store, cmd.json, cfg, out),
    }
}

fn points_cmd(
    action: PointsAction,
    path: &Path,
    json: bool,
    cfg: DisplayCfg,
    out: &mut impl Write,
) -> Result<()> {
    let mut points = store::load(path)?;
    match action {
        PointsAction::List => {
            if json {
                let all: Vec<_> = points.iter().collect();
                writeln!(out, "{}", serde_json::to_string_pretty(&all)?)?;
            } else {
                write!(out, "{}", render::points_table(&points, cfg))?;
            }
        }
        PointsAction::Add {
            name,
            easting,
            northing,
        } => {
            let saved = points.insert(&name, Point::new(easting, northing))?.name.clone();
            store::save(&points, path, None)?;
            tracing::info!(name = %saved, "point added");
            writeln!(out, "saved \"{saved}\" ({} points)", points.len())?;
        }
        PointsAction::Remove { name } => {
            let removed = points.remove(&name)?;
            store::save(&points, path, None)?;
            tracing::info!(name = %removed.name, "point removed");
            writeln!(out, "removed \"{}\" ({} points)", removed.name, points.len())?;
        }
        PointsAction::Export { out: target } => {
            store::save(&points, &target, Some(cfg.precision))?;
            tracing::info!(target = %target.display(), points = points.len(), "exported");
            writeln!(out, "exported {} points to {}", points.len(), target.display())?;
        }
    }
    Ok(())
}

/// A saved name wins; otherwise both coordinates, otherwise nothing.
fn resolve_point(
    points: &PointStore,
    label: &str,
    name: Option<&str>,
    easting: Option<f64>,
    northing: Option<f64>,
) -> Result<Option<Point>> {
    match (name, easting, northing) {
        (Some(name), _, _) => Ok(Some(
            points
                .resolve(name)
                .with_context(|| format!("point {label}"))?,
        )),
        (None, Some(e), Some(n)) => Ok(Some(Point::new(e, n))),
        (None, None, None) => Ok(None),
        _ => bail!("point {label}: both easting and northing are required"),
    }
}

fn polar_request(start: Option<Point>, distance: f64, dir: &DirectionArgs) -> Result<PolarRequest> {
    let mut req = PolarRequest {
        distance: Some(distance),
        start_easting: start.map(|p| p.easting),
        start_northing: start.map(|p| p.northing),
        ..PolarRequest::default()
    };
    match (dir.angle, dir.azimuth, dir.azimuth_dms.as_deref()) {
        (Some(angle), _, _) => req.angle = Some(angle),
        (_, Some(az), _) => {
            req.use_azimuth = Some(true);
            req.degrees = Some(az);
        }
        (_, _, Some([d, m, s])) => {
            req.use_azimuth = Some(true);
            req.degrees = Some(*d);
            req.minutes = Some(*m);
            req.seconds = Some(*s);
        }
        _ => bail!("give one of --angle, --azimuth or --azimuth-dms DEG MIN SEC"),
    }
    Ok(req)
}

fn emit<T: Serialize>(
    out: &mut impl Write,
    json: bool,
    value: &T,
    r: &CalculationResult,
    cfg: DisplayCfg,
) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    } else {
        write!(out, "{}", render::result_text(r, cfg)?)?;
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display())),
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("reading payload from stdin")?;
            Ok(body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    fn run_args(args: &[&str]) -> Result<String> {
        let cmd = Cmd::try_parse_from(args)?;
        let mut buf = Vec::new();
        run(cmd, &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cmd::command().debug_assert();
    }

    #[test]
    fn direction_flags_are_exclusive() {
        let r = Cmd::try_parse_from([
            "polarjoin", "polar", "--distance", "5", "--angle", "10", "--azimuth", "20",
        ]);
        assert!(r.is_err());
        let r = Cmd::try_parse_from(["polarjoin", "polar", "--distance", "5"]);
        assert!(r.is_err());
    }

    #[test]
    fn join_with_coordinates() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("p.csv");
        let text = run_args(&[
            "polarjoin", "--store", store.to_str().unwrap(), "join",
            "--ea", "0", "--na", "0", "--eb", "0", "--nb", "-10",
        ])
        .unwrap();
        assert!(text.contains("Distance: 10.00 m"));
        assert!(text.contains("Azimuth: 180.000000° (180° 00' 00.00\")"));
    }

    #[test]
    fn polar_saves_and_reuses_end_point() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("p.csv");
        let s = store.to_str().unwrap();
        run_args(&["polarjoin", "--store", s, "points", "add", "STN1", "100", "100"]).unwrap();
        let text = run_args(&[
            "polarjoin", "--store", s, "polar", "--from", "STN1", "--distance", "50",
            "--azimuth-dms", "0", "0", "0", "--save", "STN2",
        ])
        .unwrap();
        assert!(text.contains("End: E=100.00 N=150.00"));
        assert!(text.contains("matches saved point \"STN2\""));

        let json = run_args(&[
            "polarjoin", "--store", s, "--json", "join", "--a", "STN1", "--b", "STN2",
        ])
        .unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!((v["distance"].as_f64().unwrap() - 50.0).abs() < 1e-9);

        let dup = run_args(&[
            "polarjoin", "--store", s, "polar", "--from", "STN1", "--distance", "50",
            "--angle", "90", "--save", "OTHER",
        ]);
        assert!(format!("{:#}", dup.unwrap_err()).contains("already exists"));
    }

    #[test]
    fn negative_distance_is_rejected() {
        let err = run_args(&[
            "polarjoin", "polar", "--ea", "0", "--na", "0", "--distance", "-3", "--angle", "0",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("distance"));
    }

    #[test]
    fn calculate_from_file_prints_envelope() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("req.json");
        std::fs::write(&input, r#"{"type":"join","ea":"0","na":"0","eb":"10","nb":"0"}"#).unwrap();
        let text = run_args(&["polarjoin", "calculate", "--input", input.to_str().unwrap()]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["result"]["method"], "join");

        std::fs::write(&input, r#"{"type":"nope"}"#).unwrap();
        let err = run_args(&["polarjoin", "calculate", "--input", input.to_str().unwrap()]);
        assert!(err.unwrap_err().to_string().contains("400"));
    }

    #[test]
    fn points_lifecycle_and_export() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("p.csv");
        let s = store.to_str().unwrap();
        run_args(&["polarjoin", "--store", s, "points", "add", "A", "1.5", "-2.25"]).unwrap();
        run_args(&["polarjoin", "--store", s, "points", "add", "B", "3", "4"]).unwrap();
        let listed = run_args(&["polarjoin", "--store", s, "points", "list"]).unwrap();
        assert!(listed.contains("-2.25"));
        let out = dir.path().join("exports").join("pts.csv");
        run_args(&[
            "polarjoin", "--store", s, "--precision", "1", "points", "export", "--out",
            out.to_str().unwrap(),
        ])
        .unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.contains("A,1.5,-2.2") || text.contains("A,1.5,-2.3"));
        run_args(&["polarjoin", "--store", s, "points", "remove", "A"]).unwrap();
        let listed = run_args(&["polarjoin", "--store", s, "--json", "points", "list"]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&listed).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 1);
    }

    #[test]
    fn precision_out_of_range() {
        let err = run_args(&["polarjoin", "--precision", "11", "points", "list"]).unwrap_err();
        assert!(err.to_string().contains("decimal places"));
    }
}
