use anyhow::{Context, Result};
use polarjoin::points::PointStore;
use polarjoin::survey::Point;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
    }
    Ok(())
}

fn parse_coord(value: Option<&str>, column: &str, row: usize) -> Result<f64> {
    let text = value.unwrap_or("").trim();
    text.parse::<f64>()
        .with_context(|| format!("row {row}: {column} {text:?} is not a number"))
}

/// Load a `Name,Easting,Northing` CSV. A missing file is an empty store.
pub fn load(path: &Path) -> Result<PointStore> {
    let mut store = PointStore::new();
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no point store yet");
        return Ok(store);
    }
    // Every column is read as text so numeric point names stay names.
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()
        .and_then(|lf| lf.collect())
        .with_context(|| format!("reading {}", path.display()))?;
    let names = df.column("Name")?.str()?;
    let eastings = df.column("Easting")?.str()?;
    let northings = df.column("Northing")?.str()?;
    for (idx, ((name, e), n)) in names
        .into_iter()
        .zip(eastings.into_iter())
        .zip(northings.into_iter())
        .enumerate()
    {
        // Header is row 1.
        let row = idx + 2;
        let point = Point::new(
            parse_coord(e, "Easting", row)?,
            parse_coord(n, "Northing", row)?,
        );
        store
            .insert(name.unwrap_or(""), point)
            .with_context(|| format!("{}: row {row}", path.display()))?;
    }
    tracing::debug!(points = store.len(), path = %path.display(), "loaded point store");
    Ok(store)
}

/// Write the store as CSV; `precision` fixes the float decimals (export), `None`
/// keeps full round-trip precision (persistence).
pub fn save(store: &PointStore, path: &Path, precision: Option<usize>) -> Result<()> {
    ensure_parent(path)?;
    let names: Vec<String> = store.iter().map(|p| p.name.clone()).collect();
    let eastings: Vec<f64> = store.iter().map(|p| p.point.easting).collect();
    let northings: Vec<f64> = store.iter().map(|p| p.point.northing).collect();
    let mut df = polars::df!(
        "Name" => names,
        "Easting" => eastings,
        "Northing" => northings
    )?;
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_float_precision(precision)
        .finish(&mut df)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(points = store.len(), path = %path.display(), ?precision, "wrote point store");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> PointStore {
        let mut s = PointStore::new();
        s.insert("1001", Point::new(5000.126, 10000.5)).unwrap();
        s.insert("BM-2", Point::new(-12.75, 0.333_333_333_3)).unwrap();
        s
    }

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let s = load(&dir.path().join("none.csv")).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn save_then_load_keeps_names_and_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("points.csv");
        save(&sample(), &path, None).unwrap();
        let back = load(&path).unwrap();
        let names: Vec<_> = back.iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, ["1001", "BM-2"]);
        assert_eq!(back.resolve("BM-2").unwrap(), Point::new(-12.75, 0.333_333_333_3));
    }

    #[test]
    fn export_fixes_decimals() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("export.csv");
        save(&sample(), &path, Some(2)).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Name,Easting,Northing"));
        assert_eq!(lines.next(), Some("1001,5000.13,10000.50"));
        assert_eq!(lines.next(), Some("BM-2,-12.75,0.33"));
    }

    #[test]
    fn duplicate_rows_are_rejected_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dup.csv");
        fs::write(&path, "Name,Easting,Northing\nA,1,2\nB,1.0001,2\n").unwrap();
        let err = load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("row 3"));
    }

    #[test]
    fn bad_number_names_the_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "Name,Easting,Northing\nA,east,2\n").unwrap();
        let err = load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("row 2: Easting"));
    }
}
