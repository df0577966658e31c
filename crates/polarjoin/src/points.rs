//! Caller-owned store of named survey points.
//!
//! The survey math never reads this store. Callers look points up by name and
//! pass plain `Point` values to `join`/`polar`.
//!
//! Invariants:
//! - Names are trimmed, non-empty and unique.
//! - No two points share coordinates at `COORD_MATCH_DECIMALS` decimals.
//! - Insertion order is preserved (it is the export order).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cfg::COORD_MATCH_DECIMALS;
use crate::survey::Point;

/// A saved point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedPoint {
    pub name: String,
    pub point: Point,
}

/// Errors raised by `PointStore` mutations and lookups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    EmptyName,
    DuplicateName { name: String },
    /// Coordinates already saved under another name.
    DuplicateCoordinates { existing: String },
    InvalidCoordinates { name: String },
    UnknownPoint { name: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::EmptyName => write!(f, "point name cannot be empty"),
            StoreError::DuplicateName { name } => write!(f, "\"{name}\" already exists"),
            StoreError::DuplicateCoordinates { existing } => write!(
                f,
                "a point with these coordinates already exists (\"{existing}\")"
            ),
            StoreError::InvalidCoordinates { name } => {
                write!(f, "coordinates of \"{name}\" must be finite")
            }
            StoreError::UnknownPoint { name } => write!(f, "no saved point named \"{name}\""),
        }
    }
}

impl std::error::Error for StoreError {}

/// Ordered collection of saved points.
#[derive(Clone, Debug, Default)]
pub struct PointStore {
    points: Vec<NamedPoint>,
}

#[inline]
fn coord_key(p: Point, decimals: usize) -> (String, String) {
    (
        format!("{:.*}", decimals, p.easting),
        format!("{:.*}", decimals, p.northing),
    )
}

impl PointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save `point` under `name` (trimmed).
    pub fn insert(&mut self, name: &str, point: Point) -> Result<&NamedPoint, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if self.get(name).is_some() {
            return Err(StoreError::DuplicateName {
                name: name.to_string(),
            });
        }
        if !point.is_finite() {
            return Err(StoreError::InvalidCoordinates {
                name: name.to_string(),
            });
        }
        if let Some(existing) = self.find_by_coords(point, COORD_MATCH_DECIMALS) {
            return Err(StoreError::DuplicateCoordinates {
                existing: existing.name.clone(),
            });
        }
        self.points.push(NamedPoint {
            name: name.to_string(),
            point,
        });
        Ok(&self.points[self.points.len() - 1])
    }

    pub fn get(&self, name: &str) -> Option<&NamedPoint> {
        let name = name.trim();
        self.points.iter().find(|p| p.name == name)
    }

    /// Like `get`, but a missing name is an error.
    pub fn resolve(&self, name: &str) -> Result<Point, StoreError> {
        self.get(name)
            .map(|p| p.point)
            .ok_or_else(|| StoreError::UnknownPoint {
                name: name.trim().to_string(),
            })
    }

    /// First saved point equal to `point` when both are rounded to `decimals`.
    pub fn find_by_coords(&self, point: Point, decimals: usize) -> Option<&NamedPoint> {
        let key = coord_key(point, decimals);
        self.points
            .iter()
            .find(|p| coord_key(p.point, decimals) == key)
    }

    pub fn remove(&mut self, name: &str) -> Result<NamedPoint, StoreError> {
        let name = name.trim();
        match self.points.iter().position(|p| p.name == name) {
            Some(idx) => Ok(self.points.remove(idx)),
            None => Err(StoreError::UnknownPoint {
                name: name.to_string(),
            }),
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Option<NamedPoint> {
        (index < self.points.len()).then(|| self.points.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PointStore {
        let mut s = PointStore::new();
        s.insert("A", Point::new(100.0, 200.0)).unwrap();
        s.insert(" B ", Point::new(150.0, 250.0)).unwrap();
        s
    }

    #[test]
    fn insert_trims_and_keeps_order() {
        let s = store();
        let names: Vec<_> = s.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(s.resolve("B").unwrap(), Point::new(150.0, 250.0));
    }

    #[test]
    fn rejects_empty_and_duplicate_names() {
        let mut s = store();
        assert_eq!(s.insert("   ", Point::new(1.0, 1.0)), Err(StoreError::EmptyName));
        assert!(matches!(
            s.insert("A", Point::new(1.0, 1.0)),
            Err(StoreError::DuplicateName { .. })
        ));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn rejects_coordinates_equal_at_three_decimals() {
        let mut s = store();
        let err = s.insert("C", Point::new(100.0004, 199.9996)).unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateCoordinates {
                existing: "A".into()
            }
        );
        assert!(s.insert("C", Point::new(100.001, 200.0)).is_ok());
    }

    #[test]
    fn rejects_non_finite() {
        let mut s = PointStore::new();
        assert!(matches!(
            s.insert("X", Point::new(f64::NAN, 0.0)),
            Err(StoreError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn find_by_coords_at_display_precision() {
        let s = store();
        let hit = s.find_by_coords(Point::new(150.004, 249.996), 2).unwrap();
        assert_eq!(hit.name, "B");
        assert!(s.find_by_coords(Point::new(150.004, 249.996), 3).is_none());
    }

    #[test]
    fn remove_by_name_and_index() {
        let mut s = store();
        assert_eq!(s.remove("A").unwrap().name, "A");
        assert!(matches!(s.remove("A"), Err(StoreError::UnknownPoint { .. })));
        assert!(s.remove_at(5).is_none());
        assert_eq!(s.remove_at(0).unwrap().name, "B");
        assert!(s.is_empty());
        assert!(s.resolve("B").is_err());
    }
}
