//! Closed traverse computed leg by leg with the Polar method.
//!
//! Purpose
//! - Show the intended call pattern: resolve named points from a `PointStore`,
//!   run `polar_toward` per leg, then close back on the start with `join`.
//! - Print each station and the linear misclosure of the loop.

use polarjoin::points::PointStore;
use polarjoin::survey::{from_dms, join, polar_toward, Direction, Point};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = PointStore::new();
    store.insert("STN1", Point::new(5000.0, 10000.0))?;

    // (distance m, azimuth D M S)
    let legs = [
        (120.455, (45.0, 12.0, 30.0)),
        (98.210, (134.0, 50.0, 10.0)),
        (131.870, (225.0, 5.0, 45.0)),
        (93.655, (318.0, 40.0, 20.0)),
    ];

    let start = store.resolve("STN1")?;
    let mut here = start;
    for (k, (distance, (d, m, s))) in legs.iter().enumerate() {
        let az = from_dms(*d, *m, *s)?;
        let leg = polar_toward(here, *distance, Direction::Azimuth(az))?;
        here = leg.end_point();
        let name = format!("STN{}", k + 2);
        // A leg that lands on an already saved station is reported, not stored twice.
        match store.insert(&name, here) {
            Ok(p) => println!("{:<5} E={:>10.3} N={:>10.3}", p.name, here.easting, here.northing),
            Err(e) => println!("{name:<5} not saved: {e}"),
        }
    }

    let closure = join(here, start)?;
    println!(
        "misclosure={:.4} m azimuth={:.6}",
        closure.distance, closure.azimuth
    );
    Ok(())
}
