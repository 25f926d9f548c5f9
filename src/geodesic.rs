//! Distance between two coordinates on the WGS-84 ellipsoid.

use geo::{GeodesicDistance, Point};

pub const FEET_PER_METRE: f64 = 1.0 / 0.3048;

/// Geodesic distance in metres between two `(latitude, longitude)` pairs.
pub fn distance_metres(from: (f64, f64), to: (f64, f64)) -> f64 {
    // geo points are (x, y), i.e. longitude first
    let from = Point::new(from.1, from.0);
    let to = Point::new(to.1, to.0);

    from.geodesic_distance(&to)
}

pub fn distance_feet(from: (f64, f64), to: (f64, f64)) -> f64 {
    distance_metres(from, to) * FEET_PER_METRE
}
