//! Great-circle distance between check-in points and hub centers.
//!
//! Haversine over a spherical earth; no datum correction is needed at
//! hub-radius precision.

use crate::entities::Hub;
use crate::value_objects::{Coordinates, GeofenceCheck};

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance in meters between two coordinate pairs.
pub fn distance_meters(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Compares a check-in point against a hub's admission radius.
pub fn check_within_radius(point: Coordinates, hub: &Hub) -> GeofenceCheck {
    let distance = distance_meters(point, hub.center());
    GeofenceCheck {
        within: distance <= hub.radius_meters,
        distance_meters: distance,
        allowed_radius_meters: hub.radius_meters,
    }
}
