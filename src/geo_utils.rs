//! Geographic utilities (distance, bearing, interpolation).
//!
//! Great-circle math on the mean-radius sphere. The ellipsoidal transforms
//! used by the accurate projection mode live in [`crate::geodesy`].

use crate::GeoPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Approximate meters per degree of latitude, used to convert metric
/// thresholds into degree-space boxes for coarse filtering.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Calculate the haversine (great-circle) distance between two points in
/// meters.
pub fn haversine_distance(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Initial great-circle bearing from one point towards another, in degrees
/// normalized to `[0, 360)`.
pub fn initial_bearing(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Destination point starting at `origin` and traveling `distance_m` meters
/// along the given initial bearing (degrees).
pub fn destination(origin: &GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    let bearing = bearing_deg.to_radians();
    let angular = distance_m / EARTH_RADIUS_M;
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    GeoPoint::new(lat2.to_degrees(), lon2.to_degrees())
}

/// Linear interpolation between two coordinates at parameter `t` in `[0, 1]`.
///
/// Adequate for the short segments of a route polyline; not a geodesic
/// midpoint.
pub fn interpolate(start: &GeoPoint, end: &GeoPoint, t: f64) -> GeoPoint {
    GeoPoint::new(
        start.latitude + (end.latitude - start.latitude) * t,
        start.longitude + (end.longitude - start.longitude) * t,
    )
}
