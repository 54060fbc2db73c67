//! WGS84 ellipsoid constants and earth-centered-earth-fixed transforms.
//!
//! The accurate projection mode works in ECEF space: both segment endpoints
//! and the query point are lifted onto the ellipsoid, the perpendicular foot
//! point is found on the 3D chord, and the result is mapped back to
//! geographic coordinates.

use crate::GeoPoint;

/// WGS84 semi-major axis in meters.
pub const SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;

/// WGS84 flattening.
pub const FLATTENING: f64 = 1.0 / 298.257_223_563;

/// WGS84 semi-minor axis in meters.
pub const SEMI_MINOR_AXIS_M: f64 = SEMI_MAJOR_AXIS_M * (1.0 - FLATTENING);

const A_SQ: f64 = SEMI_MAJOR_AXIS_M * SEMI_MAJOR_AXIS_M;
const B_SQ: f64 = SEMI_MINOR_AXIS_M * SEMI_MINOR_AXIS_M;

/// First eccentricity squared.
pub const ECCENTRICITY_SQ: f64 = (A_SQ - B_SQ) / A_SQ;

/// Second eccentricity squared.
pub const SECOND_ECCENTRICITY_SQ: f64 = (A_SQ - B_SQ) / B_SQ;

/// Convert a geographic coordinate (at zero altitude) to ECEF meters.
pub fn geographic_to_ecef(point: &GeoPoint) -> [f64; 3] {
    let lat = point.latitude.to_radians();
    let lon = point.longitude.to_radians();

    // Prime vertical radius of curvature at this latitude.
    let normal_radius = SEMI_MAJOR_AXIS_M / (1.0 - ECCENTRICITY_SQ * lat.sin().powi(2)).sqrt();

    let x = normal_radius * lat.cos() * lon.cos();
    let y = normal_radius * lat.cos() * lon.sin();
    let z = (B_SQ / A_SQ) * normal_radius * lat.sin();

    [x, y, z]
}

/// Convert an ECEF point back to a geographic coordinate using Bowring's
/// closed-form approximation.
pub fn ecef_to_geographic(ecef: [f64; 3]) -> GeoPoint {
    let [x, y, z] = ecef;

    let horizontal = (x * x + y * y).sqrt();
    let theta = ((z * SEMI_MAJOR_AXIS_M) / (horizontal * SEMI_MINOR_AXIS_M)).atan();

    let numerator = z + SECOND_ECCENTRICITY_SQ * SEMI_MINOR_AXIS_M * theta.sin().powi(3);
    let denominator = horizontal - ECCENTRICITY_SQ * SEMI_MAJOR_AXIS_M * theta.cos().powi(3);

    let latitude = (numerator / denominator).atan().to_degrees();
    let longitude = y.atan2(x).to_degrees();

    GeoPoint::new(latitude, longitude)
}
