//! # Route Horizon
//!
//! Route-relative spatial indexing and proximity alerting for turn-by-turn
//! navigation.
//!
//! This library provides:
//! - A spatial index over a route polyline answering "where on the route is
//!   this coordinate" and "how far along the route is that hazard"
//! - A relevance scanner applying per-hazard directional and alert-distance
//!   rules
//! - A stateful horizon engine emitting debounced lifecycle events
//!   (approaching, passed, entered/exited zone)
//! - A serial background monitor for feeding the engine from an
//!   asynchronous location stream
//!
//! ## Quick Start
//!
//! ```rust
//! use routehorizon::{
//!     CameraDirection, GeoPoint, HorizonConfig, HorizonEngine, LocationFix, Route, SpeedCamera,
//!     SpeedCameraType,
//! };
//!
//! let geometry: Vec<GeoPoint> = (0..20)
//!     .map(|i| GeoPoint::new(25.195 + i as f64 * 0.002, 55.274))
//!     .collect();
//!
//! let route = Route {
//!     speed_cameras: vec![SpeedCamera {
//!         id: "camera-1".to_string(),
//!         speed_limit_kmh: 100.0,
//!         camera_type: SpeedCameraType::Fixed,
//!         direction: CameraDirection::Both,
//!         capture_range_m: 100.0,
//!         location: geometry[12],
//!     }],
//!     geometry,
//!     incidents: vec![],
//!     speed_zones: vec![],
//! };
//!
//! let mut engine = HorizonEngine::new(HorizonConfig::default());
//! engine.start_monitoring(&route);
//!
//! // Fixes come from the positioning collaborator, roughly 1 Hz.
//! let fix = LocationFix::new(GeoPoint::new(25.213, 55.274), 0.0);
//! for event in engine.process_fix(&fix) {
//!     println!("{event:?}");
//! }
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{HorizonError, Result};

// Geographic utilities (distance, bearing, interpolation)
pub mod geo_utils;

// WGS84 constants and ECEF transforms
pub mod geodesy;

// Spatial index over route geometry
pub mod index;
pub use index::{ExactRoutePosition, ProjectionMode, RouteGeometryIndex};

// Hazard feature model and extraction
pub mod features;
pub use features::{
    CameraDirection, FeatureKind, HorizonFeature, SpeedCamera, SpeedCameraType, SpeedZone,
    TrafficIncident, TrafficIncidentSeverity, TrafficIncidentType, extract_features,
};

// Relevance scanning
pub mod scanner;
pub use scanner::{Direction, FeatureDistance, HorizonScanner, ScanResult};

// Stateful orchestration and background monitoring
pub mod engine;
pub use engine::{HorizonEngine, HorizonEvent, HorizonMonitor, HorizonObserver, NoopObserver};

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate in degrees.
///
/// # Example
/// ```
/// use routehorizon::GeoPoint;
/// let point = GeoPoint::new(25.2048, 55.2708); // Dubai
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that the coordinate is finite and within valid ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// One location sample from the positioning collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub coordinate: GeoPoint,
    /// Course over ground in degrees from north. Negative or non-finite
    /// values mean the course is unknown.
    pub bearing: f64,
}

impl LocationFix {
    pub fn new(coordinate: GeoPoint, bearing: f64) -> Self {
        Self {
            coordinate,
            bearing,
        }
    }

    pub fn has_valid_bearing(&self) -> bool {
        self.bearing.is_finite() && self.bearing >= 0.0
    }
}

/// The active route: its polyline plus the externally supplied hazards.
///
/// Rebuilt wholesale whenever the route changes; the engine never mutates
/// it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Ordered route polyline.
    pub geometry: Vec<GeoPoint>,
    pub speed_cameras: Vec<SpeedCamera>,
    pub incidents: Vec<TrafficIncident>,
    pub speed_zones: Vec<SpeedZone>,
}

// ============================================================================
// Configuration
// ============================================================================

/// Alert distances for one feature type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertDistanceConfig {
    /// Distance in meters at which the first alert fires. `None` derives
    /// the distance from the feature itself (camera type, incident
    /// severity).
    pub initial_alert_distance_m: Option<f64>,
    /// Distance in meters of the final, most urgent alert stage.
    pub final_alert_distance_m: f64,
    /// Minimum seconds between repeated voice alerts for one feature.
    pub repeat_interval_s: f64,
}

/// Configuration for a monitoring session, immutable once the monitor is
/// constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonConfig {
    /// Forward-looking range in meters within which hazards are considered.
    pub scan_range_m: f64,
    /// Point-to-segment projection strategy.
    pub projection_mode: ProjectionMode,
    pub speed_camera: AlertDistanceConfig,
    pub traffic_incident: AlertDistanceConfig,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            scan_range_m: 1_500.0,
            projection_mode: ProjectionMode::default(),
            speed_camera: AlertDistanceConfig {
                initial_alert_distance_m: Some(1_000.0),
                final_alert_distance_m: 200.0,
                repeat_interval_s: 30.0,
            },
            traffic_incident: AlertDistanceConfig {
                initial_alert_distance_m: Some(1_000.0),
                final_alert_distance_m: 500.0,
                repeat_interval_s: 45.0,
            },
        }
    }
}

impl HorizonConfig {
    /// Check the configuration can drive a monitoring session.
    pub fn validate(&self) -> Result<()> {
        if !(self.scan_range_m.is_finite() && self.scan_range_m > 0.0) {
            return Err(HorizonError::InvalidConfig {
                reason: format!("scan range must be positive, got {}", self.scan_range_m),
            });
        }
        for (name, alert) in [
            ("speed camera", &self.speed_camera),
            ("traffic incident", &self.traffic_incident),
        ] {
            if let Some(initial) = alert.initial_alert_distance_m
                && !(initial.is_finite() && initial > 0.0)
            {
                return Err(HorizonError::InvalidConfig {
                    reason: format!("{name} initial alert distance must be positive"),
                });
            }
            if !(alert.final_alert_distance_m.is_finite() && alert.final_alert_distance_m > 0.0) {
                return Err(HorizonError::InvalidConfig {
                    reason: format!("{name} final alert distance must be positive"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(HorizonConfig::default().validate().is_ok());
    }

    #[test]
    fn negative_scan_range_is_rejected() {
        let config = HorizonConfig {
            scan_range_m: -1.0,
            ..HorizonConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(HorizonError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn geopoint_validity() {
        assert!(GeoPoint::new(25.0, 55.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn bearing_validity() {
        assert!(LocationFix::new(GeoPoint::new(0.0, 0.0), 90.0).has_valid_bearing());
        assert!(!LocationFix::new(GeoPoint::new(0.0, 0.0), -1.0).has_valid_bearing());
        assert!(!LocationFix::new(GeoPoint::new(0.0, 0.0), f64::NAN).has_valid_bearing());
    }
}
