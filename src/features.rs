//! Hazard feature model and extraction.
//!
//! Features are point hazards tracked for proximity alerts: speed cameras,
//! speed zones, and traffic incidents. Identity is the string id; equality
//! is structural. Extraction is a purely structural mapping from the route's
//! hazard collections into the flat feature list the scanner consumes; no
//! relevance or distance logic lives here.

use serde::{Deserialize, Serialize};

use crate::{GeoPoint, Route};

/// Which traffic direction a speed camera captures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraDirection {
    /// Captures traffic traveling towards the camera along the route.
    Forward,
    /// Captures traffic traveling away from the camera.
    Backward,
    /// Captures both directions.
    Both,
    /// Monitors one specific road bearing, in degrees.
    Specific { bearing: f64 },
}

/// Speed camera installation type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpeedCameraType {
    Fixed,
    Mobile,
    RedLight,
    /// Average-speed enforcement over a zone of the given length in meters.
    AverageSpeed { zone_length_m: f64 },
    /// Combined installation (e.g. red light + speed).
    Combined(Vec<SpeedCameraType>),
}

/// A speed camera hazard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedCamera {
    pub id: String,
    /// Enforced speed limit in km/h.
    pub speed_limit_kmh: f64,
    pub camera_type: SpeedCameraType,
    pub direction: CameraDirection,
    /// Range within which the camera can capture, in meters.
    pub capture_range_m: f64,
    pub location: GeoPoint,
}

impl SpeedCamera {
    /// Fallback alert distance derived from the installation type, in
    /// meters. Used when the session configuration carries no override.
    pub fn alert_distance_m(&self) -> f64 {
        match &self.camera_type {
            // Average-speed zones need the earliest warning.
            SpeedCameraType::AverageSpeed { .. } => 2_000.0,
            SpeedCameraType::Combined(_) => 1_500.0,
            SpeedCameraType::RedLight => 500.0,
            SpeedCameraType::Fixed | SpeedCameraType::Mobile => 1_000.0,
        }
    }
}

/// A speed-limited zone entered along the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedZone {
    pub id: String,
    pub location: GeoPoint,
    /// Zone speed limit in km/h.
    pub limit_kmh: f64,
}

/// Traffic incident category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrafficIncidentType {
    Accident,
    Congestion,
    Construction,
    RoadClosure,
    RoadHazard,
    WeatherCondition,
    Other,
}

/// Impact level of a traffic incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficIncidentSeverity {
    Low,
    Moderate,
    Major,
    Severe,
}

impl TrafficIncidentSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficIncidentSeverity::Low => "Minor",
            TrafficIncidentSeverity::Moderate => "Moderate",
            TrafficIncidentSeverity::Major => "Major",
            TrafficIncidentSeverity::Severe => "Severe",
        }
    }
}

/// A traffic incident hazard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficIncident {
    pub id: String,
    pub incident_type: TrafficIncidentType,
    pub severity: TrafficIncidentSeverity,
    pub location: GeoPoint,
    pub description: String,
    /// Unix timestamp (seconds) when the incident starts applying.
    pub start_time: i64,
    /// Unix timestamp (seconds) when it stops applying; `None` = open-ended.
    pub end_time: Option<i64>,
    /// Affected stretch length in meters, when known.
    pub length_m: Option<f64>,
    /// Expected delay in seconds, when known.
    pub delay_seconds: Option<f64>,
}

impl TrafficIncident {
    /// Whether the incident applies at the given unix timestamp.
    pub fn is_active(&self, now: i64) -> bool {
        now >= self.start_time && self.end_time.is_none_or(|end| now <= end)
    }

    /// Fallback alert distance scaled by severity, in meters. Used when the
    /// session configuration carries no override.
    pub fn alert_distance_m(&self) -> f64 {
        match self.severity {
            TrafficIncidentSeverity::Severe => 3_000.0,
            TrafficIncidentSeverity::Major => 2_000.0,
            TrafficIncidentSeverity::Moderate => 1_500.0,
            TrafficIncidentSeverity::Low => 1_000.0,
        }
    }
}

/// The hazard variant carried by a [`HorizonFeature`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureKind {
    SpeedCamera(SpeedCamera),
    SpeedZone(SpeedZone),
    TrafficIncident(TrafficIncident),
}

/// An identified hazard on the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonFeature {
    pub id: String,
    pub kind: FeatureKind,
    pub coordinate: GeoPoint,
}

impl HorizonFeature {
    pub fn from_camera(camera: SpeedCamera) -> Self {
        Self {
            id: camera.id.clone(),
            coordinate: camera.location,
            kind: FeatureKind::SpeedCamera(camera),
        }
    }

    pub fn from_zone(zone: SpeedZone) -> Self {
        Self {
            id: zone.id.clone(),
            coordinate: zone.location,
            kind: FeatureKind::SpeedZone(zone),
        }
    }

    pub fn from_incident(incident: TrafficIncident) -> Self {
        Self {
            id: incident.id.clone(),
            coordinate: incident.location,
            kind: FeatureKind::TrafficIncident(incident),
        }
    }
}

/// Build the flat feature list for a route from its hazard collections.
///
/// Incidents outside their activity window at `now` (unix seconds) are
/// skipped; everything else is mapped structurally.
pub fn extract_features(route: &Route, now: i64) -> Vec<HorizonFeature> {
    let mut features = Vec::with_capacity(
        route.incidents.len() + route.speed_cameras.len() + route.speed_zones.len(),
    );

    features.extend(
        route
            .incidents
            .iter()
            .filter(|incident| incident.is_active(now))
            .cloned()
            .map(HorizonFeature::from_incident),
    );
    features.extend(
        route
            .speed_cameras
            .iter()
            .cloned()
            .map(HorizonFeature::from_camera),
    );
    features.extend(
        route
            .speed_zones
            .iter()
            .cloned()
            .map(HorizonFeature::from_zone),
    );

    features
}
