//! Geometric relevance engine for horizon features.
//!
//! The scanner is stateless per call: it owns the route geometry index and
//! read-only scan/alert configuration, but keeps no per-feature memory. The
//! caller supplies the features it currently tracks; the scanner classifies
//! every feature as newly detected, still approaching, or exited, and the
//! caller owns what happens next.

mod direction;
mod result;

use std::collections::HashSet;

use log::debug;

use crate::features::{CameraDirection, FeatureKind, HorizonFeature, SpeedCamera};
use crate::geo_utils::haversine_distance;
use crate::index::RouteGeometryIndex;
use crate::{GeoPoint, HorizonConfig, LocationFix};

pub use direction::Direction;
pub use result::{FeatureDistance, FeatureRelevance, ScanResult};

/// Along-route separation in meters below which a feature behind the
/// traveler counts as passed.
pub const CLOSE_PROXIMITY_THRESHOLD_M: f64 = 50.0;

/// Alert distance for speed zones, which carry no per-feature or configured
/// alert distance of their own.
pub const DEFAULT_SPEED_ZONE_ALERT_DISTANCE_M: f64 = 500.0;

/// Stateless-per-call relevance engine over the active route.
#[derive(Debug)]
pub struct HorizonScanner {
    index: RouteGeometryIndex,
    config: HorizonConfig,
}

impl HorizonScanner {
    pub fn new(config: HorizonConfig) -> Self {
        Self {
            index: RouteGeometryIndex::new(&[], config.projection_mode),
            config,
        }
    }

    /// Install new route geometry, rebuilding the index wholesale. An empty
    /// slice clears it.
    pub fn update_route_geometry(&mut self, geometry: &[GeoPoint]) {
        self.index.reindex(geometry);
    }

    /// Whether route geometry is currently installed.
    pub fn has_route_geometry(&self) -> bool {
        !self.index.is_empty()
    }

    /// Classify features against the current fix.
    ///
    /// `active` is the set of features the caller is already tracking; they
    /// are re-measured and classified as exited when passed or out of scan
    /// range. `candidates` is the route's full feature list; relevant
    /// candidates within their alert distance are returned as approaching,
    /// and those not yet tracked also appear as detected.
    pub fn scan(
        &mut self,
        candidates: &[HorizonFeature],
        active: &[HorizonFeature],
        fix: &LocationFix,
    ) -> ScanResult {
        let mut scan_result = ScanResult::default();

        let active_ids: HashSet<&str> = active.iter().map(|f| f.id.as_str()).collect();
        let mut exited_ids: HashSet<&str> = HashSet::new();

        for feature in active {
            let distance = self.route_distance(&fix.coordinate, &feature.coordinate);

            if self.is_feature_passed(&fix.coordinate, &feature.coordinate) {
                debug!("feature {} passed", feature.id);
                exited_ids.insert(feature.id.as_str());
                scan_result.exited.push(feature.clone());
                continue;
            }
            if distance > self.config.scan_range_m {
                debug!("feature {} left scan range ({distance:.0} m)", feature.id);
                exited_ids.insert(feature.id.as_str());
                scan_result.exited.push(feature.clone());
            }
        }

        for feature in candidates {
            // A feature exited this scan may not re-enter until a later one.
            if exited_ids.contains(feature.id.as_str()) {
                continue;
            }

            let relevance = self.feature_relevance(feature, fix);
            let Some(distance) = relevance.distance_m() else {
                continue;
            };

            let alert_distance = self.alert_distance(feature);
            if distance <= alert_distance {
                if !active_ids.contains(feature.id.as_str()) {
                    debug!(
                        "feature {} entered alert range at {distance:.0} m",
                        feature.id
                    );
                    scan_result.detected.push(feature.clone());
                }
                scan_result.approaching.push(FeatureDistance {
                    feature: feature.clone(),
                    distance_m: distance,
                });
            }
        }

        scan_result
    }

    /// Along-route distance when geometry is installed, direct haversine
    /// distance otherwise.
    fn route_distance(&mut self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        if self.index.is_empty() {
            return haversine_distance(from, to);
        }
        self.index.distance_along_route(from, to)
    }

    /// A feature is passed when its projection lies behind the traveler's
    /// and the along-route separation is still small; far-behind features
    /// are handled by the scan-range check instead.
    fn is_feature_passed(&mut self, user: &GeoPoint, feature: &GeoPoint) -> bool {
        let user_position = self.index.find_exact_position(user);
        let feature_position = self.index.find_exact_position(feature);
        if !user_position.is_valid() || !feature_position.is_valid() {
            return false;
        }

        let separation = (user_position.distance_from_start
            - feature_position.distance_from_start)
            .abs();
        feature_position.is_before(&user_position) && separation < CLOSE_PROXIMITY_THRESHOLD_M
    }

    fn alert_distance(&self, feature: &HorizonFeature) -> f64 {
        match &feature.kind {
            FeatureKind::SpeedCamera(camera) => self
                .config
                .speed_camera
                .initial_alert_distance_m
                .unwrap_or_else(|| camera.alert_distance_m()),
            FeatureKind::TrafficIncident(incident) => self
                .config
                .traffic_incident
                .initial_alert_distance_m
                .unwrap_or_else(|| incident.alert_distance_m()),
            FeatureKind::SpeedZone(_) => DEFAULT_SPEED_ZONE_ALERT_DISTANCE_M,
        }
    }

    fn feature_relevance(&mut self, feature: &HorizonFeature, fix: &LocationFix) -> FeatureRelevance {
        match &feature.kind {
            FeatureKind::SpeedCamera(camera) => {
                let distance = self.route_distance(&fix.coordinate, &camera.location);
                self.camera_relevance(camera, fix, distance)
            }
            // Zones and incidents are omnidirectional: only distance matters.
            FeatureKind::SpeedZone(zone) => FeatureRelevance::Relevant {
                distance_m: self.route_distance(&fix.coordinate, &zone.location),
            },
            FeatureKind::TrafficIncident(incident) => FeatureRelevance::Relevant {
                distance_m: self.route_distance(&fix.coordinate, &incident.location),
            },
        }
    }

    fn camera_relevance(
        &mut self,
        camera: &SpeedCamera,
        fix: &LocationFix,
        distance: f64,
    ) -> FeatureRelevance {
        let relevant = match camera.direction {
            CameraDirection::Forward => self.is_moving_towards(fix, &camera.location),
            CameraDirection::Backward => !self.is_moving_towards(fix, &camera.location),
            CameraDirection::Both => true,
            CameraDirection::Specific { bearing } => fix.has_valid_bearing()
                && Direction::from_degrees(bearing)
                    .is_some_and(|direction| direction.matches(fix.bearing)),
        };

        if relevant {
            FeatureRelevance::Relevant {
                distance_m: distance,
            }
        } else {
            debug!("camera {} not relevant for current course", camera.id);
            FeatureRelevance::NotRelevant
        }
    }

    /// Directional test for one-way cameras.
    ///
    /// A target already behind the traveler on the route is never "moving
    /// towards". Otherwise the cardinal pointing at the target (latitude
    /// ordering, or longitude ordering when the east-west delta dominates)
    /// must match the traveler's bearing within the cardinal tolerance. An
    /// unknown bearing leaves only the route-order check.
    fn is_moving_towards(&mut self, fix: &LocationFix, target: &GeoPoint) -> bool {
        let user_position = self.index.find_exact_position(&fix.coordinate);
        let target_position = self.index.find_exact_position(target);

        if user_position.is_valid()
            && target_position.is_valid()
            && target_position.is_before(&user_position)
        {
            return false;
        }

        if !fix.has_valid_bearing() {
            return true;
        }

        cardinal_towards(&fix.coordinate, target).matches(fix.bearing)
    }
}

/// The cardinal direction pointing from `from` towards `to`.
fn cardinal_towards(from: &GeoPoint, to: &GeoPoint) -> Direction {
    let delta_lat = to.latitude - from.latitude;
    let delta_lon = to.longitude - from.longitude;

    if delta_lat.abs() >= delta_lon.abs() {
        if delta_lat >= 0.0 {
            Direction::North
        } else {
            Direction::South
        }
    } else if delta_lon >= 0.0 {
        Direction::East
    } else {
        Direction::West
    }
}
