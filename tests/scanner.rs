//! Integration tests for the horizon scanner.

use routehorizon::geo_utils::destination;
use routehorizon::scanner::{
    CLOSE_PROXIMITY_THRESHOLD_M, DEFAULT_SPEED_ZONE_ALERT_DISTANCE_M, HorizonScanner,
};
use routehorizon::{
    CameraDirection, GeoPoint, HorizonConfig, HorizonFeature, LocationFix, SpeedCamera,
    SpeedCameraType, SpeedZone, TrafficIncident, TrafficIncidentSeverity, TrafficIncidentType,
};

const BASE: GeoPoint = GeoPoint {
    latitude: 25.195197,
    longitude: 55.274376,
};

/// Straight northbound route, one point every 100 m, 2 km long.
fn route_geometry() -> Vec<GeoPoint> {
    (0..21)
        .map(|i| destination(&BASE, 0.0, i as f64 * 100.0))
        .collect()
}

fn camera_at(mark_m: f64, direction: CameraDirection) -> SpeedCamera {
    SpeedCamera {
        id: "camera-1".to_string(),
        speed_limit_kmh: 100.0,
        camera_type: SpeedCameraType::Fixed,
        direction,
        capture_range_m: 100.0,
        location: destination(&BASE, 0.0, mark_m),
    }
}

fn incident_at(mark_m: f64, severity: TrafficIncidentSeverity) -> TrafficIncident {
    TrafficIncident {
        id: "incident-1".to_string(),
        incident_type: TrafficIncidentType::Accident,
        severity,
        location: destination(&BASE, 0.0, mark_m),
        description: "collision".to_string(),
        start_time: 0,
        end_time: None,
        length_m: None,
        delay_seconds: None,
    }
}

fn scanner() -> HorizonScanner {
    let mut scanner = HorizonScanner::new(HorizonConfig::default());
    scanner.update_route_geometry(&route_geometry());
    scanner
}

fn fix_at(mark_m: f64, bearing: f64) -> LocationFix {
    LocationFix::new(destination(&BASE, 0.0, mark_m), bearing)
}

#[test]
fn forward_camera_relevant_when_heading_towards_it() {
    let mut scanner = scanner();
    let features = vec![HorizonFeature::from_camera(camera_at(
        1_200.0,
        CameraDirection::Forward,
    ))];

    let result = scanner.scan(&features, &[], &fix_at(900.0, 0.0));

    assert_eq!(result.detected.len(), 1);
    assert_eq!(result.approaching.len(), 1);
    let distance = result.approaching[0].distance_m;
    assert!((distance - 300.0).abs() < 2.0, "got {distance}");
}

#[test]
fn forward_camera_not_relevant_when_heading_away() {
    let mut scanner = scanner();
    let features = vec![HorizonFeature::from_camera(camera_at(
        1_200.0,
        CameraDirection::Forward,
    ))];

    let result = scanner.scan(&features, &[], &fix_at(900.0, 180.0));

    assert!(result.detected.is_empty());
    assert!(result.approaching.is_empty());
}

#[test]
fn forward_camera_behind_traveler_is_not_relevant() {
    let mut scanner = scanner();
    let features = vec![HorizonFeature::from_camera(camera_at(
        400.0,
        CameraDirection::Forward,
    ))];

    // 700 m past the camera, still heading north.
    let result = scanner.scan(&features, &[], &fix_at(1_100.0, 0.0));

    assert!(result.detected.is_empty());
}

#[test]
fn backward_camera_relevant_when_heading_away() {
    let mut scanner = scanner();
    let features = vec![HorizonFeature::from_camera(camera_at(
        1_200.0,
        CameraDirection::Backward,
    ))];

    assert!(
        scanner
            .scan(&features, &[], &fix_at(900.0, 0.0))
            .detected
            .is_empty()
    );
    assert_eq!(
        scanner
            .scan(&features, &[], &fix_at(900.0, 180.0))
            .detected
            .len(),
        1
    );
}

#[test]
fn bidirectional_camera_always_relevant() {
    let mut scanner = scanner();
    let features = vec![HorizonFeature::from_camera(camera_at(
        1_200.0,
        CameraDirection::Both,
    ))];

    assert_eq!(
        scanner
            .scan(&features, &[], &fix_at(900.0, 180.0))
            .detected
            .len(),
        1
    );
}

#[test]
fn specific_bearing_camera_matches_with_tolerance() {
    let mut scanner = scanner();
    let features = vec![HorizonFeature::from_camera(camera_at(
        1_200.0,
        CameraDirection::Specific { bearing: 0.0 },
    ))];

    // Within 45° of north.
    assert_eq!(
        scanner
            .scan(&features, &[], &fix_at(900.0, 30.0))
            .detected
            .len(),
        1
    );
    // Way off.
    assert!(
        scanner
            .scan(&features, &[], &fix_at(900.0, 120.0))
            .detected
            .is_empty()
    );
}

#[test]
fn feature_outside_alert_distance_is_silent() {
    let mut scanner = scanner();
    let features = vec![HorizonFeature::from_camera(camera_at(
        1_200.0,
        CameraDirection::Both,
    ))];

    // 1.2 km away with a 1 km configured alert distance.
    let result = scanner.scan(&features, &[], &fix_at(0.0, 0.0));
    assert!(result.detected.is_empty());
    assert!(result.approaching.is_empty());
    assert!(result.exited.is_empty());
}

#[test]
fn active_feature_is_not_redetected() {
    let mut scanner = scanner();
    let feature = HorizonFeature::from_camera(camera_at(1_200.0, CameraDirection::Both));
    let features = vec![feature.clone()];

    let result = scanner.scan(&features, std::slice::from_ref(&feature), &fix_at(900.0, 0.0));

    assert!(result.detected.is_empty());
    assert_eq!(result.approaching.len(), 1);
}

#[test]
fn passed_feature_exits_within_close_proximity() {
    let mut scanner = scanner();
    let feature = HorizonFeature::from_camera(camera_at(1_200.0, CameraDirection::Both));
    let features = vec![feature.clone()];

    // 40 m past the camera: behind the traveler and within the close
    // proximity threshold.
    let past = 1_200.0 + CLOSE_PROXIMITY_THRESHOLD_M - 10.0;
    let result = scanner.scan(&features, std::slice::from_ref(&feature), &fix_at(past, 0.0));

    assert_eq!(result.exited.len(), 1);
    assert_eq!(result.exited[0].id, feature.id);
    // The exit must not be accompanied by a re-detection.
    assert!(result.detected.is_empty());
    assert!(result.approaching.is_empty());
}

#[test]
fn out_of_scan_range_feature_exits() {
    let mut scanner = scanner();
    let feature = HorizonFeature::from_camera(camera_at(1_900.0, CameraDirection::Both));
    let features = vec![feature.clone()];

    // Traveler far behind: 1.9 km away exceeds the 1.5 km scan range.
    let result = scanner.scan(&features, std::slice::from_ref(&feature), &fix_at(0.0, 0.0));

    assert_eq!(result.exited.len(), 1);
}

#[test]
fn speed_zone_uses_default_alert_distance() {
    let mut scanner = scanner();
    let zone = SpeedZone {
        id: "zone-1".to_string(),
        location: destination(&BASE, 0.0, 800.0),
        limit_kmh: 60.0,
    };
    let features = vec![HorizonFeature::from_zone(zone)];

    // 600 m out: beyond the 500 m default.
    let silent = scanner.scan(&features, &[], &fix_at(200.0, 0.0));
    assert!(silent.detected.is_empty());

    // Well inside it, regardless of bearing.
    let entered = scanner.scan(&features, &[], &fix_at(360.0, 180.0));
    assert_eq!(entered.detected.len(), 1);
    let distance = entered.approaching[0].distance_m;
    assert!(
        distance <= DEFAULT_SPEED_ZONE_ALERT_DISTANCE_M,
        "got {distance}"
    );
}

#[test]
fn incident_severity_drives_alert_distance_without_override() {
    let mut config = HorizonConfig {
        scan_range_m: 4_000.0,
        ..HorizonConfig::default()
    };
    config.traffic_incident.initial_alert_distance_m = None;

    let mut scanner = HorizonScanner::new(config);
    scanner.update_route_geometry(&route_geometry());

    let moderate = vec![HorizonFeature::from_incident(incident_at(
        1_800.0,
        TrafficIncidentSeverity::Moderate,
    ))];
    let low = vec![HorizonFeature::from_incident(incident_at(
        1_800.0,
        TrafficIncidentSeverity::Low,
    ))];

    // 1.4 km from the incident: inside the moderate fallback (1.5 km) but
    // outside the low one (1 km).
    let fix = fix_at(400.0, 0.0);
    assert_eq!(scanner.scan(&moderate, &[], &fix).detected.len(), 1);
    assert!(scanner.scan(&low, &[], &fix).detected.is_empty());
}

#[test]
fn without_geometry_direct_distance_is_used() {
    let mut scanner = HorizonScanner::new(HorizonConfig::default());
    assert!(!scanner.has_route_geometry());

    let features = vec![HorizonFeature::from_camera(camera_at(
        400.0,
        CameraDirection::Both,
    ))];
    let result = scanner.scan(&features, &[], &fix_at(0.0, 0.0));

    assert_eq!(result.detected.len(), 1);
    let distance = result.approaching[0].distance_m;
    assert!((distance - 400.0).abs() < 2.0, "got {distance}");
}
