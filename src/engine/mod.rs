//! Stateful orchestration of horizon scanning.
//!
//! [`HorizonEngine`] owns the active-feature table and turns raw scan
//! classifications into discrete lifecycle events with hysteresis: one alert
//! on entering alert range, further alerts only after a significant distance
//! change, exactly one exit event. The engine is a plain single-writer
//! struct; [`HorizonMonitor`] wraps it in a serial background task so scans
//! never overlap.

mod monitor;
mod observer;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::features::{FeatureKind, HorizonFeature, SpeedCamera, TrafficIncident, extract_features};
use crate::scanner::HorizonScanner;
use crate::{HorizonConfig, LocationFix, Route};

pub use monitor::HorizonMonitor;
pub use observer::{HorizonObserver, NoopObserver};

/// Minimum change in meters (rounded to one decimal) before an
/// already-alerted feature's distance update is re-emitted.
pub const SIGNIFICANT_DISTANCE_CHANGE_M: f64 = 10.0;

/// A discrete alert raised while monitoring a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HorizonEvent {
    ApproachingSpeedCamera {
        camera: SpeedCamera,
        distance_m: f64,
    },
    PassedSpeedCamera {
        camera: SpeedCamera,
    },
    EnteredSpeedZone {
        limit_kmh: f64,
    },
    ExitedSpeedZone,
    ApproachingTrafficIncident {
        incident: TrafficIncident,
        distance_m: f64,
    },
    PassedTrafficIncident {
        incident: TrafficIncident,
    },
}

/// Per-feature tracking state, owned exclusively by the engine.
#[derive(Debug)]
struct ActiveFeatureState {
    feature: HorizonFeature,
    first_detected_at: Instant,
    /// Distance at the last emitted alert; the debounce baseline.
    last_reported_distance_m: f64,
    has_alerted: bool,
}

/// The stateful horizon orchestrator.
///
/// All methods take `&mut self`: the active-feature table is mutated from
/// exactly one execution context. Use [`HorizonMonitor`] to drive the engine
/// from an asynchronous location stream.
pub struct HorizonEngine {
    scanner: HorizonScanner,
    route_features: Vec<HorizonFeature>,
    active: HashMap<String, ActiveFeatureState>,
    observer: Arc<dyn HorizonObserver>,
    monitoring: bool,
}

impl HorizonEngine {
    pub fn new(config: HorizonConfig) -> Self {
        Self::with_observer(config, Arc::new(NoopObserver))
    }

    pub fn with_observer(config: HorizonConfig, observer: Arc<dyn HorizonObserver>) -> Self {
        Self {
            scanner: HorizonScanner::new(config),
            route_features: Vec::new(),
            active: HashMap::new(),
            observer,
            monitoring: false,
        }
    }

    /// Begin monitoring a route: extract its features and install its
    /// geometry. Any previous session state is discarded.
    pub fn start_monitoring(&mut self, route: &Route) {
        self.route_features = extract_features(route, unix_now());
        self.scanner.update_route_geometry(&route.geometry);
        self.active.clear();
        self.monitoring = true;
        info!(
            "monitoring started: {} route points, {} features",
            route.geometry.len(),
            self.route_features.len()
        );
    }

    /// Stop monitoring and clear all session state.
    pub fn stop_monitoring(&mut self) {
        self.route_features.clear();
        self.active.clear();
        self.scanner.update_route_geometry(&[]);
        self.monitoring = false;
        info!("monitoring stopped");
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    /// Number of features currently tracked in the active table.
    pub fn active_feature_count(&self) -> usize {
        self.active.len()
    }

    /// Run one scan against the fix and emit the resulting events, in
    /// detected → approaching → exited order.
    ///
    /// Per feature the lifecycle is: silent detection, an immediate alert on
    /// first approach, further alerts only when the distance has moved at
    /// least [`SIGNIFICANT_DISTANCE_CHANGE_M`] from the last reported one
    /// (speed zones alert once on entry and never update), then a single
    /// exit event when passed or out of range.
    pub fn process_fix(&mut self, fix: &LocationFix) -> Vec<HorizonEvent> {
        if !self.monitoring {
            return Vec::new();
        }

        let active_snapshot: Vec<HorizonFeature> = self
            .active
            .values()
            .map(|state| state.feature.clone())
            .collect();
        let scan = self
            .scanner
            .scan(&self.route_features, &active_snapshot, fix);

        let mut events = Vec::new();

        for feature in scan.detected {
            debug!("detected {}", feature.id);
            self.observer.on_feature_detected(&feature);
            self.active.insert(
                feature.id.clone(),
                ActiveFeatureState {
                    feature,
                    first_detected_at: Instant::now(),
                    last_reported_distance_m: 0.0,
                    has_alerted: false,
                },
            );
        }

        for approaching in &scan.approaching {
            let Some(state) = self.active.get_mut(&approaching.feature.id) else {
                warn!("no active state for {}", approaching.feature.id);
                continue;
            };

            let significant =
                is_significant_change(state.last_reported_distance_m, approaching.distance_m);

            let event = match &approaching.feature.kind {
                FeatureKind::SpeedCamera(camera) => (!state.has_alerted || significant).then(|| {
                    HorizonEvent::ApproachingSpeedCamera {
                        camera: camera.clone(),
                        distance_m: approaching.distance_m,
                    }
                }),
                FeatureKind::TrafficIncident(incident) => (!state.has_alerted || significant)
                    .then(|| HorizonEvent::ApproachingTrafficIncident {
                        incident: incident.clone(),
                        distance_m: approaching.distance_m,
                    }),
                // Zones alert once on entry; there is no shrinking distance
                // to re-report.
                FeatureKind::SpeedZone(zone) => {
                    (!state.has_alerted).then(|| HorizonEvent::EnteredSpeedZone {
                        limit_kmh: zone.limit_kmh,
                    })
                }
            };

            if let Some(event) = event {
                state.has_alerted = true;
                state.last_reported_distance_m = approaching.distance_m;
                self.observer.on_alert_emitted(&event);
                events.push(event);
            }
        }

        for feature in scan.exited {
            // Membership guard: an id can exit at most once.
            let Some(state) = self.active.remove(&feature.id) else {
                continue;
            };
            debug!(
                "feature {} exited after {:.1?}",
                feature.id,
                state.first_detected_at.elapsed()
            );
            self.observer.on_feature_exited(&feature);
            events.push(match &feature.kind {
                FeatureKind::SpeedCamera(camera) => HorizonEvent::PassedSpeedCamera {
                    camera: camera.clone(),
                },
                FeatureKind::TrafficIncident(incident) => HorizonEvent::PassedTrafficIncident {
                    incident: incident.clone(),
                },
                FeatureKind::SpeedZone(_) => HorizonEvent::ExitedSpeedZone,
            });
        }

        events
    }
}

/// Whether a distance delta clears the hysteresis threshold. The change is
/// rounded to one decimal first so fractional noise at the boundary cannot
/// flap the comparison.
fn is_significant_change(old_m: f64, new_m: f64) -> bool {
    let change = (old_m - new_m).abs();
    let rounded = (change * 10.0).round() / 10.0;
    rounded >= SIGNIFICANT_DISTANCE_CHANGE_M
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}
