//! Scan output value types.

use serde::{Deserialize, Serialize};

use crate::features::HorizonFeature;

/// A feature paired with its current along-route distance in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDistance {
    pub feature: HorizonFeature,
    pub distance_m: f64,
}

/// Classification produced by a single scan. Produced fresh every call;
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Features that newly entered alert range this scan.
    pub detected: Vec<HorizonFeature>,
    /// All features currently within alert range, with distances.
    pub approaching: Vec<FeatureDistance>,
    /// Previously tracked features that were passed or left scan range.
    pub exited: Vec<HorizonFeature>,
}

/// Whether a candidate feature matters for the current fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureRelevance {
    NotRelevant,
    Relevant { distance_m: f64 },
}

impl FeatureRelevance {
    pub fn is_relevant(&self) -> bool {
        matches!(self, FeatureRelevance::Relevant { .. })
    }

    pub fn distance_m(&self) -> Option<f64> {
        match self {
            FeatureRelevance::NotRelevant => None,
            FeatureRelevance::Relevant { distance_m } => Some(*distance_m),
        }
    }
}
