//! Route-relative position value types.

use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// The result of projecting an arbitrary coordinate onto the route polyline.
///
/// Positions are ordered along the route: a position is before another when
/// its segment index is lower, or when the indices are equal and it lies
/// closer to the segment start. The [`invalid`](Self::invalid) sentinel is
/// returned for queries against an empty route and compares unequal to every
/// valid position; callers must check [`is_valid`](Self::is_valid) before
/// trusting a distance calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExactRoutePosition {
    /// Index of the segment's start coordinate in the route geometry.
    pub coordinate_index: i32,
    /// Index of the segment's end coordinate.
    pub next_coordinate_index: i32,
    /// Segment index (same as `coordinate_index`; kept separate so callers
    /// that only reason about segments don't depend on coordinate layout).
    pub segment_index: i32,
    /// The projected coordinate lying exactly on the route.
    pub exact_coordinate: GeoPoint,
    /// Cumulative distance from the route start to the projection, meters.
    pub distance_from_start: f64,
    /// Distance from the segment start to the projection, meters.
    pub distance_from_segment_start: f64,
    /// Fraction of the segment covered at the projection, in `[0, 1]`.
    pub percentage_along_segment: f64,
}

impl ExactRoutePosition {
    /// Sentinel for "no position exists" (empty route geometry).
    pub fn invalid() -> Self {
        Self {
            coordinate_index: -1,
            next_coordinate_index: -1,
            segment_index: -1,
            exact_coordinate: GeoPoint::new(0.0, 0.0),
            distance_from_start: f64::INFINITY,
            distance_from_segment_start: f64::INFINITY,
            percentage_along_segment: 0.0,
        }
    }

    /// Whether this position refers to real route geometry.
    pub fn is_valid(&self) -> bool {
        self.coordinate_index >= 0
    }

    /// Whether this position lies before `other` along the route.
    pub fn is_before(&self, other: &Self) -> bool {
        if self.coordinate_index == other.coordinate_index {
            return self.distance_from_segment_start < other.distance_from_segment_start;
        }
        self.coordinate_index < other.coordinate_index
    }

    /// Whether this position lies after `other` along the route.
    pub fn is_after(&self, other: &Self) -> bool {
        if self.coordinate_index == other.coordinate_index {
            return self.distance_from_segment_start > other.distance_from_segment_start;
        }
        self.coordinate_index > other.coordinate_index
    }
}
