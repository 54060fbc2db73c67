//! Bounding boxes and the grid-bucketed bounding-volume tree node.
//!
//! The tree stores route coordinates as (index, coordinate) points in leaves
//! of bounded capacity. A node is either a leaf or an internal node, never
//! both; the enum makes that invariant unrepresentable. Inserting into a
//! full leaf splits it into per-point children with small padded bounds, and
//! insertion descends by greedy minimal-area enlargement.

use std::collections::HashSet;

use crate::GeoPoint;
use crate::geo_utils::{METERS_PER_DEGREE, haversine_distance};

/// Maximum number of points a leaf holds before it splits.
pub(crate) const MAX_LEAF_ENTRIES: usize = 8;

/// Padding in degrees applied around a single point when it becomes its own
/// child bound after a split (roughly 11 m of latitude).
const CHILD_BOUNDS_PADDING_DEG: f64 = 0.0001;

/// Axis-aligned geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// The inverted box that contains nothing; expanding it with any point
    /// yields that point's bounds.
    pub fn empty() -> Self {
        Self {
            min_lat: f64::INFINITY,
            min_lon: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            max_lon: f64::NEG_INFINITY,
        }
    }

    /// Padded box around a single coordinate.
    pub fn around(coordinate: &GeoPoint) -> Self {
        Self {
            min_lat: coordinate.latitude - CHILD_BOUNDS_PADDING_DEG,
            min_lon: coordinate.longitude - CHILD_BOUNDS_PADDING_DEG,
            max_lat: coordinate.latitude + CHILD_BOUNDS_PADDING_DEG,
            max_lon: coordinate.longitude + CHILD_BOUNDS_PADDING_DEG,
        }
    }

    /// Box covering a metric radius around a point, widened in longitude by
    /// the latitude cosine.
    pub fn around_radius(point: &GeoPoint, radius_m: f64) -> Self {
        let lat_radius = radius_m / METERS_PER_DEGREE;
        let lon_radius = radius_m / (METERS_PER_DEGREE * point.latitude.to_radians().cos());
        Self {
            min_lat: point.latitude - lat_radius,
            min_lon: point.longitude - lon_radius,
            max_lat: point.latitude + lat_radius,
            max_lon: point.longitude + lon_radius,
        }
    }

    pub fn expand_to(&mut self, coordinate: &GeoPoint) {
        self.min_lat = self.min_lat.min(coordinate.latitude);
        self.min_lon = self.min_lon.min(coordinate.longitude);
        self.max_lat = self.max_lat.max(coordinate.latitude);
        self.max_lon = self.max_lon.max(coordinate.longitude);
    }

    pub fn intersects(&self, other: &Self) -> bool {
        !(self.min_lat > other.max_lat
            || self.max_lat < other.min_lat
            || self.min_lon > other.max_lon
            || self.max_lon < other.min_lon)
    }

    fn area(&self) -> f64 {
        (self.max_lat - self.min_lat) * (self.max_lon - self.min_lon)
    }

    /// How much this box's area would grow to admit `coordinate`.
    pub fn enlargement_for(&self, coordinate: &GeoPoint) -> f64 {
        let mut grown = *self;
        grown.expand_to(coordinate);
        grown.area() - self.area()
    }
}

/// A route coordinate paired with its index in the geometry.
#[derive(Debug, Clone)]
pub(crate) struct IndexedPoint {
    pub index: usize,
    pub coordinate: GeoPoint,
}

#[derive(Debug)]
enum NodeKind {
    Leaf(Vec<IndexedPoint>),
    Internal(Vec<TreeNode>),
}

/// A node of the bounding-volume tree.
#[derive(Debug)]
pub(crate) struct TreeNode {
    bounds: BoundingBox,
    kind: NodeKind,
}

impl TreeNode {
    pub fn new_leaf(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            kind: NodeKind::Leaf(Vec::new()),
        }
    }

    /// Leaf node holding exactly one point, with padded bounds.
    fn leaf_for(point: IndexedPoint) -> Self {
        Self {
            bounds: BoundingBox::around(&point.coordinate),
            kind: NodeKind::Leaf(vec![point]),
        }
    }

    /// Insert a point, splitting full leaves into per-point children and
    /// descending into the child needing the least bounds enlargement.
    pub fn insert(&mut self, point: IndexedPoint) {
        self.bounds.expand_to(&point.coordinate);

        match &mut self.kind {
            NodeKind::Leaf(points) if points.len() < MAX_LEAF_ENTRIES => {
                points.push(point);
            }
            NodeKind::Leaf(points) => {
                // Overflow: every existing point becomes its own child, the
                // new point becomes one more.
                let existing = std::mem::take(points);
                let mut children: Vec<TreeNode> =
                    existing.into_iter().map(TreeNode::leaf_for).collect();
                children.push(TreeNode::leaf_for(point));
                self.kind = NodeKind::Internal(children);
            }
            NodeKind::Internal(children) => {
                let best = children.iter_mut().min_by(|a, b| {
                    let ea = a.bounds.enlargement_for(&point.coordinate);
                    let eb = b.bounds.enlargement_for(&point.coordinate);
                    ea.partial_cmp(&eb).unwrap_or(std::cmp::Ordering::Equal)
                });
                if let Some(child) = best {
                    child.insert(point);
                }
            }
        }
    }

    /// Collect indices of all stored points within `radius_m` of `point`.
    pub fn collect_within_radius(
        &self,
        point: &GeoPoint,
        search_box: &BoundingBox,
        radius_m: f64,
        indices: &mut HashSet<usize>,
    ) {
        if !self.bounds.intersects(search_box) {
            return;
        }

        match &self.kind {
            NodeKind::Leaf(points) => {
                for stored in points {
                    if haversine_distance(&stored.coordinate, point) <= radius_m {
                        indices.insert(stored.index);
                    }
                }
            }
            NodeKind::Internal(children) => {
                for child in children {
                    child.collect_within_radius(point, search_box, radius_m, indices);
                }
            }
        }
    }
}
