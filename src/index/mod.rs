//! Spatial index over the active route's geometry.
//!
//! Built once per route and rebuilt wholesale on route change, the index
//! answers two questions: where does an arbitrary coordinate lie on the
//! route ([`RouteGeometryIndex::find_exact_position`]), and how far apart
//! along the route are two coordinates
//! ([`RouteGeometryIndex::distance_along_route`]).
//!
//! ## Structure
//!
//! Indexing performs a single O(n) pass over the coordinates:
//! - cumulative haversine distance from the route start per index,
//! - a uniform spatial grid sized to the nearby threshold, recording for
//!   each coordinate the earlier indices within ~10 m (the 3×3 neighborhood
//!   is checked, then filtered by exact distance). These "nearby" sets
//!   disambiguate U-shaped routes where two distant parts of the polyline
//!   pass through the same spot,
//! - insertion into a bounding-volume tree for radius queries.
//!
//! ## Query strategy
//!
//! Consecutive navigation queries move forward along the route, so a
//! successful projection is cached and the next query first checks only the
//! cached position's local window, falling back to a full tree query and
//! finally to a linear nearest-coordinate scan. The linear fallback means a
//! position is always returned; it may be imprecise when the route is far
//! from the query point.

mod node;
mod position;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::GeoPoint;
use crate::geo_utils::{METERS_PER_DEGREE, haversine_distance, initial_bearing, interpolate};
use crate::geodesy::{ecef_to_geographic, geographic_to_ecef};
use node::{BoundingBox, IndexedPoint, TreeNode};

pub use position::ExactRoutePosition;

/// Radius in meters within which route points are considered projection
/// candidates for a query.
pub const SEARCH_RADIUS_M: f64 = 50.0;

/// Distance in meters below which two route coordinates count as "the same
/// place" for U-shape disambiguation; also the spatial grid cell size.
pub const NEARBY_THRESHOLD_M: f64 = 10.0;

/// Strategy for projecting a point onto a route segment.
///
/// `Accurate` projects onto the segment chord in ECEF space and maps the
/// foot point back to geographic coordinates. `Relaxed` decomposes segment
/// and point into a flat plane using bearings, which is cheaper but less
/// precise on long segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    #[default]
    Accurate,
    Relaxed,
}

#[derive(Debug)]
struct CoordinateInfo {
    coordinate: GeoPoint,
    cumulative_distance: f64,
    nearby_indices: HashSet<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Projection {
    coordinate: GeoPoint,
    distance_along_segment: f64,
    percentage: f64,
}

#[derive(Debug, Clone, Copy)]
struct SegmentMatch {
    index: usize,
    distance: f64,
    projection: Projection,
}

/// Spatial index over a single route's polyline.
#[derive(Debug)]
pub struct RouteGeometryIndex {
    infos: Vec<CoordinateInfo>,
    root: TreeNode,
    mode: ProjectionMode,
    last_reported_position: Option<ExactRoutePosition>,
}

impl RouteGeometryIndex {
    /// Build an index over the given coordinates. An empty slice yields an
    /// empty index; every position query on it returns the invalid sentinel.
    pub fn new(coordinates: &[GeoPoint], mode: ProjectionMode) -> Self {
        let mut index = Self {
            infos: Vec::new(),
            root: TreeNode::new_leaf(BoundingBox::empty()),
            mode,
            last_reported_position: None,
        };
        index.reindex(coordinates);
        index
    }

    /// Rebuild the index wholesale for new route geometry.
    ///
    /// The cached last position is always invalidated; a stale segment index
    /// must never survive a route change.
    pub fn reindex(&mut self, coordinates: &[GeoPoint]) {
        self.infos.clear();
        self.root = TreeNode::new_leaf(BoundingBox::empty());
        self.last_reported_position = None;

        if coordinates.is_empty() {
            return;
        }

        self.infos.reserve(coordinates.len());

        let cell_size_deg = NEARBY_THRESHOLD_M / METERS_PER_DEGREE;
        let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        let mut route_distance = 0.0;

        for (current_index, coordinate) in coordinates.iter().enumerate() {
            let grid_x = (coordinate.longitude / cell_size_deg).floor() as i64;
            let grid_y = (coordinate.latitude / cell_size_deg).floor() as i64;

            let mut nearby_indices = HashSet::new();
            for dx in -1..=1 {
                for dy in -1..=1 {
                    let Some(cell) = grid.get(&(grid_x + dx, grid_y + dy)) else {
                        continue;
                    };
                    for &neighbor in cell {
                        let neighbor_distance =
                            haversine_distance(coordinate, &coordinates[neighbor]);
                        if neighbor_distance < NEARBY_THRESHOLD_M {
                            nearby_indices.insert(neighbor);
                        }
                    }
                }
            }

            grid.entry((grid_x, grid_y)).or_default().push(current_index);

            if current_index > 0 {
                route_distance += haversine_distance(coordinate, &coordinates[current_index - 1]);
            }

            self.infos.push(CoordinateInfo {
                coordinate: *coordinate,
                cumulative_distance: route_distance,
                nearby_indices,
            });

            self.root.insert(IndexedPoint {
                index: current_index,
                coordinate: *coordinate,
            });
        }
    }

    /// Number of indexed coordinates.
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Whether the index holds no geometry.
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Cumulative distance from the route start to the given coordinate
    /// index, if it exists.
    pub fn cumulative_distance(&self, index: usize) -> Option<f64> {
        self.infos.get(index).map(|info| info.cumulative_distance)
    }

    /// Project a coordinate onto the route, returning the best matching
    /// position. Always succeeds; on an empty index the invalid sentinel is
    /// returned, and when no segment lies within the search radius the
    /// globally nearest coordinate is used.
    pub fn find_exact_position(&mut self, point: &GeoPoint) -> ExactRoutePosition {
        if self.infos.is_empty() {
            return ExactRoutePosition::invalid();
        }

        let best_match = match self.last_reported_position {
            Some(last) if last.is_valid() => {
                let anchor = last.coordinate_index as usize;
                let window_start = anchor.saturating_sub(1);
                let window_end = (anchor + 2).min(self.infos.len() - 1);
                let local = self.find_best_match(point, window_start..=window_end);

                match local {
                    Some(m) if m.distance <= SEARCH_RADIUS_M => Some(m),
                    _ => {
                        let candidates = self.candidates_within_radius(point);
                        self.find_best_match(point, candidates)
                    }
                }
            }
            _ => {
                let candidates = self.candidates_within_radius(point);
                self.find_best_match(point, candidates)
            }
        };

        let position = match best_match {
            Some(m) => self.position_from_match(&m),
            None => self.fallback_position(point),
        };
        self.last_reported_position = Some(position);
        position
    }

    /// Along-route distance from one coordinate to another, in meters.
    ///
    /// Returns `+∞` when `to` lies behind `from` on the route (a forward
    /// alert can never be reached by going backwards) or when either point
    /// has no valid position.
    pub fn distance_along_route(&mut self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        let from_position = self.find_exact_position(from);
        let to_position = self.find_exact_position(to);

        if !from_position.is_valid() || !to_position.is_valid() {
            return f64::INFINITY;
        }
        if from_position.is_after(&to_position) {
            return f64::INFINITY;
        }

        to_position.distance_from_start - from_position.distance_from_start
    }

    fn candidates_within_radius(&self, point: &GeoPoint) -> Vec<usize> {
        let mut indices = HashSet::new();
        let search_box = BoundingBox::around_radius(point, SEARCH_RADIUS_M);
        self.root
            .collect_within_radius(point, &search_box, SEARCH_RADIUS_M, &mut indices);
        indices.into_iter().collect()
    }

    /// Project `point` onto every segment reachable from the given start
    /// indices (each expanded through its nearby set), keeping the
    /// minimum-distance candidate.
    fn find_best_match(
        &self,
        point: &GeoPoint,
        search_indices: impl IntoIterator<Item = usize>,
    ) -> Option<SegmentMatch> {
        let mut best: Option<SegmentMatch> = None;
        let segment_count = self.infos.len().saturating_sub(1);

        for index in search_indices {
            if index >= segment_count {
                continue;
            }

            let mut check_indices: Vec<usize> =
                self.infos[index].nearby_indices.iter().copied().collect();
            check_indices.push(index);

            for check_index in check_indices {
                if check_index >= segment_count {
                    continue;
                }

                let start = &self.infos[check_index].coordinate;
                let end = &self.infos[check_index + 1].coordinate;
                let (distance, projection) = match self.mode {
                    ProjectionMode::Accurate => project_accurate(point, start, end),
                    ProjectionMode::Relaxed => project_relaxed(point, start, end),
                };

                let better = match &best {
                    Some(current) => distance < current.distance,
                    None => true,
                };
                if better {
                    best = Some(SegmentMatch {
                        index: check_index,
                        distance,
                        projection,
                    });
                }
            }
        }

        best
    }

    fn position_from_match(&self, m: &SegmentMatch) -> ExactRoutePosition {
        let segment_start = &self.infos[m.index];
        ExactRoutePosition {
            coordinate_index: m.index as i32,
            next_coordinate_index: (m.index + 1) as i32,
            segment_index: m.index as i32,
            exact_coordinate: m.projection.coordinate,
            distance_from_start: segment_start.cumulative_distance
                + m.projection.distance_along_segment,
            distance_from_segment_start: m.projection.distance_along_segment,
            percentage_along_segment: m.projection.percentage,
        }
    }

    /// Last-resort linear scan for the nearest single coordinate.
    fn fallback_position(&self, point: &GeoPoint) -> ExactRoutePosition {
        let mut best_index = 0;
        let mut min_distance = f64::INFINITY;

        for (i, info) in self.infos.iter().enumerate() {
            let distance = haversine_distance(point, &info.coordinate);
            if distance < min_distance {
                min_distance = distance;
                best_index = i;
            }
        }

        let info = &self.infos[best_index];
        ExactRoutePosition {
            coordinate_index: best_index as i32,
            next_coordinate_index: ((best_index + 1).min(self.infos.len() - 1)) as i32,
            segment_index: best_index as i32,
            exact_coordinate: info.coordinate,
            distance_from_start: info.cumulative_distance,
            distance_from_segment_start: 0.0,
            percentage_along_segment: 0.0,
        }
    }
}

/// Project `point` onto the segment chord in ECEF space.
fn project_accurate(point: &GeoPoint, start: &GeoPoint, end: &GeoPoint) -> (f64, Projection) {
    let p = geographic_to_ecef(point);
    let a = geographic_to_ecef(start);
    let b = geographic_to_ecef(end);

    let ab = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let ap = [p[0] - a[0], p[1] - a[1], p[2] - a[2]];

    let length_sq = ab[0] * ab[0] + ab[1] * ab[1] + ab[2] * ab[2];
    if length_sq == 0.0 {
        // Degenerate segment: point distance, projection pinned to start.
        return (
            haversine_distance(point, start),
            Projection {
                coordinate: *start,
                distance_along_segment: 0.0,
                percentage: 0.0,
            },
        );
    }

    let dot = ap[0] * ab[0] + ap[1] * ab[1] + ap[2] * ab[2];
    let t = (dot / length_sq).clamp(0.0, 1.0);

    let foot = [a[0] + t * ab[0], a[1] + t * ab[1], a[2] + t * ab[2]];
    let projected = ecef_to_geographic(foot);

    (
        haversine_distance(point, &projected),
        Projection {
            coordinate: projected,
            distance_along_segment: haversine_distance(start, &projected),
            percentage: t,
        },
    )
}

/// Project `point` onto the segment using a flat-plane bearing
/// decomposition.
fn project_relaxed(point: &GeoPoint, start: &GeoPoint, end: &GeoPoint) -> (f64, Projection) {
    let segment_length = haversine_distance(start, end);
    if segment_length == 0.0 {
        return (
            haversine_distance(point, start),
            Projection {
                coordinate: *start,
                distance_along_segment: 0.0,
                percentage: 0.0,
            },
        );
    }

    let segment_bearing = initial_bearing(start, end).to_radians();
    let point_bearing = initial_bearing(start, point).to_radians();
    let point_distance = haversine_distance(start, point);

    let ex = segment_length * segment_bearing.cos();
    let ey = segment_length * segment_bearing.sin();
    let px = point_distance * point_bearing.cos();
    let py = point_distance * point_bearing.sin();

    let dot = px * ex + py * ey;
    let t = (dot / (segment_length * segment_length)).clamp(0.0, 1.0);

    let projected = interpolate(start, end, t);

    (
        haversine_distance(point, &projected),
        Projection {
            coordinate: projected,
            distance_along_segment: haversine_distance(start, &projected),
            percentage: t,
        },
    )
}
