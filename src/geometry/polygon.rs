// src/geometry/polygon.rs
//
// Exact predicates on simple planar polygons.
//
// The road model needs four relations between segment quadrilaterals:
// simplicity, containment, intersection and "touches only along a line".
// All of them reduce to orientation tests on edge pairs plus point-in-polygon
// queries, so no triangulation or clipping is involved.
//
// Semantics follow the usual planar-geometry conventions:
//   - `contains_point` is strict: boundary points are NOT contained.
//   - `covers_point` is closed: boundary points are covered.
//   - `intersects` is closed: touching at a single point counts.
//   - `interiors_overlap` is true only when the two regions share area.

use super::point::Point2;
use super::polyline::distance_to_segment;

/// Distance under which a point is considered to lie on an edge.
const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// Offset used to sample just inside an edge when checking area overlap.
const INTERIOR_PROBE: f64 = 1e-6;

/// A polygon given by its ring of vertices. The closing vertex is implicit:
/// a trailing copy of the first vertex is dropped on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point2>,
}

impl Polygon {
    pub fn new(mut vertices: Vec<Point2>) -> Self {
        if vertices.len() > 1 {
            let first = vertices[0];
            if let Some(&last) = vertices.last() {
                if first.distance(last) <= BOUNDARY_TOLERANCE {
                    vertices.pop();
                }
            }
        }
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point2] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Edges as (start, end) pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Shoelace area; positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        self.edges().map(|(a, b)| a.cross(b)).sum::<f64>() * 0.5
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn on_boundary(&self, p: Point2) -> bool {
        self.edges()
            .any(|(a, b)| distance_to_segment(p, a, b) <= BOUNDARY_TOLERANCE)
    }

    /// Strict point-in-polygon (even-odd ray casting). Boundary → false.
    pub fn contains_point(&self, p: Point2) -> bool {
        if self.vertices.len() < 3 || self.on_boundary(p) {
            return false;
        }
        self.ray_cast(p)
    }

    /// Closed point-in-polygon. Boundary → true.
    pub fn covers_point(&self, p: Point2) -> bool {
        if self.vertices.len() < 3 {
            return false;
        }
        self.on_boundary(p) || self.ray_cast(p)
    }

    fn ray_cast(&self, p: Point2) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x_at = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_at {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// A ring is simple when it has non-zero area, no zero-length edges,
    /// adjacent edges meet only at their shared vertex and non-adjacent
    /// edges never touch.
    pub fn is_simple(&self) -> bool {
        let n = self.vertices.len();
        if n < 3 || self.area() <= BOUNDARY_TOLERANCE {
            return false;
        }
        let edges: Vec<(Point2, Point2)> = self.edges().collect();
        if edges
            .iter()
            .any(|(a, b)| a.distance(*b) <= BOUNDARY_TOLERANCE)
        {
            return false;
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let (a1, a2) = edges[i];
                let (b1, b2) = edges[j];
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if adjacent {
                    // Shared vertex is a2 == b1 (or b2 == a1 for the closing pair).
                    // A fold-back makes the far endpoint land on the other edge.
                    let (far_a, far_b) = if j == i + 1 { (a1, b2) } else { (a2, b1) };
                    if distance_to_segment(far_b, a1, a2) <= BOUNDARY_TOLERANCE
                        || distance_to_segment(far_a, b1, b2) <= BOUNDARY_TOLERANCE
                    {
                        return false;
                    }
                } else if segments_intersect(a1, a2, b1, b2) {
                    return false;
                }
            }
        }
        true
    }

    /// Closed intersection test: shared boundary points count.
    pub fn intersects(&self, other: &Polygon) -> bool {
        for (a1, a2) in self.edges() {
            for (b1, b2) in other.edges() {
                if segments_intersect(a1, a2, b1, b2) {
                    return true;
                }
            }
        }
        // No boundary contact: either disjoint or one nested in the other.
        self.vertices.first().is_some_and(|&p| other.covers_point(p))
            || other.vertices.first().is_some_and(|&p| self.covers_point(p))
    }

    /// True when the two polygons share a region of positive area.
    pub fn interiors_overlap(&self, other: &Polygon) -> bool {
        for (a1, a2) in self.edges() {
            for (b1, b2) in other.edges() {
                if segments_cross_properly(a1, a2, b1, b2) {
                    return true;
                }
            }
        }
        if self.vertices.iter().any(|&p| other.contains_point(p))
            || other.vertices.iter().any(|&p| self.contains_point(p))
        {
            return true;
        }
        // Coincident or edge-aligned rings: sample just inside every edge.
        self.interior_samples().any(|p| other.contains_point(p))
            || other.interior_samples().any(|p| self.contains_point(p))
    }

    /// `self` contains `other` when no point of `other` lies outside `self`
    /// and their interiors share area.
    pub fn contains(&self, other: &Polygon) -> bool {
        if other.vertices.is_empty() {
            return false;
        }
        if !other.vertices.iter().all(|&p| self.covers_point(p)) {
            return false;
        }
        for (a1, a2) in self.edges() {
            for (b1, b2) in other.edges() {
                if segments_cross_properly(a1, a2, b1, b2) {
                    return false;
                }
            }
        }
        if !other
            .edges()
            .all(|(a, b)| self.covers_point(a.lerp(b, 0.5)))
        {
            return false;
        }
        self.interiors_overlap(other)
    }

    /// Points just inside the ring, one per edge, next to the edge midpoint.
    fn interior_samples(&self) -> impl Iterator<Item = Point2> + '_ {
        let ccw = self.signed_area() > 0.0;
        self.edges().filter_map(move |(a, b)| {
            let dir = (b - a).normalized()?;
            let inward = if ccw { dir.perp_left() } else { dir.perp_right() };
            let step = INTERIOR_PROBE.min(a.distance(b) * 1e-3);
            Some(a.lerp(b, 0.5) + inward * step)
        })
    }
}

/// Orientation of the triple (a, b, c): >0 counter-clockwise, <0 clockwise.
fn orientation(a: Point2, b: Point2, c: Point2) -> f64 {
    (b - a).cross(c - a)
}

fn sign(v: f64) -> i8 {
    if v > BOUNDARY_TOLERANCE {
        1
    } else if v < -BOUNDARY_TOLERANCE {
        -1
    } else {
        0
    }
}

/// Closed segment intersection, including touching and collinear overlap.
pub fn segments_intersect(p1: Point2, p2: Point2, q1: Point2, q2: Point2) -> bool {
    let o1 = sign(orientation(p1, p2, q1));
    let o2 = sign(orientation(p1, p2, q2));
    let o3 = sign(orientation(q1, q2, p1));
    let o4 = sign(orientation(q1, q2, p2));

    let collinear = o1 == 0 && o2 == 0;
    if !collinear && o1 * o2 <= 0 && o3 * o4 <= 0 {
        return true;
    }
    (o1 == 0 && distance_to_segment(q1, p1, p2) <= BOUNDARY_TOLERANCE)
        || (o2 == 0 && distance_to_segment(q2, p1, p2) <= BOUNDARY_TOLERANCE)
        || (o3 == 0 && distance_to_segment(p1, q1, q2) <= BOUNDARY_TOLERANCE)
        || (o4 == 0 && distance_to_segment(p2, q1, q2) <= BOUNDARY_TOLERANCE)
}

/// Segments cross at a single point interior to both.
pub fn segments_cross_properly(p1: Point2, p2: Point2, q1: Point2, q2: Point2) -> bool {
    let o1 = sign(orientation(p1, p2, q1));
    let o2 = sign(orientation(p1, p2, q2));
    let o3 = sign(orientation(q1, q2, p1));
    let o4 = sign(orientation(q1, q2, p2));
    o1 * o2 < 0 && o3 * o4 < 0
}
