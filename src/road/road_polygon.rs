// src/road/road_polygon.rs
//
// Polygon view of a road and its "does not fold onto itself" predicate.
//
// Segment i is the quadrilateral between nodes i and i+1:
//
//     left[i] ───────── left[i+1]
//        │                  │
//     right[i] ──────── right[i+1]
//
// A well-formed road satisfies, in this order:
//   1. every segment quad is simple;
//   2. no segment quad contains another;
//   3. non-adjacent quads are disjoint;
//   4. adjacent quads touch only along their shared edge.

use std::fmt;

use tracing::debug;

use crate::error::ScenarioError;
use crate::geometry::{Point2, Polygon};

use super::road_points::RoadPoints;

/// First invariant a road polygon breaks, with the offending segment indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadViolation {
    NonSimpleSegment(usize),
    NestedSegments { outer: usize, inner: usize },
    NonAdjacentIntersection(usize, usize),
    AdjacentOverlap(usize, usize),
}

impl fmt::Display for RoadViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonSimpleSegment(i) => write!(f, "segment {} is not simple", i),
            Self::NestedSegments { outer, inner } => {
                write!(f, "segment {} contains segment {}", outer, inner)
            }
            Self::NonAdjacentIntersection(i, j) => {
                write!(f, "non-adjacent segments {} and {} intersect", i, j)
            }
            Self::AdjacentOverlap(i, j) => {
                write!(f, "adjacent segments {} and {} overlap", i, j)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoadPolygon {
    road_points: RoadPoints,
    segments: Vec<Polygon>,
    polygon: Polygon,
    left_lane: Polygon,
    right_lane: Polygon,
}

impl RoadPolygon {
    pub fn from_points(road_points: RoadPoints) -> Self {
        let n = road_points.len();
        let segments = (0..n.saturating_sub(1))
            .map(|i| {
                Polygon::new(vec![
                    road_points.left[i],
                    road_points.left[i + 1],
                    road_points.right[i + 1],
                    road_points.right[i],
                ])
            })
            .collect();

        let polygon = Polygon::new(stitch(&road_points.left, &road_points.right));
        let left_lane = Polygon::new(stitch(&road_points.left, &road_points.middle));
        let right_lane = Polygon::new(stitch(&road_points.middle, &road_points.right));

        Self {
            road_points,
            segments,
            polygon,
            left_lane,
            right_lane,
        }
    }

    pub fn road_points(&self) -> &RoadPoints {
        &self.road_points
    }

    pub fn segments(&self) -> &[Polygon] {
        &self.segments
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn left_lane(&self) -> &Polygon {
        &self.left_lane
    }

    pub fn right_lane(&self) -> &Polygon {
        &self.right_lane
    }

    /// Strict containment in the right lane; the lane boundary is outside.
    pub fn in_right_lane(&self, p: Point2) -> bool {
        self.right_lane.contains_point(p)
    }

    pub fn is_valid(&self) -> bool {
        self.violation().is_none()
    }

    /// Check the four road invariants and report the first one broken.
    pub fn violation(&self) -> Option<RoadViolation> {
        let segs = &self.segments;

        if let Some(i) = segs.iter().position(|s| !s.is_simple()) {
            return Some(RoadViolation::NonSimpleSegment(i));
        }

        for (i, a) in segs.iter().enumerate() {
            for (j, b) in segs.iter().enumerate() {
                if i != j && a.contains(b) {
                    return Some(RoadViolation::NestedSegments { outer: i, inner: j });
                }
            }
        }

        for i in 0..segs.len() {
            for j in (i + 2)..segs.len() {
                if segs[i].intersects(&segs[j]) {
                    return Some(RoadViolation::NonAdjacentIntersection(i, j));
                }
            }
        }

        for (i, pair) in segs.windows(2).enumerate() {
            if pair[0].interiors_overlap(&pair[1]) {
                return Some(RoadViolation::AdjacentOverlap(i, i + 1));
            }
        }

        None
    }

    /// Like `is_valid`, but as a rejection reason for scenario builders.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        match self.violation() {
            None => Ok(()),
            Some(v) => {
                debug!(violation = %v, segments = self.segments.len(), "road rejected");
                Err(ScenarioError::RoadInvalid(v.to_string()))
            }
        }
    }
}

/// `forward` followed by `backward` reversed: a closed ring along both sides.
fn stitch(forward: &[Point2], backward: &[Point2]) -> Vec<Point2> {
    forward
        .iter()
        .copied()
        .chain(backward.iter().rev().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::road::RoadNode;
    use crate::trajectory::{synthesize, DrivingAction, ManeuverSegment, RoutePlan};
    use crate::geometry::Pose;

    fn road(nodes: &[RoadNode]) -> RoadPolygon {
        RoadPolygon::from_points(RoadPoints::from_centerline(nodes).unwrap())
    }

    #[test]
    fn test_straight_four_node_road_is_valid() {
        let nodes = RoadNode::straight(Point2::new(0.0, 30.0), 4, 20.0, -28.0, 8.0);
        let rp = road(&nodes);
        assert_eq!(rp.segments().len(), 3);
        assert!(rp.is_valid(), "straight road reported {:?}", rp.violation());
        assert!(rp.validate().is_ok());
    }

    #[test]
    fn test_polygon_areas() {
        let nodes = RoadNode::straight(Point2::new(0.0, 0.0), 4, 20.0, 0.0, 8.0);
        let rp = road(&nodes);
        assert!((rp.polygon().area() - 60.0 * 8.0).abs() < 1e-9);
        assert!((rp.left_lane().area() - 60.0 * 4.0).abs() < 1e-9);
        assert!((rp.right_lane().area() - 60.0 * 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_right_lane_containment() {
        let nodes = RoadNode::straight(Point2::new(0.0, 30.0), 4, 20.0, 0.0, 8.0);
        let rp = road(&nodes);
        assert!(rp.in_right_lane(Point2::new(30.0, 28.0)));
        assert!(!rp.in_right_lane(Point2::new(30.0, 32.0)), "left lane is out of bounds");
        assert!(!rp.in_right_lane(Point2::new(30.0, 30.0)), "lane boundary is not contained");
        assert!(!rp.in_right_lane(Point2::new(30.0, 20.0)));
        assert!(!rp.in_right_lane(Point2::new(-1.0, 28.0)));
    }

    #[test]
    fn test_smooth_turn_is_valid() {
        let plan = RoutePlan::new(vec![
            DrivingAction::single(ManeuverSegment::straight(20.0)),
            DrivingAction::single(ManeuverSegment::turn(90.0, 30.0)),
            DrivingAction::single(ManeuverSegment::straight(20.0)),
        ]);
        let traj = synthesize(Pose::default(), &plan, 5.0).unwrap();
        let nodes = RoadNode::from_trajectory(&traj, 0.0, 8.0);
        let rp = road(&nodes);
        assert!(rp.is_valid(), "smooth turn reported {:?}", rp.violation());
    }

    #[test]
    fn test_folded_road_is_invalid() {
        // Hairpin that doubles back over the first segment.
        let nodes = vec![
            RoadNode::new(0.0, 0.0, 0.0, 8.0),
            RoadNode::new(20.0, 0.0, 0.0, 8.0),
            RoadNode::new(20.0, 4.0, 0.0, 8.0),
            RoadNode::new(0.0, 4.0, 0.0, 8.0),
        ];
        let rp = road(&nodes);
        assert!(!rp.is_valid());
        assert!(matches!(rp.validate(), Err(ScenarioError::RoadInvalid(_))));
    }

    #[test]
    fn test_tight_corner_overlaps() {
        // Turning 90° in a single node with a road wider than the step.
        let nodes = vec![
            RoadNode::new(0.0, 0.0, 0.0, 8.0),
            RoadNode::new(2.0, 0.0, 0.0, 8.0),
            RoadNode::new(2.0, 2.0, 0.0, 8.0),
        ];
        assert!(!road(&nodes).is_valid());
    }

    #[test]
    fn test_violation_messages() {
        assert_eq!(
            RoadViolation::NonAdjacentIntersection(0, 2).to_string(),
            "non-adjacent segments 0 and 2 intersect"
        );
        assert_eq!(
            RoadViolation::NestedSegments { outer: 1, inner: 3 }.to_string(),
            "segment 1 contains segment 3"
        );
    }
}
