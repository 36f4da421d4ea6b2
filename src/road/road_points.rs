// src/road/road_points.rs

use crate::error::RoadError;
use crate::geometry::{Point2, EPSILON};

use super::node::RoadNode;

/// Width values closer than this are treated as equal.
const WIDTH_TOLERANCE: f64 = 1e-9;

/// Left edge, right edge and centerline, one entry per centerline node.
///
/// Derived data: recompute from the node list whenever nodes change.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadPoints {
    pub left: Vec<Point2>,
    pub right: Vec<Point2>,
    pub middle: Vec<Point2>,
    /// Full road width (both lanes).
    pub width: f64,
}

impl RoadPoints {
    /// Offset every node by half the road width along its local normal.
    ///
    /// The forward direction at node i points to node i+1; the last node uses
    /// the direction coming from its predecessor.
    pub fn from_centerline(nodes: &[RoadNode]) -> Result<Self, RoadError> {
        if nodes.len() < 2 {
            return Err(RoadError::InsufficientNodes(nodes.len()));
        }

        let width = nodes[0].width;
        if !(width.is_finite() && width > 0.0) {
            return Err(RoadError::NonPositiveWidth(width));
        }
        if let Some((index, node)) = nodes
            .iter()
            .enumerate()
            .find(|(_, n)| (n.width - width).abs() > WIDTH_TOLERANCE)
        {
            return Err(RoadError::InconsistentWidth {
                index,
                expected: width,
                found: node.width,
            });
        }

        let n = nodes.len();
        let mut left = Vec::with_capacity(n);
        let mut right = Vec::with_capacity(n);
        let mut middle = Vec::with_capacity(n);

        for i in 0..n {
            let (from, to) = if i + 1 < n { (i, i + 1) } else { (i - 1, i) };
            let direction = (nodes[to].xy() - nodes[from].xy())
                .normalized()
                .ok_or(RoadError::DegenerateSegment(from, to))?;
            let half = nodes[i].width * 0.5;
            let centre = nodes[i].xy();

            left.push(centre + direction.perp_left() * half);
            right.push(centre + direction.perp_right() * half);
            middle.push(centre);
        }

        Ok(Self {
            left,
            right,
            middle,
            width,
        })
    }

    pub fn len(&self) -> usize {
        self.middle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middle.is_empty()
    }

    /// Centerline of the right lane: halfway between middle and right edge.
    pub fn right_lane_center(&self) -> Vec<Point2> {
        self.middle
            .iter()
            .zip(&self.right)
            .map(|(m, r)| m.lerp(*r, 0.5))
            .collect()
    }

    /// True when every node keeps the edges at half-width distance.
    pub fn edges_consistent(&self) -> bool {
        let half = self.width * 0.5;
        self.middle.iter().zip(&self.left).zip(&self.right).all(|((m, l), r)| {
            (m.distance(*l) - half).abs() < 1e-6 + EPSILON
                && (m.distance(*r) - half).abs() < 1e-6 + EPSILON
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_road_edges() {
        let nodes = RoadNode::straight(Point2::new(0.0, 30.0), 4, 20.0, 0.0, 8.0);
        let rp = RoadPoints::from_centerline(&nodes).unwrap();
        assert_eq!(rp.len(), 4);
        for i in 0..4 {
            assert!((rp.left[i].y - 34.0).abs() < 1e-12);
            assert!((rp.right[i].y - 26.0).abs() < 1e-12);
            assert_eq!(rp.middle[i], nodes[i].xy());
        }
        assert!(rp.edges_consistent());
        let lane = rp.right_lane_center();
        assert!((lane[2].y - 28.0).abs() < 1e-12);
    }

    #[test]
    fn test_last_node_uses_previous_direction() {
        let nodes = vec![
            RoadNode::new(0.0, 0.0, 0.0, 4.0),
            RoadNode::new(0.0, 10.0, 0.0, 4.0),
        ];
        let rp = RoadPoints::from_centerline(&nodes).unwrap();
        // Heading north: left is -x, right is +x.
        assert!(rp.left[1].approx_eq(Point2::new(-2.0, 10.0), 1e-12));
        assert!(rp.right[1].approx_eq(Point2::new(2.0, 10.0), 1e-12));
    }

    #[test]
    fn test_insufficient_nodes() {
        let one = vec![RoadNode::new(0.0, 0.0, 0.0, 8.0)];
        assert_eq!(
            RoadPoints::from_centerline(&one),
            Err(RoadError::InsufficientNodes(1))
        );
        assert_eq!(
            RoadPoints::from_centerline(&[]),
            Err(RoadError::InsufficientNodes(0))
        );
    }

    #[test]
    fn test_width_must_be_constant() {
        let nodes = vec![
            RoadNode::new(0.0, 0.0, 0.0, 8.0),
            RoadNode::new(10.0, 0.0, 0.0, 8.0),
            RoadNode::new(20.0, 0.0, 0.0, 6.0),
        ];
        assert!(matches!(
            RoadPoints::from_centerline(&nodes),
            Err(RoadError::InconsistentWidth { index: 2, .. })
        ));
    }

    #[test]
    fn test_coincident_nodes_rejected() {
        let nodes = vec![
            RoadNode::new(0.0, 0.0, 0.0, 8.0),
            RoadNode::new(0.0, 0.0, 0.0, 8.0),
        ];
        assert_eq!(
            RoadPoints::from_centerline(&nodes),
            Err(RoadError::DegenerateSegment(0, 1))
        );
    }
}
