// src/road/node.rs

use crate::geometry::{Point2, Point3};
use crate::trajectory::Trajectory;
use serde::{Deserialize, Serialize};

/// One centerline node as the simulator consumes it: position plus the full
/// road width at that node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadNode {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub width: f64,
}

impl RoadNode {
    pub const fn new(x: f64, y: f64, z: f64, width: f64) -> Self {
        Self { x, y, z, width }
    }

    pub fn xy(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    pub fn position(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }

    /// Lift a trajectory into road nodes at constant height and width.
    pub fn from_trajectory(trajectory: &Trajectory, z: f64, width: f64) -> Vec<RoadNode> {
        trajectory
            .points()
            .iter()
            .map(|p| RoadNode::new(p.x, p.y, z, width))
            .collect()
    }

    /// Straight road along +x starting at `start`, `count` nodes `spacing` apart.
    pub fn straight(start: Point2, count: usize, spacing: f64, z: f64, width: f64) -> Vec<RoadNode> {
        (0..count)
            .map(|i| RoadNode::new(start.x + spacing * i as f64, start.y, z, width))
            .collect()
    }
}

impl From<(f64, f64, f64, f64)> for RoadNode {
    fn from((x, y, z, width): (f64, f64, f64, f64)) -> Self {
        RoadNode::new(x, y, z, width)
    }
}
