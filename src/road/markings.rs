// src/road/markings.rs

use crate::geometry::{offset_polyline, resample, OffsetSide, Point2};

use super::node::RoadNode;

/// Lateral distance of a lane marking from the centerline (metres).
pub const MARKING_OFFSET: f64 = 3.9;

/// Markings are resampled coarser than the road so the renderer can
/// interpolate between nodes.
pub const MARKING_SAMPLING_UNIT: f64 = 10.0;

pub const MARKING_WIDTH: f64 = 0.1;

/// Marking line parallel to the centerline on `side`, as flat road nodes
/// `(x, y, 0, 0.1)` ordered along the road direction.
pub fn lane_marking(road_nodes: &[RoadNode], side: OffsetSide, offset: f64, unit: f64) -> Vec<RoadNode> {
    let spine: Vec<Point2> = road_nodes.iter().map(RoadNode::xy).collect();
    if spine.len() < 2 {
        return Vec::new();
    }
    let offset_line = offset_polyline(&spine, offset, side);
    resample(&offset_line, unit)
        .into_iter()
        .map(|p| RoadNode::new(p.x, p.y, 0.0, MARKING_WIDTH))
        .collect()
}
