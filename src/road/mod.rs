// src/road/mod.rs
//
// Road model: centerline nodes → edge sequences → polygons.
//
//   RoadNode[]  ──RoadPoints::from_centerline──►  {left, right, middle}
//               ──RoadPolygon::from_points─────►  segment quads, road, lanes
//
// RoadPolygon::is_valid() is the "road does not fold or self-overlap" check;
// the right-lane polygon backs the out-of-bounds oracle.

mod markings;
mod node;
mod road_points;
mod road_polygon;

pub use markings::{lane_marking, MARKING_OFFSET, MARKING_SAMPLING_UNIT, MARKING_WIDTH};
pub use node::RoadNode;
pub use road_points::RoadPoints;
pub use road_polygon::{RoadPolygon, RoadViolation};
