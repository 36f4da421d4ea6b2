// src/oracles/out_of_bounds.rs
//
// "In bounds" means inside the RIGHT lane of a two-lane road. Drifting into
// the left (oncoming) lane is already an out-of-bounds episode, as is leaving
// the asphalt. Multi-lane roads are out of scope.

use std::sync::Arc;

use super::{Oracle, StateFeed};
use crate::road::RoadPolygon;

#[derive(Debug)]
pub struct OutOfBoundsOracle {
    road: Arc<RoadPolygon>,
    feed: StateFeed,
}

impl OutOfBoundsOracle {
    pub fn new(road: Arc<RoadPolygon>, feed: StateFeed) -> Self {
        Self { road, feed }
    }
}

impl Oracle for OutOfBoundsOracle {
    fn name(&self) -> &'static str {
        "out_of_bounds"
    }

    fn message(&self) -> String {
        "vehicle left the lane".to_string()
    }

    fn check(&self) -> bool {
        let position = self.feed.borrow().position.xy();
        !self.road.in_right_lane(position)
    }
}
