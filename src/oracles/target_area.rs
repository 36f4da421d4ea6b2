// src/oracles/target_area.rs

use super::{Oracle, StateFeed};
use crate::geometry::Point3;

/// True while the vehicle is strictly closer than `radius` to the target.
#[derive(Debug)]
pub struct TargetAreaOracle {
    target: Point3,
    radius: f64,
    feed: StateFeed,
}

impl TargetAreaOracle {
    pub fn new(target: Point3, radius: f64, feed: StateFeed) -> Self {
        Self { target, radius, feed }
    }

    pub fn distance_to_target(&self) -> f64 {
        self.feed.borrow().position.distance(self.target)
    }
}

impl Oracle for TargetAreaOracle {
    fn name(&self) -> &'static str {
        "target_area"
    }

    fn message(&self) -> String {
        "target position reached".to_string()
    }

    fn check(&self) -> bool {
        self.distance_to_target() < self.radius
    }
}
