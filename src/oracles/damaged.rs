// src/oracles/damaged.rs

use super::{Oracle, StateFeed};

/// Any reported damage counts; there is no severity threshold.
#[derive(Debug)]
pub struct DamagedOracle {
    feed: StateFeed,
}

impl DamagedOracle {
    pub fn new(feed: StateFeed) -> Self {
        Self { feed }
    }
}

impl Oracle for DamagedOracle {
    fn name(&self) -> &'static str {
        "damaged"
    }

    fn message(&self) -> String {
        "vehicle has damaged components".to_string()
    }

    fn check(&self) -> bool {
        self.feed.borrow().is_damaged()
    }
}
