// src/oracles/mod.rs
//
// Pass/fail predicates polled once per simulated step.
//
// Oracles never poll the simulator themselves. Whoever drives the simulation
// publishes the latest vehicle sample into a `watch` channel; every oracle
// holds a receiver and reads whatever sample is current when `check()` runs.
//
//   simulator step ──► StatePublisher::publish ──► watch ──► Oracle::check
//
// An oracle is built per scenario and dropped with it.

mod damaged;
mod out_of_bounds;
mod target_area;

pub use damaged::DamagedOracle;
pub use out_of_bounds::OutOfBoundsOracle;
pub use target_area::TargetAreaOracle;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::geometry::Point3;

/// One sample of the ego vehicle as reported by its sensors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub position: Point3,
    /// Identifiers of parts reporting damage; empty when intact.
    pub damaged_parts: Vec<String>,
}

impl VehicleState {
    pub fn at(position: Point3) -> Self {
        Self {
            position,
            damaged_parts: Vec::new(),
        }
    }

    pub fn is_damaged(&self) -> bool {
        !self.damaged_parts.is_empty()
    }
}

/// Read side of the vehicle-state feed.
pub type StateFeed = watch::Receiver<VehicleState>;

/// Write side of the vehicle-state feed.
#[derive(Debug)]
pub struct StatePublisher {
    tx: watch::Sender<VehicleState>,
}

impl StatePublisher {
    pub fn publish(&self, state: VehicleState) {
        // send_replace never fails, even with every receiver dropped.
        self.tx.send_replace(state);
    }

    pub fn subscribe(&self) -> StateFeed {
        self.tx.subscribe()
    }

    pub fn latest(&self) -> VehicleState {
        self.tx.borrow().clone()
    }
}

/// Create a feed seeded with `initial`.
pub fn state_feed(initial: VehicleState) -> (StatePublisher, StateFeed) {
    let (tx, rx) = watch::channel(initial);
    (StatePublisher { tx }, rx)
}

/// A boolean predicate over live simulation state.
pub trait Oracle: Send + Sync {
    fn name(&self) -> &'static str;

    /// Evaluate against the latest sample. Repeated `true` results are
    /// idempotent; oracles keep no edge state.
    fn check(&self) -> bool;

    /// Human-readable description of what a `true` check means.
    fn message(&self) -> String {
        format!("{} oracle triggered", self.name())
    }
}
