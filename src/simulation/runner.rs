// src/simulation/runner.rs
//
// The boundary between search and simulation.
//
// A runner executes ONE scenario to completion and reports how it ended.
// Fitness sentinels are negative so they rank below every real distance:
//
//   -1.0  failure found (damage / out of bounds)  → search stops, success
//   -2.0  timeout or simulator error              → never treated as a pass

use serde::{Deserialize, Serialize};

use super::scenario::Scenario;
use crate::error::SimulationError;

pub const FAILURE_FITNESS: f64 = -1.0;
pub const ERROR_FITNESS: f64 = -2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub outcome: Outcome,
    pub fitness: f64,
    /// One measurement per simulated step, in step order.
    pub distances: Vec<f64>,
}

impl RunReport {
    pub fn new(outcome: Outcome, fitness: f64, distances: Vec<f64>) -> Self {
        Self {
            outcome,
            fitness,
            distances,
        }
    }

    pub fn failure(distances: Vec<f64>) -> Self {
        Self::new(Outcome::Fail, FAILURE_FITNESS, distances)
    }

    pub fn error(distances: Vec<f64>) -> Self {
        Self::new(Outcome::Error, ERROR_FITNESS, distances)
    }

    pub fn min_distance(&self) -> Option<f64> {
        self.distances.iter().copied().reduce(f64::min)
    }

    pub fn max_distance(&self) -> Option<f64> {
        self.distances.iter().copied().reduce(f64::max)
    }
}

impl From<&SimulationError> for RunReport {
    fn from(_: &SimulationError) -> Self {
        RunReport::error(Vec::new())
    }
}

/// Runs one scenario at a time against a single stateful simulator.
///
/// `budget` is the number of oracle-checked steps before the run counts as
/// timed out.
pub trait SimulationRunner {
    fn run(&mut self, scenario: &Scenario, budget: u32) -> Result<RunReport, SimulationError>;
}

impl<F> SimulationRunner for F
where
    F: FnMut(&Scenario, u32) -> Result<RunReport, SimulationError>,
{
    fn run(&mut self, scenario: &Scenario, budget: u32) -> Result<RunReport, SimulationError> {
        self(scenario, budget)
    }
}
