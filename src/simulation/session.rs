// src/simulation/session.rs
//
// Stepped execution of one scenario against an external simulator.
//
//   OracleRunner::run
//     ├─ SimulatorSession::open      (scoped: closed on every exit path)
//     ├─ loop budget times
//     │    ├─ step simulator → SimulationSample
//     │    ├─ publish sample into the oracle feeds
//     │    ├─ record one measurement
//     │    └─ damage → out-of-bounds → target  (first hit ends the run)
//     └─ budget spent → SimulationError::Timeout
//
// EvaluationSession replaces a process-wide test counter: it names scenarios
// and counts evaluations for exactly one search.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::runner::{Outcome, RunReport, SimulationRunner};
use super::scenario::{Scenario, ScenarioKind};
use crate::error::SimulationError;
use crate::oracles::{
    state_feed, DamagedOracle, Oracle, OutOfBoundsOracle, StatePublisher, TargetAreaOracle,
    VehicleState,
};

/// What the simulator reports after each step.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSample {
    pub ego: VehicleState,
    pub lead: Option<VehicleState>,
}

/// Minimal driver for a stateful simulator that runs one scenario at a time.
pub trait Simulator {
    /// Load and start `scenario`, paused at t = 0.
    fn open(&mut self, scenario: &Scenario) -> Result<(), SimulationError>;

    /// Advance `ticks` physics ticks and poll the vehicles.
    fn step(&mut self, ticks: u32) -> Result<SimulationSample, SimulationError>;

    /// Tear the scenario down. Must be safe to call after a failed step.
    fn close(&mut self);
}

/// An open scenario. Dropping it closes the simulator side.
pub struct SimulatorSession<'a, S: Simulator> {
    simulator: &'a mut S,
}

impl<'a, S: Simulator> SimulatorSession<'a, S> {
    pub fn open(simulator: &'a mut S, scenario: &Scenario) -> Result<Self, SimulationError> {
        if let Err(e) = simulator.open(scenario) {
            // Half-loaded scenarios still need cleanup.
            simulator.close();
            return Err(e);
        }
        Ok(Self { simulator })
    }

    pub fn step(&mut self, ticks: u32) -> Result<SimulationSample, SimulationError> {
        self.simulator.step(ticks)
    }
}

impl<S: Simulator> Drop for SimulatorSession<'_, S> {
    fn drop(&mut self) {
        self.simulator.close();
    }
}

/// Which oracle ended a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Damaged,
    OutOfBounds,
    TargetReached,
}

/// The oracles of one scenario plus the feeds that drive them.
pub struct ScenarioOracles {
    ego_feed: StatePublisher,
    lead_feed: StatePublisher,
    ego_damaged: DamagedOracle,
    lead_damaged: Option<DamagedOracle>,
    out_of_bounds: OutOfBoundsOracle,
    target: TargetAreaOracle,
}

impl ScenarioOracles {
    pub fn for_scenario(scenario: &Scenario) -> Self {
        let (ego_feed, ego_rx) = state_feed(VehicleState::at(scenario.ego_start));
        let lead_initial = scenario.lead_start.map(VehicleState::at).unwrap_or_default();
        let (lead_feed, lead_rx) = state_feed(lead_initial);

        Self {
            ego_damaged: DamagedOracle::new(ego_feed.subscribe()),
            lead_damaged: scenario.has_lead().then(|| DamagedOracle::new(lead_rx)),
            out_of_bounds: OutOfBoundsOracle::new(Arc::clone(&scenario.road), ego_feed.subscribe()),
            target: TargetAreaOracle::new(scenario.target, scenario.target_radius, ego_rx),
            ego_feed,
            lead_feed,
        }
    }

    pub fn publish(&self, sample: &SimulationSample) {
        self.ego_feed.publish(sample.ego.clone());
        if let Some(lead) = &sample.lead {
            self.lead_feed.publish(lead.clone());
        }
    }

    /// Damage first: a crash that also leaves the lane is still a crash.
    pub fn check(&self) -> Option<Verdict> {
        let damaged = self.ego_damaged.check()
            || self.lead_damaged.as_ref().is_some_and(|o| o.check());
        if damaged {
            return Some(Verdict::Damaged);
        }
        if self.out_of_bounds.check() {
            return Some(Verdict::OutOfBounds);
        }
        if self.target.check() {
            return Some(Verdict::TargetReached);
        }
        None
    }
}

/// Fitness of a finished run.
///
/// Car-following minimises the closest approach to the lead vehicle, so any
/// failure is the best possible value. Procedural roads maximise deviation
/// from the lane centre and keep it as the score of failing runs too.
pub fn score(kind: ScenarioKind, verdict: Verdict, distances: Vec<f64>) -> RunReport {
    let min = distances.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = distances.iter().copied().reduce(f64::max).unwrap_or(0.0);
    match (kind, verdict) {
        (_, Verdict::Damaged) => RunReport::failure(distances),
        (ScenarioKind::CarFollowing, Verdict::OutOfBounds) => RunReport::failure(distances),
        (ScenarioKind::CarFollowing, Verdict::TargetReached) => {
            RunReport::new(Outcome::Pass, min, distances)
        }
        (ScenarioKind::ProceduralRoad, Verdict::OutOfBounds) => {
            RunReport::new(Outcome::Fail, max, distances)
        }
        (ScenarioKind::ProceduralRoad, Verdict::TargetReached) => {
            RunReport::new(Outcome::Pass, max, distances)
        }
    }
}

/// Simulation runner that checks oracles after every simulator step.
pub struct OracleRunner<S: Simulator> {
    simulator: S,
}

impl<S: Simulator> OracleRunner<S> {
    pub fn new(simulator: S) -> Self {
        Self { simulator }
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    pub fn into_inner(self) -> S {
        self.simulator
    }
}

impl<S: Simulator> SimulationRunner for OracleRunner<S> {
    fn run(&mut self, scenario: &Scenario, budget: u32) -> Result<RunReport, SimulationError> {
        let mut session = SimulatorSession::open(&mut self.simulator, scenario)?;
        let oracles = ScenarioOracles::for_scenario(scenario);
        let mut distances = Vec::with_capacity(budget as usize);

        for step in 1..=budget {
            let sample = session.step(scenario.ticks_per_step)?;
            oracles.publish(&sample);
            distances.push(scenario.measure(&sample));

            if let Some(verdict) = oracles.check() {
                let report = score(scenario.kind, verdict, distances);
                debug!(
                    scenario = %scenario.name,
                    step,
                    ?verdict,
                    fitness = report.fitness,
                    "run finished"
                );
                return Ok(report);
            }
        }

        warn!(scenario = %scenario.name, budget, "run timed out");
        Err(SimulationError::Timeout { steps: budget })
    }
}

/// Per-search evaluation context: scenario naming and counting.
#[derive(Debug, Clone)]
pub struct EvaluationSession {
    prefix: String,
    evaluations: u64,
}

impl EvaluationSession {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            evaluations: 0,
        }
    }

    /// Reserve the next scenario name, `<prefix>_<n>` with n starting at 1.
    pub fn next_name(&mut self) -> String {
        self.evaluations += 1;
        format!("{}_{}", self.prefix, self.evaluations)
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }
}

impl Drop for EvaluationSession {
    fn drop(&mut self) {
        if self.evaluations > 0 {
            info!(prefix = %self.prefix, evaluations = self.evaluations, "evaluation session closed");
        }
    }
}
