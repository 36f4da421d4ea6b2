// src/simulation/mod.rs
//
// Everything on the simulator side of the search boundary. The simulator
// itself is external: it is reached only through the `Simulator` trait.

mod controller;
mod monitor;
mod runner;
mod scenario;
mod session;

pub use controller::{ControllerHandle, ReadySignal, ShutdownSignal, SpeedGovernor};
pub use monitor::{MonitorVerdict, RuntimeMonitor};
pub use runner::{Outcome, RunReport, SimulationRunner, ERROR_FITNESS, FAILURE_FITNESS};
pub use scenario::{build_road, car_following_road, wrap_with_lead_in, Scenario, ScenarioKind};
pub use session::{
    score, EvaluationSession, OracleRunner, ScenarioOracles, SimulationSample, Simulator,
    SimulatorSession, Verdict,
};
