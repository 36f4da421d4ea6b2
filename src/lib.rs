// src/lib.rs
//
// Search-based generation of driving scenarios.
//
//   trajectory ──► road ──► simulation::Scenario ──► SimulationRunner ──► oracles
//        ▲                                                                  │
//        └────────────── search (mutation, selection, driver) ◄─────────────┘
//
// The simulator is external and reached only through `simulation::Simulator`.

pub mod config;
pub mod error;
pub mod geometry;
pub mod oracles;
pub mod road;
pub mod search;
pub mod simulation;
pub mod trajectory;
pub mod types;

pub use error::{ConfigError, RoadError, RouteError, ScenarioError, SimulationError};
pub use types::Config;
