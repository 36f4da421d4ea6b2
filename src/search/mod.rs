// src/search/mod.rs
//
// Search over scenario parameters.
//
//   SearchProblem ──seed/mutate──► Individual ──build──► Scenario
//        ▲                                                   │
//        │                                         SimulationRunner::run
//        │                                                   ▼
//   SearchDriver ◄───────────── Status + fitness ◄──── RunReport
//
// The driver owns the loop and the termination rules; problems own the
// representation. Metrics and events are side channels for logging and
// reporting and never influence the search.

mod driver;
mod events;
mod individual;
mod metrics;
mod mutation;
mod problem;
mod selection;

pub use driver::{Evaluation, SearchDriver, SearchReport, Status, StopHandle, Termination};
pub use events::{EventBus, SearchEvent};
pub use individual::{CarFollowingIndividual, RoadIndividual};
pub use metrics::{MetricsSummary, SearchMetrics};
pub use mutation::{
    generate_random_road, generate_random_segment, CarFollowingMutator, RoadMutator, NODE_ARITY,
};
pub use problem::{CarFollowingProblem, ProceduralRoadProblem, SearchProblem};
pub use selection::{select_parents, tournament};
