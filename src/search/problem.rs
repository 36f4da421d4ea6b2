// src/search/problem.rs
//
// What is being searched. The driver is generic over a SearchProblem, so the
// car-following and procedural-road experiments share one search loop and
// differ only in how individuals are seeded, mutated and turned into
// scenarios.

use std::fmt::Debug;

use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, warn};

use super::individual::{CarFollowingIndividual, RoadIndividual};
use super::mutation::{generate_random_road, CarFollowingMutator, RoadMutator};
use crate::error::{ConfigError, ScenarioError};
use crate::simulation::Scenario;
use crate::types::{CarFollowingConfig, ProceduralRoadConfig, SimulationConfig};

pub trait SearchProblem {
    type Individual: Clone + Debug + Serialize;

    /// Scenario names are `<prefix>_<n>`.
    fn scenario_prefix(&self) -> &str;

    /// Oracle-checked steps per run before it counts as timed out.
    fn step_budget(&self) -> u32;

    /// Deterministic starting individual.
    fn seed(&self) -> Self::Individual;

    fn initial_population(&self, size: usize, rng: &mut StdRng) -> Vec<Self::Individual>;

    fn mutate(&self, individual: &Self::Individual, rng: &mut StdRng) -> Self::Individual;

    fn build_scenario(&self, individual: &Self::Individual, name: String) -> Result<Scenario, ScenarioError>;

    /// Logged right before an individual is evaluated.
    fn describe(&self, _individual: &Self::Individual) {}
}

// ============================================================================
// CAR-FOLLOWING
// ============================================================================

pub struct CarFollowingProblem {
    cf: CarFollowingConfig,
    sim: SimulationConfig,
    mutator: CarFollowingMutator,
}

impl CarFollowingProblem {
    pub fn new(cf: CarFollowingConfig, sim: SimulationConfig) -> Result<Self, ConfigError> {
        let mutator = CarFollowingMutator::new(&cf)?;
        Ok(Self { cf, sim, mutator })
    }
}

impl SearchProblem for CarFollowingProblem {
    type Individual = CarFollowingIndividual;

    fn scenario_prefix(&self) -> &str {
        "car_following"
    }

    fn step_budget(&self) -> u32 {
        self.sim.car_following_steps
    }

    fn seed(&self) -> CarFollowingIndividual {
        CarFollowingIndividual::seed(&self.cf)
    }

    /// The seed plus mutants of it.
    fn initial_population(&self, size: usize, rng: &mut StdRng) -> Vec<CarFollowingIndividual> {
        let seed = self.seed();
        (0..size)
            .map(|i| if i == 0 { seed.clone() } else { self.mutator.mutate(&seed, rng) })
            .collect()
    }

    fn mutate(&self, individual: &CarFollowingIndividual, rng: &mut StdRng) -> CarFollowingIndividual {
        self.mutator.mutate(individual, rng)
    }

    fn build_scenario(&self, individual: &CarFollowingIndividual, name: String) -> Result<Scenario, ScenarioError> {
        Scenario::car_following(name, &self.cf, &self.sim, &individual.waypoints)
    }

    fn describe(&self, individual: &CarFollowingIndividual) {
        debug!(
            times = ?individual.arrival_times(),
            speeds_kmh = ?individual.speed_profile(),
            "lead vehicle script"
        );
    }
}

// ============================================================================
// PROCEDURAL ROAD
// ============================================================================

pub struct ProceduralRoadProblem {
    pr: ProceduralRoadConfig,
    sim: SimulationConfig,
    mutator: RoadMutator,
    max_attempts: usize,
}

impl ProceduralRoadProblem {
    pub fn new(pr: ProceduralRoadConfig, sim: SimulationConfig, max_attempts: usize) -> Self {
        let mutator = RoadMutator::new(pr.clone());
        Self {
            pr,
            sim,
            mutator,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn is_buildable(&self, individual: &RoadIndividual) -> bool {
        self.build_scenario(individual, "validity_check".to_string()).is_ok()
    }

    /// Draw random roads until one is valid. The last draw is returned even
    /// when every attempt failed; it will be rejected at evaluation.
    pub fn random_valid_road(&self, rng: &mut StdRng) -> RoadIndividual {
        let mut road = generate_random_road(self.pr.segment_count, &self.pr, rng);
        for attempt in 1..self.max_attempts {
            if self.is_buildable(&road) {
                debug!(attempt, "valid random road drawn");
                return road;
            }
            road = generate_random_road(self.pr.segment_count, &self.pr, rng);
        }
        if !self.is_buildable(&road) {
            warn!(attempts = self.max_attempts, "no valid random road found, keeping last draw");
        }
        road
    }
}

impl SearchProblem for ProceduralRoadProblem {
    type Individual = RoadIndividual;

    fn scenario_prefix(&self) -> &str {
        "pcg_test"
    }

    fn step_budget(&self) -> u32 {
        self.sim.procedural_road_steps
    }

    fn seed(&self) -> RoadIndividual {
        RoadIndividual::seed(&self.pr)
    }

    fn initial_population(&self, size: usize, rng: &mut StdRng) -> Vec<RoadIndividual> {
        (0..size).map(|_| self.random_valid_road(rng)).collect()
    }

    fn mutate(&self, individual: &RoadIndividual, rng: &mut StdRng) -> RoadIndividual {
        self.mutator.mutate(individual, rng)
    }

    fn build_scenario(&self, individual: &RoadIndividual, name: String) -> Result<Scenario, ScenarioError> {
        Scenario::procedural_road(name, &self.pr, &self.sim, &individual.segments)
    }

    fn describe(&self, individual: &RoadIndividual) {
        debug!(road = ?individual.segments, "road under test");
    }
}
