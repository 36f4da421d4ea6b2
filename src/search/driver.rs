// src/search/driver.rs
//
// One search loop for every experiment.
//
// HILL CLIMB (lower fitness is better):
//
//   Seed ─► Evaluate ─► [gen 1..=budget] Mutate best ─► Evaluate ─┬─ better? replace best
//                                                                 ├─ Fail   → FailureFound
//                                                                 └─ Error  → EvaluationError
//   budget spent → BudgetExhausted
//
// GENETIC (higher fitness is better):
//
//   Population ─► [gen 1..=budget] Evaluate all ─► track best ─┬─ any Fail  → FailureFound
//                                                              ├─ any Error → EvaluationError
//                                                              └─ tournament → mutate → next population
//
// A candidate that cannot become a scenario (bad route, degenerate or folded
// road) is Rejected: it scores ERROR_FITNESS, is never kept as best and never
// ends the search. A StopHandle ends the search between evaluations; a run in
// flight always completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::events::{EventBus, SearchEvent};
use super::metrics::SearchMetrics;
use super::problem::SearchProblem;
use super::selection::select_parents;
use crate::simulation::{EvaluationSession, Outcome, RunReport, SimulationRunner, ERROR_FITNESS};
use crate::types::{SearchConfig, SearchStrategy};

/// How one evaluation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pass,
    Fail,
    Error,
    /// Never reached the simulator.
    Rejected,
}

impl From<Outcome> for Status {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Pass => Status::Pass,
            Outcome::Fail => Status::Fail,
            Outcome::Error => Status::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    FailureFound,
    EvaluationError,
    BudgetExhausted,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation<I> {
    pub individual: I,
    pub scenario: String,
    pub status: Status,
    pub fitness: f64,
    pub distances: Vec<f64>,
}

impl<I> Evaluation<I> {
    /// Only runs that reached a verdict may become the best individual.
    pub fn is_comparable(&self) -> bool {
        matches!(self.status, Status::Pass | Status::Fail)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport<I> {
    pub best: Option<Evaluation<I>>,
    pub termination: Termination,
    /// Generations started after the seed / initial population.
    pub generations: u32,
    pub evaluations: u64,
}

impl<I> SearchReport<I> {
    pub fn best_fitness(&self) -> Option<f64> {
        self.best.as_ref().map(|b| b.fitness)
    }
}

/// External stop signal; clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct SearchDriver<P: SearchProblem, R: SimulationRunner> {
    problem: P,
    runner: R,
    config: SearchConfig,
    rng: StdRng,
    session: EvaluationSession,
    metrics: SearchMetrics,
    events: EventBus,
    stop: StopHandle,
}

impl<P: SearchProblem, R: SimulationRunner> SearchDriver<P, R> {
    pub fn new(problem: P, runner: R, config: SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let session = EvaluationSession::new(problem.scenario_prefix());
        let events = EventBus::new(config.event_capacity);
        Self {
            problem,
            runner,
            config,
            rng,
            session,
            metrics: SearchMetrics::new(),
            events,
            stop: StopHandle::new(),
        }
    }

    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }

    pub fn drain_events(&mut self) -> Vec<SearchEvent> {
        self.events.drain()
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn run(&mut self) -> SearchReport<P::Individual> {
        info!(
            strategy = ?self.config.strategy,
            budget = self.config.budget,
            seed = ?self.config.seed,
            "search started"
        );
        match self.config.strategy {
            SearchStrategy::HillClimb => self.hill_climb(),
            SearchStrategy::Genetic => self.genetic(),
        }
    }

    fn evaluate(&mut self, individual: P::Individual, generation: u32) -> Evaluation<P::Individual> {
        let name = self.session.next_name();
        self.problem.describe(&individual);
        self.metrics.inc(&self.metrics.evaluations);

        let (status, fitness, distances) = match self.problem.build_scenario(&individual, name.clone()) {
            Err(e) => {
                warn!(scenario = %name, error = %e, "candidate rejected");
                self.events.publish(SearchEvent::Rejected {
                    generation,
                    scenario: name.clone(),
                    reason: e.to_string(),
                });
                (Status::Rejected, ERROR_FITNESS, Vec::new())
            }
            Ok(scenario) => match self.runner.run(&scenario, self.problem.step_budget()) {
                Ok(report) => (Status::from(report.outcome), report.fitness, report.distances),
                Err(e) => {
                    warn!(scenario = %name, error = %e, "simulation failed");
                    let report = RunReport::from(&e);
                    (Status::from(report.outcome), report.fitness, report.distances)
                }
            },
        };

        let counter = match status {
            Status::Pass => &self.metrics.passes,
            Status::Fail => &self.metrics.failures,
            Status::Error => &self.metrics.errors,
            Status::Rejected => &self.metrics.rejections,
        };
        self.metrics.inc(counter);
        self.metrics.add(&self.metrics.simulated_steps, distances.len() as u64);

        debug!(scenario = %name, generation, ?status, fitness, "evaluated");
        self.events.publish(SearchEvent::Evaluated {
            generation,
            scenario: name.clone(),
            status,
            fitness,
            steps: distances.len(),
        });

        Evaluation {
            individual,
            scenario: name,
            status,
            fitness,
            distances,
        }
    }

    fn record_improvement(&mut self, generation: u32, eval: &Evaluation<P::Individual>) {
        self.metrics.inc(&self.metrics.improvements);
        info!(generation, scenario = %eval.scenario, fitness = eval.fitness, "improved fitness");
        self.events.publish(SearchEvent::Improved {
            generation,
            scenario: eval.scenario.clone(),
            fitness: eval.fitness,
        });
    }

    fn finish(
        &mut self,
        best: Option<Evaluation<P::Individual>>,
        termination: Termination,
        generations: u32,
    ) -> SearchReport<P::Individual> {
        let best_fitness = best.as_ref().map(|b| b.fitness);
        info!(?termination, generations, ?best_fitness, evaluations = self.session.evaluations(), "search finished");
        self.events.publish(SearchEvent::Terminated {
            termination,
            generations,
            best_fitness,
        });
        SearchReport {
            best,
            termination,
            generations,
            evaluations: self.session.evaluations(),
        }
    }

    fn hill_climb(&mut self) -> SearchReport<P::Individual> {
        let seed = self.problem.seed();
        let mut best = self.evaluate(seed, 0);
        if best.is_comparable() {
            self.record_improvement(0, &best);
        }

        for generation in 1..=self.config.budget {
            if self.stop.is_stopped() {
                return self.finish(Some(best), Termination::Cancelled, generation - 1);
            }
            self.metrics.inc(&self.metrics.generations);

            let candidate = self.problem.mutate(&best.individual, &mut self.rng);
            let eval = self.evaluate(candidate, generation);
            let status = eval.status;

            let improves = eval.is_comparable() && (!best.is_comparable() || eval.fitness < best.fitness);
            if improves {
                self.record_improvement(generation, &eval);
                best = eval;
            }

            match status {
                Status::Fail => {
                    info!(generation, "failure found, stopping search");
                    return self.finish(Some(best), Termination::FailureFound, generation);
                }
                Status::Error => {
                    warn!(generation, "evaluation error, stopping search");
                    return self.finish(Some(best), Termination::EvaluationError, generation);
                }
                Status::Pass | Status::Rejected => {}
            }
        }

        let budget = self.config.budget;
        self.finish(Some(best), Termination::BudgetExhausted, budget)
    }

    fn genetic(&mut self) -> SearchReport<P::Individual> {
        let size = self.config.population_size;
        let mut population = self.problem.initial_population(size, &mut self.rng);
        if population.is_empty() {
            warn!("empty population, nothing to search");
            return self.finish(None, Termination::BudgetExhausted, 0);
        }

        let mut best: Option<Evaluation<P::Individual>> = None;
        let mut best_score = 0.0;

        for generation in 1..=self.config.budget {
            self.metrics.inc(&self.metrics.generations);
            let mut scores = Vec::with_capacity(population.len());
            let mut statuses = Vec::with_capacity(population.len());

            for individual in &population {
                if self.stop.is_stopped() {
                    return self.finish(best, Termination::Cancelled, generation);
                }
                let eval = self.evaluate(individual.clone(), generation);
                scores.push(eval.fitness);
                statuses.push(eval.status);

                if eval.fitness > best_score {
                    best_score = eval.fitness;
                    self.record_improvement(generation, &eval);
                    best = Some(eval);
                }
            }

            if statuses.contains(&Status::Fail) {
                info!(generation, "failed test found, stopping search");
                return self.finish(best, Termination::FailureFound, generation);
            }
            if statuses.contains(&Status::Error) {
                warn!(generation, "errored test, stopping search");
                return self.finish(best, Termination::EvaluationError, generation);
            }

            let parents = select_parents(&population, &scores, self.config.tournament_size, size, &mut self.rng);
            population = parents
                .iter()
                .map(|p| self.problem.mutate(p, &mut self.rng))
                .collect();
        }

        let budget = self.config.budget;
        self.finish(best, Termination::BudgetExhausted, budget)
    }
}
