// src/search/metrics.rs
//
// Search observability. Counts every evaluation by how it ended, plus
// improvements and generations, so a run can be summarised without
// replaying its event log.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct SearchMetrics {
    pub evaluations: Arc<AtomicU64>,
    pub passes: Arc<AtomicU64>,
    pub failures: Arc<AtomicU64>,
    pub errors: Arc<AtomicU64>,
    pub rejections: Arc<AtomicU64>,
    pub improvements: Arc<AtomicU64>,
    pub generations: Arc<AtomicU64>,
    pub simulated_steps: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl Default for SearchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchMetrics {
    pub fn new() -> Self {
        Self {
            evaluations: Arc::new(AtomicU64::new(0)),
            passes: Arc::new(AtomicU64::new(0)),
            failures: Arc::new(AtomicU64::new(0)),
            errors: Arc::new(AtomicU64::new(0)),
            rejections: Arc::new(AtomicU64::new(0)),
            improvements: Arc::new(AtomicU64::new(0)),
            generations: Arc::new(AtomicU64::new(0)),
            simulated_steps: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, counter: &AtomicU64, amount: u64) {
        counter.fetch_add(amount, Ordering::Relaxed);
    }

    pub fn evaluations_per_minute(&self) -> f64 {
        let evals = self.evaluations.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            evals as f64 * 60.0 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            evaluations: self.evaluations.load(Ordering::Relaxed),
            passes: self.passes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            improvements: self.improvements.load(Ordering::Relaxed),
            generations: self.generations.load(Ordering::Relaxed),
            simulated_steps: self.simulated_steps.load(Ordering::Relaxed),
            evaluations_per_minute: self.evaluations_per_minute(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub evaluations: u64,
    pub passes: u64,
    pub failures: u64,
    pub errors: u64,
    pub rejections: u64,
    pub improvements: u64,
    pub generations: u64,
    pub simulated_steps: u64,
    pub evaluations_per_minute: f64,
    pub elapsed_secs: f64,
}
