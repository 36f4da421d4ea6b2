// src/simulation/monitor.rs
//
// Optional runtime monitor: a background task polls oracles on a fixed
// interval and resolves a one-shot verdict when one fires. The main flow
// keeps doing bookkeeping and peeks at the verdict without blocking.
//
// This is the only concurrency around a run; it never evaluates candidates
// in parallel.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::error::SimulationError;
use crate::oracles::Oracle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorVerdict {
    pub passed: bool,
    pub message: String,
}

pub struct RuntimeMonitor {
    task: JoinHandle<()>,
    verdict: oneshot::Receiver<MonitorVerdict>,
}

impl RuntimeMonitor {
    /// Poll `failures` then `successes` every `period`. After `max_polls`
    /// polls without a hit the monitor gives up with a failing verdict.
    /// Must be called inside a tokio runtime.
    pub fn spawn(
        failures: Vec<Box<dyn Oracle>>,
        successes: Vec<Box<dyn Oracle>>,
        period: Duration,
        max_polls: Option<u32>,
    ) -> Self {
        let (tx, rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut polls = 0u32;

            let verdict = loop {
                ticker.tick().await;
                polls += 1;

                if let Some(o) = failures.iter().find(|o| o.check()) {
                    break MonitorVerdict {
                        passed: false,
                        message: o.message(),
                    };
                }
                if let Some(o) = successes.iter().find(|o| o.check()) {
                    break MonitorVerdict {
                        passed: true,
                        message: o.message(),
                    };
                }
                if max_polls.is_some_and(|max| polls >= max) {
                    break MonitorVerdict {
                        passed: false,
                        message: format!("monitor timed out after {} polls", polls),
                    };
                }
            };

            debug!(passed = verdict.passed, polls, message = %verdict.message, "runtime monitor finished");
            // The receiver may already be gone; nothing left to report to.
            let _ = tx.send(verdict);
        });

        Self { task, verdict: rx }
    }

    /// Non-blocking peek at the verdict.
    pub fn try_verdict(&mut self) -> Option<MonitorVerdict> {
        self.verdict.try_recv().ok()
    }

    pub async fn wait(mut self) -> Result<MonitorVerdict, SimulationError> {
        (&mut self.verdict)
            .await
            .map_err(|_| SimulationError::Simulator("runtime monitor stopped without a verdict".into()))
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RuntimeMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}
