// src/simulation/controller.rs
//
// Boundary to an external driving controller (e.g. a learned lane keeper)
// that runs beside the simulation. The core only relies on two facts: the
// controller eventually reports READY, and it can be told to stop.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::SimulationError;

/// Handed to the controller task; consumed when it reports readiness.
#[derive(Debug)]
pub struct ReadySignal(oneshot::Sender<()>);

impl ReadySignal {
    pub fn notify(self) {
        let _ = self.0.send(());
    }
}

/// Shutdown flag observed by the controller task.
pub type ShutdownSignal = watch::Receiver<bool>;

pub struct ControllerHandle {
    ready: Option<oneshot::Receiver<()>>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    /// Start a controller task. It must call `ReadySignal::notify` once it is
    /// driving and return soon after the shutdown flag turns true.
    pub fn spawn<F, Fut>(controller: F) -> Self
    where
        F: FnOnce(ReadySignal, ShutdownSignal) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(controller(ReadySignal(ready_tx), shutdown_rx));
        Self {
            ready: Some(ready_rx),
            shutdown: shutdown_tx,
            task,
        }
    }

    /// Block until READY, or fail after `timeout`.
    pub async fn wait_ready(&mut self, timeout: Duration) -> Result<(), SimulationError> {
        let Some(ready) = self.ready.take() else {
            return Ok(());
        };
        match tokio::time::timeout(timeout, ready).await {
            Ok(Ok(())) => {
                info!("🚗 External controller ready");
                Ok(())
            }
            Ok(Err(_)) => Err(SimulationError::ControllerUnavailable(
                "controller exited before becoming ready".into(),
            )),
            Err(_) => Err(SimulationError::ControllerUnavailable(format!(
                "not ready after {:?}",
                timeout
            ))),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Ask the controller to stop; abort it if it ignores the request.
    pub async fn terminate(mut self, grace: Duration) {
        let _ = self.shutdown.send(true);
        if tokio::time::timeout(grace, &mut self.task).await.is_err() {
            warn!("Controller ignored shutdown for {:?}, aborting", grace);
            self.task.abort();
        }
    }
}

/// Throttle law of the learned driver: slow down hard once over the limit,
/// back off in sharp steering.
#[derive(Debug, Clone)]
pub struct SpeedGovernor {
    min_speed_kmh: f64,
    max_speed_kmh: f64,
    current_limit_kmh: f64,
}

impl SpeedGovernor {
    pub fn new(min_speed_kmh: f64, max_speed_kmh: f64) -> Self {
        Self {
            min_speed_kmh,
            max_speed_kmh,
            current_limit_kmh: max_speed_kmh,
        }
    }

    pub fn current_limit(&self) -> f64 {
        self.current_limit_kmh
    }

    /// `1 - steering² - (speed / limit)²`, where the limit drops to the
    /// minimum speed whenever the car is above the current limit.
    pub fn throttle(&mut self, steering: f64, speed_kmh: f64) -> f64 {
        self.current_limit_kmh = if speed_kmh > self.current_limit_kmh {
            self.min_speed_kmh
        } else {
            self.max_speed_kmh
        };
        1.0 - steering.powi(2) - (speed_kmh / self.current_limit_kmh).powi(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_controller_ready_then_terminated() {
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);

        let mut handle = ControllerHandle::spawn(move |ready, mut shutdown| async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            ready.notify();
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
            flag.store(true, Ordering::SeqCst);
        });

        handle.wait_ready(Duration::from_secs(5)).await.unwrap();
        assert!(!handle.is_finished());
        handle.terminate(Duration::from_secs(1)).await;
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_controller_never_ready() {
        let mut handle = ControllerHandle::spawn(|ready, _shutdown| async move {
            let _ready = ready;
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        let err = handle.wait_ready(Duration::from_secs(2)).await.unwrap_err();
        assert!(matches!(err, SimulationError::ControllerUnavailable(_)));
        handle.terminate(Duration::from_millis(10)).await;
    }

    #[tokio::test]
    async fn test_controller_exits_early() {
        let mut handle = ControllerHandle::spawn(|ready, _shutdown| async move {
            drop(ready);
        });
        let err = handle.wait_ready(Duration::from_secs(2)).await.unwrap_err();
        assert!(err.to_string().contains("exited"));
    }

    #[test]
    fn test_governor_throttle() {
        let mut gov = SpeedGovernor::new(5.0, 30.0);
        let t = gov.throttle(0.0, 15.0);
        assert!((t - 0.75).abs() < 1e-12);
        assert_eq!(gov.current_limit(), 30.0);

        // Over the limit: limit collapses to min speed, throttle goes negative.
        let t = gov.throttle(0.1, 35.0);
        assert_eq!(gov.current_limit(), 5.0);
        assert!(t < 0.0);

        // Still above the (now lowered) limit.
        gov.throttle(0.0, 20.0);
        assert_eq!(gov.current_limit(), 5.0);
        gov.throttle(0.0, 4.0);
        assert_eq!(gov.current_limit(), 30.0);
    }
}
