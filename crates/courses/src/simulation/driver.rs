//! Drives a [`TickController`] on a fixed tokio cadence.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::controller::TickController;
use super::state::{SimulationEvent, SimulationPhase, SimulationState};
use super::summary::SessionSummary;
use crate::config::SimulationConfig;
use crate::errors::SimulationError;
use crate::models::{CourseDefinition, LatLng};

/// A running simulation: a background task ticking a controller and
/// publishing every event on an unbounded channel.
///
/// Dropping the driver cancels the ticking task.
pub struct SimulationDriver {
    controller: Arc<Mutex<TickController>>,
    fixes: watch::Sender<Option<LatLng>>,
    task: JoinHandle<()>,
}

fn lock(controller: &Mutex<TickController>) -> MutexGuard<'_, TickController> {
    controller.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimulationDriver {
    /// Starts `course` and spawns the ticking task on the current runtime.
    pub fn start(
        config: SimulationConfig,
        course: Arc<CourseDefinition>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SimulationEvent>), SimulationError> {
        let tick_interval = config.tick_interval;
        let mut controller = TickController::new(config);
        let initial = controller.start(course)?.clone();

        let controller = Arc::new(Mutex::new(controller));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (fixes, fix_rx) = watch::channel(None);

        let _ = event_tx.send(SimulationEvent::Snapshot(initial));
        let task = tokio::spawn(run_ticks(
            Arc::clone(&controller),
            tick_interval,
            fix_rx,
            event_tx,
        ));

        Ok((
            Self {
                controller,
                fixes,
                task,
            },
            event_rx,
        ))
    }

    /// Hands the latest GPS sample to the next tick. Samples are consumed once;
    /// a tick without a fresh sample advances no distance in live mode.
    pub fn push_fix(&self, fix: LatLng) {
        self.fixes.send_replace(Some(fix));
    }

    pub fn pause(&self) -> Result<(), SimulationError> {
        lock(&self.controller).pause()
    }

    pub fn resume(&self) -> Result<(), SimulationError> {
        lock(&self.controller).resume()
    }

    pub fn phase(&self) -> SimulationPhase {
        lock(&self.controller).phase()
    }

    pub fn snapshot(&self) -> Option<SimulationState> {
        lock(&self.controller).snapshot().cloned()
    }

    /// Summary of the finished run, whether stopped manually or automatically.
    pub fn summary(&self) -> Option<SessionSummary> {
        lock(&self.controller).last_summary().cloned()
    }

    /// Stops the run and cancels the ticking task.
    ///
    /// Safe to call repeatedly; only the first call that actually stops an
    /// active run returns a summary.
    pub fn stop(&self) -> Option<SessionSummary> {
        let summary = lock(&self.controller).stop();
        self.task.abort();
        summary
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_ticks(
    controller: Arc<Mutex<TickController>>,
    tick_interval: std::time::Duration,
    mut fixes: watch::Receiver<Option<LatLng>>,
    events: mpsc::UnboundedSender<SimulationEvent>,
) {
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;

        let fix = if fixes.has_changed().unwrap_or(false) {
            *fixes.borrow_and_update()
        } else {
            None
        };

        let (batch, auto_stopped) = {
            let mut controller = lock(&controller);
            let batch = controller.tick(fix);
            let auto_stopped = batch.contains(&SimulationEvent::AutoStop);
            if auto_stopped {
                controller.stop();
            }
            (batch, auto_stopped)
        };

        for event in batch {
            // a dropped receiver only means nobody is listening any more
            let _ = events.send(event);
        }

        if auto_stopped {
            tracing::info!("Simulation auto-stopped after completion");
            break;
        }
    }
}
