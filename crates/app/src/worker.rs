//! Background task driving the Session Gate.

use std::sync::Arc;

use crownchat_auth::{SessionNotification, SessionSource};
use crownchat_events::Subscription;
use crownchat_gate::{GateConfig, RenderDecision, SessionGate, TimerFired};
use thiserror::Error;
use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;

use crate::router::{Location, Router, RouterNavigator};
use crate::scheduler::TokioScheduler;

#[derive(Debug, Error)]
pub enum GateWorkerError {
    #[error("gate worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Owns the gate and every input feeding it.
///
/// Session notifications, location changes and timer expiries are handled
/// one at a time by a single `select!` loop, so the gate never sees two
/// inputs concurrently.
pub struct GateWorker {
    gate: SessionGate<TokioScheduler, RouterNavigator>,
    session: Subscription<SessionNotification>,
    location: watch::Receiver<Location>,
    timers: mpsc::UnboundedReceiver<TimerFired>,
    render: watch::Sender<RenderDecision>,
    shutdown: Arc<Notify>,
}

impl GateWorker {
    /// Build the gate against `source` and `router`. Must be called from
    /// within a tokio runtime, since the splash timer starts immediately.
    pub fn new(config: GateConfig, source: &dyn SessionSource, router: &Router) -> Self {
        let (scheduler, timers) = TokioScheduler::channel();
        let mut location = router.watch();
        let initial_area = location.borrow_and_update().area;
        let gate = SessionGate::new(
            config,
            scheduler,
            RouterNavigator::new(router.clone()),
            initial_area,
        );
        let (render, _) = watch::channel(gate.render_decision());

        Self {
            gate,
            session: source.subscribe(),
            location,
            timers,
            render,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Start the worker loop.
    pub fn spawn(self) -> GateHandle {
        let render = self.render.subscribe();
        let shutdown = self.shutdown.clone();
        let task = tokio::spawn(self.run());
        GateHandle {
            render,
            shutdown,
            task: Some(task),
        }
    }

    async fn run(mut self) {
        tracing::info!("gate worker started");

        let mut session_open = true;
        let mut router_open = true;

        loop {
            let decision = tokio::select! {
                biased;

                _ = self.shutdown.notified() => {
                    tracing::info!("gate worker received shutdown signal");
                    break;
                }
                fired = self.timers.recv() => match fired {
                    Some(fired) => self.gate.on_timer(fired),
                    None => break,
                },
                note = self.session.recv(), if session_open => match note {
                    Some(envelope) => {
                        tracing::debug!(sequence = envelope.sequence(), "session notification");
                        self.gate.on_notification(envelope.payload())
                    }
                    None => {
                        tracing::warn!("session source closed; gate keeps its last state");
                        session_open = false;
                        continue;
                    }
                },
                changed = self.location.changed(), if router_open => match changed {
                    Ok(()) => {
                        let area = self.location.borrow_and_update().area;
                        self.gate.on_area_changed(area)
                    }
                    Err(_) => {
                        tracing::warn!("router dropped; area changes no longer observed");
                        router_open = false;
                        continue;
                    }
                },
            };
            self.publish(decision);
        }

        self.gate.teardown();
        tracing::info!("gate worker stopped");
    }

    fn publish(&self, decision: RenderDecision) {
        self.render.send_if_modified(|current| {
            if *current == decision {
                return false;
            }
            *current = decision;
            true
        });
    }
}

/// Handle to a running [`GateWorker`].
///
/// Dropping the handle stops the worker too; [`GateHandle::shutdown`] also
/// waits for it to finish.
#[derive(Debug)]
pub struct GateHandle {
    render: watch::Receiver<RenderDecision>,
    shutdown: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl GateHandle {
    /// What the render layer should show right now.
    pub fn render_decision(&self) -> RenderDecision {
        *self.render.borrow()
    }

    /// Receiver for render decision changes.
    pub fn watch_render(&self) -> watch::Receiver<RenderDecision> {
        self.render.clone()
    }

    /// Stop the worker: the gate is torn down, its timers cancelled and its
    /// session subscription dropped before this returns.
    pub async fn shutdown(mut self) -> Result<(), GateWorkerError> {
        self.shutdown.notify_one();
        match self.task.take() {
            Some(task) => Ok(task.await?),
            None => Ok(()),
        }
    }
}

impl Drop for GateHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            self.shutdown.notify_one();
            task.abort();
        }
    }
}
