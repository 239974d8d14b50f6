//! Timers on the tokio runtime.

use std::time::Duration;

use crownchat_gate::{Scheduler, TimerFired, TimerHandle, TimerId, TimerKind};
use tokio::sync::mpsc;

/// Each timer is a spawned sleep that posts a [`TimerFired`] into the
/// worker's channel. Cancelling the handle aborts the task.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    fired: mpsc::UnboundedSender<TimerFired>,
}

impl TokioScheduler {
    pub fn new(fired: mpsc::UnboundedSender<TimerFired>) -> Self {
        Self { fired }
    }

    /// Scheduler plus the receiving end its expiries arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TimerFired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, kind: TimerKind) -> TimerHandle {
        let id = TimerId::next();
        let fired = self.fired.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the worker stopped; nothing to deliver to.
            let _ = fired.send(TimerFired { id, kind });
        });
        TimerHandle::new(id, kind, move || task.abort())
    }
}
