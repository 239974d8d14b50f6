//! Minimum splash exposure.

use std::time::Duration;

use crate::timer::{Scheduler, TimerFired, TimerHandle, TimerKind};

#[derive(Debug)]
enum SplashState {
    Idle,
    Running(TimerHandle),
    Elapsed,
    Cancelled,
}

/// One-shot timer guaranteeing the branding splash stays up for
/// `min_duration`, however fast the session becomes ready.
#[derive(Debug)]
pub struct SplashTimer {
    min_duration: Duration,
    state: SplashState,
}

impl SplashTimer {
    pub fn new(min_duration: Duration) -> Self {
        Self {
            min_duration,
            state: SplashState::Idle,
        }
    }

    pub fn min_duration(&self) -> Duration {
        self.min_duration
    }

    /// Arm the timer. Does nothing if it is already running, has elapsed or
    /// was cancelled.
    pub fn start<S: Scheduler + ?Sized>(&mut self, scheduler: &S) {
        if !matches!(self.state, SplashState::Idle) {
            return;
        }
        if self.min_duration.is_zero() {
            self.state = SplashState::Elapsed;
            return;
        }
        let handle = scheduler.schedule(self.min_duration, TimerKind::Splash);
        tracing::debug!(timer = %handle.id(), min_ms = self.min_duration.as_millis() as u64, "splash timer started");
        self.state = SplashState::Running(handle);
    }

    /// Handle an expiry. Returns `true` if this expiry ended the splash.
    pub fn on_fired(&mut self, fired: TimerFired) -> bool {
        match &self.state {
            SplashState::Running(handle) if handle.id() == fired.id => {
                self.state = SplashState::Elapsed;
                tracing::debug!(timer = %fired.id, "splash minimum elapsed");
                true
            }
            _ => false,
        }
    }

    /// Stop the timer if it is still pending. An elapsed splash stays elapsed.
    pub fn cancel(&mut self) {
        match std::mem::replace(&mut self.state, SplashState::Cancelled) {
            SplashState::Running(handle) => {
                tracing::debug!(timer = %handle.id(), "splash timer cancelled");
                handle.cancel();
            }
            SplashState::Elapsed => self.state = SplashState::Elapsed,
            SplashState::Idle | SplashState::Cancelled => {}
        }
    }

    pub fn is_elapsed(&self) -> bool {
        matches!(self.state, SplashState::Elapsed)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SplashState::Running(_))
    }
}
