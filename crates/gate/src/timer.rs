//! Cancellable one-shot timers.
//!
//! A [`Scheduler`] arms a timer and returns a [`TimerHandle`]. The handle is
//! the cancellation token: calling [`TimerHandle::cancel`] or dropping it
//! disarms the timer. Whoever owns the handle owns the timer's lifetime.
//!
//! Expiry is not a callback. The scheduler delivers a [`TimerFired`] value to
//! the gate's input path, and the gate honours it only if the id matches a
//! handle it still holds. A timer cannot act on state that no longer exists.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Identity of one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Fresh id from the process-wide counter shared by all schedulers.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for TimerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// What a timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Minimum splash exposure.
    Splash,
    /// Debounced redirect.
    Redirect,
}

/// Expiry notice delivered back to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub id: TimerId,
    pub kind: TimerKind,
}

/// Source of one-shot timers.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, kind: TimerKind) -> TimerHandle;
}

impl<S: Scheduler + ?Sized> Scheduler for &S {
    fn schedule(&self, delay: Duration, kind: TimerKind) -> TimerHandle {
        (**self).schedule(delay, kind)
    }
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
    fn schedule(&self, delay: Duration, kind: TimerKind) -> TimerHandle {
        (**self).schedule(delay, kind)
    }
}

type CancelFn = Box<dyn FnOnce() + Send>;

/// Owning handle to an armed timer. Cancels on drop.
pub struct TimerHandle {
    id: TimerId,
    kind: TimerKind,
    cancel: Option<CancelFn>,
}

impl TimerHandle {
    pub fn new(id: TimerId, kind: TimerKind, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            kind,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    /// Disarm the timer. A no-op if it already fired.
    pub fn cancel(mut self) {
        self.disarm();
    }

    fn disarm(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.disarm();
    }
}

impl core::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    deadline: Duration,
    id: TimerId,
    kind: TimerKind,
}

#[derive(Debug, Default)]
struct Clock {
    now: Duration,
    armed: Vec<Armed>,
}

/// Virtual-clock scheduler.
///
/// Time only moves when [`advance`](ManualScheduler::advance) is called.
/// Clones share one clock, so a test can keep a clone while the gate owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<Clock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_clock<R>(&self, f: impl FnOnce(&mut Clock) -> R) -> R {
        let mut clock = self.clock.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut clock)
    }

    /// Time elapsed since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.with_clock(|c| c.now)
    }

    /// Number of timers armed and not yet fired or cancelled.
    pub fn armed_count(&self) -> usize {
        self.with_clock(|c| c.armed.len())
    }

    /// Move the clock forward by `by`, handing every expiry to `deliver` in
    /// deadline order.
    ///
    /// Timers armed by `deliver` itself are honoured if they fall due within
    /// the same window, and timers cancelled by `deliver` are skipped.
    pub fn advance(&self, by: Duration, mut deliver: impl FnMut(TimerFired)) {
        let until = self.now() + by;
        while let Some(fired) = self.pop_due(until) {
            deliver(fired);
        }
        self.with_clock(|c| c.now = until);
    }

    fn pop_due(&self, until: Duration) -> Option<TimerFired> {
        self.with_clock(|c| {
            let idx = c
                .armed
                .iter()
                .enumerate()
                .filter(|(_, a)| a.deadline <= until)
                .min_by_key(|(_, a)| (a.deadline, a.id))
                .map(|(i, _)| i)?;
            let due = c.armed.swap_remove(idx);
            c.now = due.deadline;
            Some(TimerFired {
                id: due.id,
                kind: due.kind,
            })
        })
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, kind: TimerKind) -> TimerHandle {
        let id = TimerId::next();
        self.with_clock(|c| {
            let deadline = c.now + delay;
            c.armed.push(Armed { deadline, id, kind });
        });

        let clock = Arc::clone(&self.clock);
        TimerHandle::new(id, kind, move || {
            let mut clock = clock.lock().unwrap_or_else(PoisonError::into_inner);
            clock.armed.retain(|a| a.id != id);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_in_deadline_order() {
        let clock = ManualScheduler::new();
        let late = clock.schedule(ms(200), TimerKind::Splash);
        let early = clock.schedule(ms(100), TimerKind::Redirect);

        let mut fired = Vec::new();
        clock.advance(ms(250), |f| fired.push(f));

        assert_eq!(
            fired,
            vec![
                TimerFired { id: early.id(), kind: TimerKind::Redirect },
                TimerFired { id: late.id(), kind: TimerKind::Splash },
            ]
        );
        assert_eq!(clock.now(), ms(250));
        assert_eq!(clock.armed_count(), 0);
    }

    #[test]
    fn nothing_fires_before_deadline() {
        let clock = ManualScheduler::new();
        let _t = clock.schedule(ms(100), TimerKind::Redirect);
        let mut fired = Vec::new();
        clock.advance(ms(99), |f| fired.push(f));
        assert!(fired.is_empty());
        clock.advance(ms(1), |f| fired.push(f));
        assert_eq!(fired.len(), 1);
    }

    #[test]
    fn cancel_and_drop_both_disarm() {
        let clock = ManualScheduler::new();
        let a = clock.schedule(ms(10), TimerKind::Splash);
        let b = clock.schedule(ms(10), TimerKind::Redirect);
        assert_eq!(clock.armed_count(), 2);

        a.cancel();
        drop(b);
        assert_eq!(clock.armed_count(), 0);

        let mut fired = Vec::new();
        clock.advance(ms(20), |f| fired.push(f));
        assert!(fired.is_empty());
    }

    #[test]
    fn timers_armed_during_delivery_fire_in_same_window() {
        let clock = ManualScheduler::new();
        let first = clock.schedule(ms(100), TimerKind::Splash);
        let mut held = vec![first];
        let mut fired = Vec::new();

        let inner = clock.clone();
        clock.advance(ms(500), |f| {
            fired.push((inner.now(), f.kind));
            if f.kind == TimerKind::Splash {
                held.push(inner.schedule(ms(100), TimerKind::Redirect));
            }
        });

        assert_eq!(
            fired,
            vec![(ms(100), TimerKind::Splash), (ms(200), TimerKind::Redirect)]
        );
    }
}
