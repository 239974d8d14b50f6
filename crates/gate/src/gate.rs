//! The Session Gate state machine.
//!
//! Every input (session state, area change, timer expiry) runs the same
//! synchronous evaluation:
//!
//! 1. Pick a [`RenderDecision`]. Anything but `ShowContent` stops here.
//! 2. Build the current [`Signature`].
//! 3. If it matches the last observed signature, nothing is left to do.
//! 4. Otherwise resolve a redirect target and, if there is one, arm it behind
//!    the debounce delay, replacing any redirect already pending.
//!
//! The navigator is only called when a redirect timer that the gate still
//! holds expires, so dropping the gate makes every pending effect unreachable.

use serde::{Deserialize, Serialize};

use crownchat_auth::{SessionNotification, SessionState};

use crate::area::AreaCategory;
use crate::config::GateConfig;
use crate::navigator::Navigator;
use crate::render::{select_render, RenderDecision};
use crate::splash::SplashTimer;
use crate::timer::{Scheduler, TimerFired, TimerHandle, TimerKind};

/// The pair that decides whether the user is in the right area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub authenticated: bool,
    pub area: AreaCategory,
}

impl Signature {
    pub fn new(authenticated: bool, area: AreaCategory) -> Self {
        Self {
            authenticated,
            area,
        }
    }
}

/// Where a user with this signature must be sent, if anywhere.
pub fn redirect_target(signature: Signature) -> Option<AreaCategory> {
    match (signature.authenticated, signature.area) {
        (true, AreaCategory::AuthArea) => Some(AreaCategory::AppArea),
        (false, AreaCategory::AppArea) => Some(AreaCategory::AuthArea),
        _ => None,
    }
}

#[derive(Debug)]
struct PendingRedirect {
    target: AreaCategory,
    signature: Signature,
    timer: TimerHandle,
}

/// Auth gate for the app shell.
///
/// Owns its splash timer and at most one pending redirect. Both are
/// cancelled when the gate is torn down or dropped.
pub struct SessionGate<S: Scheduler, N: Navigator> {
    config: GateConfig,
    scheduler: S,
    navigator: N,
    splash: SplashTimer,
    session_ready: bool,
    authenticated: bool,
    area: AreaCategory,
    last_observed: Option<Signature>,
    pending: Option<PendingRedirect>,
    render: RenderDecision,
}

impl<S: Scheduler, N: Navigator> SessionGate<S, N> {
    /// Create the gate and start the splash timer.
    pub fn new(config: GateConfig, scheduler: S, navigator: N, initial_area: AreaCategory) -> Self {
        let mut gate = Self {
            config,
            scheduler,
            navigator,
            splash: SplashTimer::new(config.splash_min),
            session_ready: false,
            authenticated: false,
            area: initial_area,
            last_observed: None,
            pending: None,
            render: RenderDecision::ShowSplash,
        };
        gate.splash.start(&gate.scheduler);
        tracing::info!(
            area = %initial_area,
            splash_ms = config.splash_min.as_millis() as u64,
            debounce_ms = config.redirect_debounce.as_millis() as u64,
            "session gate started"
        );
        gate.evaluate();
        gate
    }

    /// Feed a session state. Readiness is sticky: once the source has
    /// delivered its first terminal state the gate never goes back to waiting.
    ///
    /// Only ready states say anything about the identity. A not-ready state
    /// after settling is ignored, so it cannot sign the user out.
    pub fn on_session_state(&mut self, state: &SessionState, ready: bool) -> RenderDecision {
        if self.session_ready && !ready {
            tracing::debug!("ignoring not-ready state from session source after settling");
            return self.render;
        }
        self.session_ready |= ready;
        if ready {
            self.authenticated = state.is_authenticated();
        }
        self.evaluate()
    }

    /// Feed a raw notification from the session source.
    pub fn on_notification(&mut self, notification: &SessionNotification) -> RenderDecision {
        if let Some(error) = notification.error.as_deref() {
            tracing::warn!(error, "identity check failed; treating session as signed out");
        }
        self.on_session_state(&notification.state(), notification.ready)
    }

    pub fn on_area_changed(&mut self, area: AreaCategory) -> RenderDecision {
        if area != self.area {
            tracing::debug!(from = %self.area, to = %area, "area changed");
        }
        self.area = area;
        self.evaluate()
    }

    /// Deliver a timer expiry. Expiries for timers the gate no longer holds
    /// are ignored.
    pub fn on_timer(&mut self, fired: TimerFired) -> RenderDecision {
        match fired.kind {
            TimerKind::Splash => {
                if !self.splash.on_fired(fired) {
                    tracing::debug!(timer = %fired.id, "stale splash expiry ignored");
                }
            }
            TimerKind::Redirect => self.fire_redirect(fired),
        }
        self.evaluate()
    }

    fn fire_redirect(&mut self, fired: TimerFired) {
        let pending = match self.pending.take() {
            Some(pending) if pending.timer.id() == fired.id => pending,
            other => {
                self.pending = other;
                tracing::debug!(timer = %fired.id, "stale redirect expiry ignored");
                return;
            }
        };
        tracing::info!(
            target_area = %pending.target,
            authenticated = pending.signature.authenticated,
            "redirecting"
        );
        self.navigator.redirect_to(pending.target);
        self.last_observed = Some(pending.signature);
    }

    /// Run the transition algorithm for the current inputs.
    ///
    /// An input that repeats the pending redirect's signature keeps the armed
    /// timer, so duplicates do not extend the debounce window.
    fn evaluate(&mut self) -> RenderDecision {
        let decision = select_render(self.splash.is_elapsed(), self.session_ready);
        if decision != self.render {
            tracing::debug!(from = ?self.render, to = ?decision, "render decision changed");
            self.render = decision;
        }
        if decision != RenderDecision::ShowContent {
            return decision;
        }

        let signature = Signature::new(self.authenticated, self.area);
        if self.last_observed == Some(signature) {
            // Back where we last settled: a redirect armed in between is stale.
            if let Some(stale) = self.pending.take() {
                tracing::debug!(timer = %stale.timer.id(), "pending redirect superseded");
            }
            return decision;
        }
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.signature == signature)
        {
            return decision;
        }

        if let Some(prior) = self.pending.take() {
            tracing::debug!(timer = %prior.timer.id(), "pending redirect superseded");
            prior.timer.cancel();
        }

        match redirect_target(signature) {
            Some(target) => {
                let timer = self
                    .scheduler
                    .schedule(self.config.redirect_debounce, TimerKind::Redirect);
                tracing::debug!(timer = %timer.id(), target_area = %target, "redirect scheduled");
                self.pending = Some(PendingRedirect {
                    target,
                    signature,
                    timer,
                });
            }
            None => self.last_observed = Some(signature),
        }
        decision
    }

    pub fn render_decision(&self) -> RenderDecision {
        self.render
    }

    /// Target of the redirect currently waiting out the debounce.
    pub fn pending_redirect(&self) -> Option<AreaCategory> {
        self.pending.as_ref().map(|p| p.target)
    }

    pub fn last_observed_signature(&self) -> Option<Signature> {
        self.last_observed
    }

    pub fn splash_elapsed(&self) -> bool {
        self.splash.is_elapsed()
    }

    pub fn session_ready(&self) -> bool {
        self.session_ready
    }

    pub fn area(&self) -> AreaCategory {
        self.area
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Tear the gate down. Nothing it scheduled fires afterwards.
    pub fn teardown(self) {
        tracing::info!(
            pending_redirect = self.pending.is_some(),
            splash_running = self.splash.is_running(),
            "session gate torn down"
        );
    }
}

impl<S: Scheduler, N: Navigator> Drop for SessionGate<S, N> {
    fn drop(&mut self) {
        self.splash.cancel();
        if let Some(pending) = self.pending.take() {
            pending.timer.cancel();
        }
    }
}

impl<S: Scheduler, N: Navigator> core::fmt::Debug for SessionGate<S, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionGate")
            .field("render", &self.render)
            .field("session_ready", &self.session_ready)
            .field("authenticated", &self.authenticated)
            .field("area", &self.area)
            .field("last_observed", &self.last_observed)
            .field("pending", &self.pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crownchat_auth::Identity;
    use crownchat_core::{Email, UserId};
    use proptest::prelude::*;

    use super::*;
    use crate::navigator::RecordingNavigator;
    use crate::timer::ManualScheduler;

    type TestGate = SessionGate<ManualScheduler, RecordingNavigator>;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn identity() -> Identity {
        Identity {
            uid: UserId::parse("uid-1").unwrap(),
            email: Email::parse("ana@example.com").unwrap(),
            display_name: None,
            photo_url: None,
            email_verified: true,
        }
    }

    fn signed_in() -> SessionState {
        SessionState::Authenticated(identity(), None)
    }

    fn gate(area: AreaCategory) -> (TestGate, ManualScheduler, RecordingNavigator) {
        let clock = ManualScheduler::new();
        let nav = RecordingNavigator::new();
        let gate = SessionGate::new(GateConfig::default(), clock.clone(), nav.clone(), area);
        (gate, clock, nav)
    }

    fn advance(gate: &mut TestGate, clock: &ManualScheduler, by: Duration) {
        clock.advance(by, |fired| {
            gate.on_timer(fired);
        });
    }

    /// Gate past its splash with a ready, settled session.
    fn settled(
        state: SessionState,
        area: AreaCategory,
    ) -> (TestGate, ManualScheduler, RecordingNavigator) {
        let (mut gate, clock, nav) = gate(area);
        gate.on_session_state(&state, true);
        advance(&mut gate, &clock, ms(2000));
        (gate, clock, nav)
    }

    #[test]
    fn redirect_table() {
        use AreaCategory::*;
        assert_eq!(redirect_target(Signature::new(true, AuthArea)), Some(AppArea));
        assert_eq!(redirect_target(Signature::new(false, AppArea)), Some(AuthArea));
        assert_eq!(redirect_target(Signature::new(true, AppArea)), None);
        assert_eq!(redirect_target(Signature::new(false, AuthArea)), None);
    }

    #[test]
    fn starts_on_splash_with_timer_armed() {
        let (gate, clock, _nav) = gate(AreaCategory::AuthArea);
        assert_eq!(gate.render_decision(), RenderDecision::ShowSplash);
        assert_eq!(clock.armed_count(), 1);
        assert!(!gate.splash_elapsed());
    }

    #[test]
    fn slow_session_shows_loading_between_splash_and_ready() {
        let (mut gate, clock, nav) = gate(AreaCategory::AuthArea);
        gate.on_session_state(&SessionState::Unknown, false);

        advance(&mut gate, &clock, ms(1999));
        assert_eq!(gate.render_decision(), RenderDecision::ShowSplash);

        advance(&mut gate, &clock, ms(1));
        assert_eq!(gate.render_decision(), RenderDecision::ShowLoadingIndicator);

        advance(&mut gate, &clock, ms(499));
        assert_eq!(gate.render_decision(), RenderDecision::ShowLoadingIndicator);

        advance(&mut gate, &clock, ms(1));
        let decision = gate.on_session_state(&signed_in(), true);
        assert_eq!(decision, RenderDecision::ShowContent);
        assert_eq!(gate.pending_redirect(), Some(AreaCategory::AppArea));

        advance(&mut gate, &clock, ms(100));
        assert_eq!(nav.calls(), vec![AreaCategory::AppArea]);
    }

    #[test]
    fn fast_session_still_waits_for_splash() {
        let (mut gate, clock, nav) = gate(AreaCategory::AuthArea);
        assert_eq!(
            gate.on_session_state(&signed_in(), true),
            RenderDecision::ShowSplash
        );
        assert_eq!(gate.pending_redirect(), None);

        advance(&mut gate, &clock, ms(2000));
        assert_eq!(gate.render_decision(), RenderDecision::ShowContent);
        assert_eq!(gate.pending_redirect(), Some(AreaCategory::AppArea));
        assert!(nav.calls().is_empty());
    }

    #[test]
    fn authenticated_in_auth_area_redirects_once() {
        let (mut gate, clock, nav) = settled(signed_in(), AreaCategory::AuthArea);
        advance(&mut gate, &clock, ms(100));
        assert_eq!(nav.calls(), vec![AreaCategory::AppArea]);
        assert_eq!(
            gate.last_observed_signature(),
            Some(Signature::new(true, AreaCategory::AuthArea))
        );

        for _ in 0..5 {
            gate.on_session_state(&signed_in(), true);
            advance(&mut gate, &clock, ms(150));
        }
        assert_eq!(nav.calls(), vec![AreaCategory::AppArea]);
    }

    #[test]
    fn unauthenticated_in_auth_area_stays_put() {
        let (mut gate, clock, nav) = settled(SessionState::Unauthenticated, AreaCategory::AuthArea);
        assert_eq!(gate.pending_redirect(), None);
        advance(&mut gate, &clock, ms(1000));
        assert!(nav.calls().is_empty());
        assert_eq!(
            gate.last_observed_signature(),
            Some(Signature::new(false, AreaCategory::AuthArea))
        );
    }

    #[test]
    fn unauthenticated_in_app_area_goes_to_auth() {
        let (mut gate, clock, nav) = settled(SessionState::Unauthenticated, AreaCategory::AppArea);
        advance(&mut gate, &clock, ms(100));
        assert_eq!(nav.calls(), vec![AreaCategory::AuthArea]);
    }

    #[test]
    fn duplicate_signature_triggers_one_redirect() {
        let (mut gate, clock, nav) = settled(signed_in(), AreaCategory::AuthArea);
        gate.on_session_state(&signed_in(), true);
        gate.on_session_state(&signed_in(), true);
        assert_eq!(clock.armed_count(), 1);

        advance(&mut gate, &clock, ms(500));
        assert_eq!(nav.calls().len(), 1);
    }

    #[test]
    fn debounce_coalesces_to_latest_signature() {
        let (mut gate, clock, nav) = settled(signed_in(), AreaCategory::AuthArea);
        assert_eq!(gate.pending_redirect(), Some(AreaCategory::AppArea));

        advance(&mut gate, &clock, ms(50));
        gate.on_session_state(&SessionState::Unauthenticated, true);
        gate.on_area_changed(AreaCategory::AppArea);
        assert_eq!(gate.pending_redirect(), Some(AreaCategory::AuthArea));
        assert_eq!(clock.armed_count(), 1);

        advance(&mut gate, &clock, ms(100));
        assert_eq!(nav.calls(), vec![AreaCategory::AuthArea]);
        assert_eq!(
            gate.last_observed_signature(),
            Some(Signature::new(false, AreaCategory::AppArea))
        );
    }

    #[test]
    fn returning_to_settled_signature_drops_pending_redirect() {
        let (mut gate, clock, nav) = settled(SessionState::Unauthenticated, AreaCategory::AuthArea);
        gate.on_session_state(&signed_in(), true);
        assert_eq!(gate.pending_redirect(), Some(AreaCategory::AppArea));

        gate.on_session_state(&SessionState::Unauthenticated, true);
        assert_eq!(gate.pending_redirect(), None);
        advance(&mut gate, &clock, ms(500));
        assert!(nav.calls().is_empty());
    }

    #[test]
    fn teardown_before_debounce_fires_nothing() {
        let (gate, clock, nav) = settled(signed_in(), AreaCategory::AuthArea);
        assert_eq!(clock.armed_count(), 1);
        gate.teardown();
        assert_eq!(clock.armed_count(), 0);
        clock.advance(ms(1000), |_| panic!("timer fired after teardown"));
        assert!(nav.calls().is_empty());
    }

    #[test]
    fn teardown_during_splash_cancels_it() {
        let (gate, clock, nav) = gate(AreaCategory::AppArea);
        drop(gate);
        assert_eq!(clock.armed_count(), 0);
        clock.advance(ms(5000), |_| panic!("timer fired after drop"));
        assert!(nav.calls().is_empty());
    }

    #[test]
    fn stale_redirect_expiry_is_ignored() {
        let (mut gate, clock, nav) = settled(signed_in(), AreaCategory::AuthArea);
        let stale = TimerFired {
            id: crate::timer::TimerId::new(u64::MAX),
            kind: TimerKind::Redirect,
        };
        gate.on_timer(stale);
        assert!(nav.calls().is_empty());
        assert_eq!(gate.pending_redirect(), Some(AreaCategory::AppArea));

        advance(&mut gate, &clock, ms(100));
        assert_eq!(nav.calls(), vec![AreaCategory::AppArea]);
    }

    #[test]
    fn provider_error_routes_as_signed_out() {
        let (mut gate, clock, nav) = settled(signed_in(), AreaCategory::AppArea);
        assert!(gate.pending_redirect().is_none());

        gate.on_notification(&SessionNotification::failed("token revoked"));
        assert!(!gate.is_authenticated());
        advance(&mut gate, &clock, ms(100));
        assert_eq!(nav.calls(), vec![AreaCategory::AuthArea]);
    }

    #[test]
    fn readiness_does_not_regress() {
        let (mut gate, clock, _nav) = settled(SessionState::Unauthenticated, AreaCategory::AuthArea);
        advance(&mut gate, &clock, ms(10));
        let decision = gate.on_session_state(&SessionState::Unknown, false);
        assert_eq!(decision, RenderDecision::ShowContent);
        assert!(gate.session_ready());
    }

    #[test]
    fn not_ready_state_after_settling_keeps_user_signed_in() {
        let (mut gate, clock, nav) = settled(signed_in(), AreaCategory::AppArea);
        advance(&mut gate, &clock, ms(500));
        assert!(nav.calls().is_empty());

        let decision = gate.on_session_state(&SessionState::Unknown, false);
        assert_eq!(decision, RenderDecision::ShowContent);
        assert!(gate.is_authenticated());
        assert_eq!(gate.pending_redirect(), None);

        gate.on_notification(&SessionNotification::pending());
        advance(&mut gate, &clock, ms(200));
        assert!(gate.is_authenticated());
        assert!(nav.calls().is_empty());
    }

    #[test]
    fn not_ready_state_before_settling_does_not_decide_identity() {
        let (mut gate, clock, nav) = gate(AreaCategory::AuthArea);
        gate.on_session_state(&signed_in(), false);
        assert!(!gate.is_authenticated());

        advance(&mut gate, &clock, ms(2000));
        assert_eq!(gate.render_decision(), RenderDecision::ShowLoadingIndicator);
        assert!(nav.calls().is_empty());
    }

    #[test]
    fn zero_splash_settles_on_first_ready_state() {
        let clock = ManualScheduler::new();
        let nav = RecordingNavigator::new();
        let config = GateConfig::default().with_splash_min(Duration::ZERO);
        let mut gate = SessionGate::new(config, clock.clone(), nav.clone(), AreaCategory::AuthArea);
        assert_eq!(gate.render_decision(), RenderDecision::ShowLoadingIndicator);

        gate.on_session_state(&signed_in(), true);
        assert_eq!(gate.render_decision(), RenderDecision::ShowContent);
        advance(&mut gate, &clock, ms(100));
        assert_eq!(nav.calls(), vec![AreaCategory::AppArea]);
    }

    #[derive(Debug, Clone)]
    enum Input {
        Session { authenticated: bool },
        Area(AreaCategory),
        Wait(u64),
    }

    fn input() -> impl Strategy<Value = Input> {
        prop_oneof![
            any::<bool>().prop_map(|authenticated| Input::Session { authenticated }),
            prop_oneof![Just(AreaCategory::AuthArea), Just(AreaCategory::AppArea)].prop_map(Input::Area),
            (0u64..400).prop_map(Input::Wait),
        ]
    }

    fn state(authenticated: bool) -> SessionState {
        if authenticated {
            signed_in()
        } else {
            SessionState::Unauthenticated
        }
    }

    proptest! {
        #[test]
        fn never_content_while_not_ready(inputs in proptest::collection::vec(input(), 0..40)) {
            let (mut gate, clock, nav) = gate(AreaCategory::AuthArea);
            for input in inputs {
                let decision = match input {
                    Input::Session { authenticated } => gate.on_session_state(&state(authenticated), false),
                    Input::Area(area) => gate.on_area_changed(area),
                    Input::Wait(n) => {
                        advance(&mut gate, &clock, ms(n));
                        gate.render_decision()
                    }
                };
                prop_assert_ne!(decision, RenderDecision::ShowContent);
            }
            prop_assert!(nav.calls().is_empty());
        }

        #[test]
        fn splash_until_minimum_elapses(
            inputs in proptest::collection::vec((any::<bool>(), any::<bool>(), 0u64..200), 0..30),
        ) {
            let (mut gate, clock, nav) = gate(AreaCategory::AppArea);
            for (authenticated, ready, wait) in inputs {
                let remaining = ms(1999).saturating_sub(clock.now());
                advance(&mut gate, &clock, ms(wait).min(remaining));
                let decision = gate.on_session_state(&state(authenticated), ready);
                prop_assert_eq!(decision, RenderDecision::ShowSplash);
            }
            prop_assert!(nav.calls().is_empty());
        }

        #[test]
        fn repeated_signature_redirects_at_most_once(
            authenticated in any::<bool>(),
            area_is_auth in any::<bool>(),
            repeats in 1usize..10,
        ) {
            let area = if area_is_auth { AreaCategory::AuthArea } else { AreaCategory::AppArea };
            let (mut gate, clock, nav) = settled(state(authenticated), area);
            for _ in 0..repeats {
                gate.on_session_state(&state(authenticated), true);
                gate.on_area_changed(area);
                advance(&mut gate, &clock, ms(120));
            }
            prop_assert!(nav.calls().len() <= 1);
        }
    }
}
