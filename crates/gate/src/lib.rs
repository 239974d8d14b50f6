//! `crownchat-gate`
//!
//! **Responsibility:** the Session Gate.
//!
//! A pure, single-threaded state machine that decides, on every auth-state or
//! location change, whether the shell shows the splash, a loading indicator
//! or content, and whether to redirect between the auth and app areas.
//!
//! The gate performs no IO and owns no runtime. Time enters through a
//! [`Scheduler`]; navigation leaves through a [`Navigator`]. Timers are
//! represented by [`TimerHandle`]s owned by the gate, so tearing the gate down
//! cancels them.

pub mod area;
pub mod config;
pub mod gate;
pub mod navigator;
pub mod render;
pub mod splash;
pub mod timer;

pub use area::AreaCategory;
pub use config::GateConfig;
pub use gate::{redirect_target, SessionGate, Signature};
pub use navigator::{Navigator, RecordingNavigator};
pub use render::{select_render, RenderDecision};
pub use splash::SplashTimer;
pub use timer::{ManualScheduler, Scheduler, TimerFired, TimerHandle, TimerId, TimerKind};
