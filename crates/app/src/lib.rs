//! `crownchat-app`
//!
//! **Responsibility:** the runtime shell around the Session Gate.
//!
//! This crate provides:
//! - A tokio-backed timer scheduler
//! - The router and the navigator the gate drives
//! - The gate worker: one task serializing session, location and timer inputs
//! - Login/register screen controllers
//! - Configuration from the environment
//!
//! The gate itself stays runtime-free; everything async lives here.

pub mod config;
pub mod router;
pub mod scheduler;
pub mod screens;
pub mod worker;

pub use config::{AppConfig, ConfigError};
pub use router::{Location, Router, RouterNavigator};
pub use scheduler::TokioScheduler;
pub use screens::{sign_out, LoginScreen, RegisterScreen};
pub use worker::{GateHandle, GateWorker, GateWorkerError};
