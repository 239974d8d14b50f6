//! Tracing/logging setup shared by every CrownChat binary.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, LOG_FORMAT_ENV};

/// Initialize process-wide logging, picking the format from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(LogFormat::from_env());
}
