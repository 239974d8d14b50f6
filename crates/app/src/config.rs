//! Shell configuration from the environment.

use std::time::Duration;

use crownchat_gate::GateConfig;
use thiserror::Error;

use crate::router::LOGIN_ROUTE;

pub const SPLASH_MS_ENV: &str = "CROWNCHAT_SPLASH_MS";
pub const REDIRECT_DEBOUNCE_MS_ENV: &str = "CROWNCHAT_REDIRECT_DEBOUNCE_MS";
pub const INITIAL_ROUTE_ENV: &str = "CROWNCHAT_INITIAL_ROUTE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of milliseconds, got {value:?}")]
    InvalidMillis { var: &'static str, value: String },
    #[error("{var} must be an absolute route starting with '/', got {value:?}")]
    InvalidRoute { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub gate: GateConfig,
    /// Route the shell opens on before the gate has settled.
    pub initial_route: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gate: GateConfig::default(),
            initial_route: LOGIN_ROUTE.to_string(),
        }
    }
}

impl AppConfig {
    /// Read the process environment. Bad values are logged and replaced by
    /// their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let mut gate = defaults.gate;

        if let Some(splash) = or_default(parse_millis(SPLASH_MS_ENV, lookup(SPLASH_MS_ENV))) {
            gate = gate.with_splash_min(splash);
        }
        if let Some(debounce) = or_default(parse_millis(
            REDIRECT_DEBOUNCE_MS_ENV,
            lookup(REDIRECT_DEBOUNCE_MS_ENV),
        )) {
            gate = gate.with_redirect_debounce(debounce);
        }
        let initial_route = or_default(parse_route(INITIAL_ROUTE_ENV, lookup(INITIAL_ROUTE_ENV)))
            .unwrap_or(defaults.initial_route);

        Self {
            gate,
            initial_route,
        }
    }
}

fn or_default<T>(parsed: Result<Option<T>, ConfigError>) -> Option<T> {
    parsed.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring invalid configuration value");
        None
    })
}

fn parse_millis(var: &'static str, raw: Option<String>) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(|ms| Some(Duration::from_millis(ms)))
        .map_err(|_| ConfigError::InvalidMillis { var, value: raw })
}

fn parse_route(var: &'static str, raw: Option<String>) -> Result<Option<String>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let route = raw.trim();
    if route.starts_with('/') {
        Ok(Some(route.to_string()))
    } else {
        Err(ConfigError::InvalidRoute { var, value: raw })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.gate.splash_min, Duration::from_millis(2000));
        assert_eq!(config.gate.redirect_debounce, Duration::from_millis(100));
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (SPLASH_MS_ENV, "500"),
            (REDIRECT_DEBOUNCE_MS_ENV, " 0 "),
            (INITIAL_ROUTE_ENV, "/(tabs)"),
        ]));
        assert_eq!(config.gate.splash_min, Duration::from_millis(500));
        assert_eq!(config.gate.redirect_debounce, Duration::ZERO);
        assert_eq!(config.initial_route, "/(tabs)");
    }

    #[test]
    fn bad_values_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[
            (SPLASH_MS_ENV, "two seconds"),
            (INITIAL_ROUTE_ENV, "tabs"),
        ]));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn errors_name_the_variable() {
        let err = parse_millis(SPLASH_MS_ENV, Some("-1".into())).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidMillis {
                var: SPLASH_MS_ENV,
                value: "-1".into()
            }
        );
        assert!(err.to_string().contains(SPLASH_MS_ENV));
    }
}
