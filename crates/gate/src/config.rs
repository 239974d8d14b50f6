use std::time::Duration;

/// Timing policy of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    /// Minimum time the branding splash stays visible.
    pub splash_min: Duration,
    /// Quiet period before a redirect fires; later transitions inside the
    /// window replace the pending one.
    pub redirect_debounce: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            splash_min: Duration::from_millis(2000),
            redirect_debounce: Duration::from_millis(100),
        }
    }
}

impl GateConfig {
    pub fn with_splash_min(mut self, splash_min: Duration) -> Self {
        self.splash_min = splash_min;
        self
    }

    pub fn with_redirect_debounce(mut self, redirect_debounce: Duration) -> Self {
        self.redirect_debounce = redirect_debounce;
        self
    }
}
