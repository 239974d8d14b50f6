use serde::{Deserialize, Serialize};

/// Navigational region the user currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaCategory {
    /// Login / register screens.
    AuthArea,
    /// Everything behind sign-in.
    AppArea,
}

impl AreaCategory {
    /// Categorize a location path. The first path segment `auth` marks the
    /// auth area; every other location (including `/`) is the app area.
    pub fn from_path(path: &str) -> Self {
        let first = path.trim_start_matches('/').split('/').next().unwrap_or("");
        if first == "auth" {
            AreaCategory::AuthArea
        } else {
            AreaCategory::AppArea
        }
    }

    /// Screen a redirect into this area lands on.
    pub fn landing_route(self) -> &'static str {
        match self {
            AreaCategory::AuthArea => "/auth/login",
            AreaCategory::AppArea => "/(tabs)",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AreaCategory::AuthArea => "auth_area",
            AreaCategory::AppArea => "app_area",
        }
    }
}

impl core::fmt::Display for AreaCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
