use serde::{Deserialize, Serialize};

/// What the view layer shows in place of the routed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderDecision {
    ShowSplash,
    ShowLoadingIndicator,
    ShowContent,
}

/// The splash always gets its minimum exposure; after that a spinner covers
/// the wait for the first session notification.
pub fn select_render(splash_elapsed: bool, session_ready: bool) -> RenderDecision {
    match (splash_elapsed, session_ready) {
        (false, _) => RenderDecision::ShowSplash,
        (true, false) => RenderDecision::ShowLoadingIndicator,
        (true, true) => RenderDecision::ShowContent,
    }
}
