//! Screen routing.
//!
//! The router owns the current location and a back stack. Every change is
//! published on a watch channel, which is how the gate worker learns that the
//! user moved between the auth and app areas.

use std::sync::{Arc, Mutex, PoisonError};

use crownchat_gate::{AreaCategory, Navigator};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

pub const LOGIN_ROUTE: &str = "/auth/login";
pub const REGISTER_ROUTE: &str = "/auth/register";
pub const HOME_ROUTE: &str = "/(tabs)";

/// Where the shell currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    pub area: AreaCategory,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let area = AreaCategory::from_path(&path);
        Self { path, area }
    }
}

#[derive(Debug)]
struct RouterInner {
    back_stack: Mutex<Vec<String>>,
    location: watch::Sender<Location>,
}

/// Shared handle to the app's router. Clones address the same router.
#[derive(Debug, Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    pub fn new(initial_path: impl Into<String>) -> Self {
        let (location, _) = watch::channel(Location::new(initial_path));
        Self {
            inner: Arc::new(RouterInner {
                back_stack: Mutex::new(Vec::new()),
                location,
            }),
        }
    }

    pub fn location(&self) -> Location {
        self.inner.location.borrow().clone()
    }

    pub fn path(&self) -> String {
        self.inner.location.borrow().path.clone()
    }

    pub fn area(&self) -> AreaCategory {
        self.inner.location.borrow().area
    }

    /// Receiver observing every location change.
    pub fn watch(&self) -> watch::Receiver<Location> {
        self.inner.location.subscribe()
    }

    /// Push `path` on top of the current location.
    pub fn navigate(&self, path: &str) {
        let previous = self.path();
        if previous == path {
            return;
        }
        self.back_stack().push(previous);
        self.set(path);
    }

    /// Replace the current location and forget the back stack.
    pub fn replace(&self, path: &str) {
        self.back_stack().clear();
        self.set(path);
    }

    /// Pop back to the previous location. Returns `false` at the root.
    pub fn back(&self) -> bool {
        let Some(previous) = self.back_stack().pop() else {
            return false;
        };
        self.set(&previous);
        true
    }

    pub fn can_go_back(&self) -> bool {
        !self.back_stack().is_empty()
    }

    fn back_stack(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.inner
            .back_stack
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, path: &str) {
        let next = Location::new(path);
        self.inner.location.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            tracing::debug!(from = %current.path, to = %next.path, area = %next.area, "location changed");
            *current = next;
            true
        });
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(LOGIN_ROUTE)
    }
}

/// [`Navigator`] that lands on an area's entry route.
///
/// Redirecting into the area that is already active does nothing, so the
/// user's position inside that area is kept.
#[derive(Debug, Clone)]
pub struct RouterNavigator {
    router: Router,
}

impl RouterNavigator {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

impl Navigator for RouterNavigator {
    fn redirect_to(&mut self, area: AreaCategory) {
        if self.router.area() == area {
            tracing::debug!(area = %area, "already in target area");
            return;
        }
        self.router.replace(area.landing_route());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_area_follows_path() {
        assert_eq!(Location::new(LOGIN_ROUTE).area, AreaCategory::AuthArea);
        assert_eq!(Location::new(HOME_ROUTE).area, AreaCategory::AppArea);
        assert_eq!(Location::new("/chat/42").area, AreaCategory::AppArea);
    }

    #[test]
    fn location_serializes_with_area() {
        let json = serde_json::to_value(Location::new(HOME_ROUTE)).unwrap();
        assert_eq!(json, serde_json::json!({ "path": "/(tabs)", "area": "app_area" }));
    }

    #[test]
    fn navigate_and_back() {
        let router = Router::new(LOGIN_ROUTE);
        router.navigate(REGISTER_ROUTE);
        assert_eq!(router.path(), REGISTER_ROUTE);
        assert!(router.can_go_back());

        assert!(router.back());
        assert_eq!(router.path(), LOGIN_ROUTE);
        assert!(!router.back());
    }

    #[test]
    fn replace_clears_history() {
        let router = Router::new(LOGIN_ROUTE);
        router.navigate(REGISTER_ROUTE);
        router.replace(HOME_ROUTE);
        assert_eq!(router.area(), AreaCategory::AppArea);
        assert!(!router.can_go_back());
    }

    #[test]
    fn watchers_see_changes_only() {
        let router = Router::new(LOGIN_ROUTE);
        let mut rx = router.watch();
        assert!(!rx.has_changed().unwrap());

        router.replace(LOGIN_ROUTE);
        assert!(!rx.has_changed().unwrap());

        router.replace(HOME_ROUTE);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().area, AreaCategory::AppArea);
    }

    #[test]
    fn navigator_is_idempotent() {
        let router = Router::new("/auth/register");
        let mut nav = RouterNavigator::new(router.clone());

        nav.redirect_to(AreaCategory::AuthArea);
        assert_eq!(router.path(), "/auth/register");

        nav.redirect_to(AreaCategory::AppArea);
        assert_eq!(router.path(), HOME_ROUTE);
        nav.redirect_to(AreaCategory::AppArea);
        assert_eq!(router.path(), HOME_ROUTE);
    }
}
