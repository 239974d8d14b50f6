//! The Session Source contract.

use async_trait::async_trait;

use crownchat_core::Username;
use crownchat_events::Subscription;

use crate::error::AuthResult;
use crate::identity::{Identity, SignUpData, UserProfile};
use crate::session::SessionNotification;

/// Identity provider + profile store, as seen by the shell.
///
/// ## Notifications
///
/// [`SessionSource::subscribe`] yields every auth-state change. Once the
/// source has initialized, a new subscription first receives the current
/// state, so a consumer always gets at least one notification. Credential
/// refreshes may repeat an unchanged state.
///
/// ## Operations
///
/// `sign_in`, `sign_up` and `sign_out` are invoked by screens. Their effect on
/// the session is observed through the resulting notification, not through
/// the return value: callers must not navigate on success themselves.
#[async_trait]
pub trait SessionSource: Send + Sync {
    fn subscribe(&self) -> Subscription<SessionNotification>;

    /// Last notification delivered (or `pending` before initialization).
    fn current(&self) -> SessionNotification;

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity>;

    async fn sign_up(&self, data: SignUpData) -> AuthResult<Identity>;

    async fn sign_out(&self) -> AuthResult<()>;

    /// Re-read the signed-in user's profile document. `Ok(None)` when signed
    /// out or when no document exists.
    async fn refresh_profile(&self) -> AuthResult<Option<UserProfile>>;

    async fn is_username_available(&self, username: &Username) -> AuthResult<bool>;
}
