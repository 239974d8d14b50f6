//! Auth-state notifications and the session state derived from them.

use serde::{Deserialize, Serialize};

use crate::identity::{Identity, UserProfile};

/// What the shell knows about the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No notification has been delivered yet.
    Unknown,
    /// Signed in. The profile may be missing if the profile fetch failed.
    Authenticated(Identity, Option<UserProfile>),
    /// Signed out, or the identity check failed.
    Unauthenticated,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(..))
    }
}

/// One auth-state notification from the Session Source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionNotification {
    pub identity: Option<Identity>,
    pub profile: Option<UserProfile>,
    /// `true` once the source has finished its initial auth check.
    pub ready: bool,
    /// Identity-provider error that accompanied this notification.
    pub error: Option<String>,
}

impl SessionNotification {
    /// Before the source has initialized.
    pub fn pending() -> Self {
        Self {
            identity: None,
            profile: None,
            ready: false,
            error: None,
        }
    }

    pub fn signed_in(identity: Identity, profile: Option<UserProfile>) -> Self {
        Self {
            identity: Some(identity),
            profile,
            ready: true,
            error: None,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            identity: None,
            profile: None,
            ready: true,
            error: None,
        }
    }

    /// Terminal notification carrying a provider error. Always signed out.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            identity: None,
            profile: None,
            ready: true,
            error: Some(error.into()),
        }
    }

    /// Routing view of this notification.
    ///
    /// An error degrades to `Unauthenticated`: a failed identity check and a
    /// confirmed sign-out route the same way.
    pub fn state(&self) -> SessionState {
        if !self.ready {
            return SessionState::Unknown;
        }
        match (&self.identity, &self.error) {
            (Some(identity), None) => {
                SessionState::Authenticated(identity.clone(), self.profile.clone())
            }
            _ => SessionState::Unauthenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.ready && self.error.is_none() && self.identity.is_some()
    }
}
