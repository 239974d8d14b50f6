//! In-memory identity provider + profile store.
//!
//! Stands in for the hosted backend in tests and the demo binary. It follows
//! the backend's observable behavior: accounts keyed by email, one profile
//! document per uid, a username index for uniqueness, a persisted session
//! restored on [`InMemorySessionSource::initialize`], and auth-state
//! notifications with latest-value replay.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crownchat_core::{Email, UserId, Username};
use crownchat_events::{EventBus, InMemoryEventBus, Subscription};

use crate::error::{AuthError, AuthResult};
use crate::identity::{Identity, SignUpData, UserProfile};
use crate::session::SessionNotification;
use crate::source::SessionSource;

/// Shortest password the provider accepts.
const PROVIDER_MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug)]
struct Account {
    password: String,
    identity: Identity,
    disabled: bool,
}

#[derive(Debug)]
struct Directory {
    accounts: HashMap<Email, Account>,
    profiles: HashMap<UserId, UserProfile>,
    usernames: HashMap<Username, UserId>,
    signed_in: Option<UserId>,
    /// Session token that survives restarts.
    persisted: Option<UserId>,
    last: SessionNotification,
    network_available: bool,
    profile_store_available: bool,
    registration_enabled: bool,
}

impl Directory {
    fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            profiles: HashMap::new(),
            usernames: HashMap::new(),
            signed_in: None,
            persisted: None,
            last: SessionNotification::pending(),
            network_available: true,
            profile_store_available: true,
            registration_enabled: true,
        }
    }

    fn require_network(&self) -> AuthResult<()> {
        if self.network_available {
            Ok(())
        } else {
            Err(AuthError::NetworkRequestFailed)
        }
    }

    fn identity_of(&self, uid: &UserId) -> Option<&Identity> {
        self.accounts
            .values()
            .find(|a| &a.identity.uid == uid && !a.disabled)
            .map(|a| &a.identity)
    }

    /// Profile lookup that never fails the caller: a profile-store outage
    /// yields `None` and the session stays authenticated.
    fn fetch_profile(&self, uid: &UserId) -> Option<UserProfile> {
        if !self.profile_store_available {
            tracing::warn!(%uid, "profile store unavailable (non-critical); continuing without profile");
            return None;
        }
        let profile = self.profiles.get(uid).cloned();
        if profile.is_none() {
            tracing::warn!(%uid, "profile document does not exist");
        }
        profile
    }

    fn create_account(&mut self, data: SignUpData) -> AuthResult<Identity> {
        if !self.registration_enabled {
            return Err(AuthError::OperationNotAllowed);
        }
        if data.password.chars().count() < PROVIDER_MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        if self.accounts.contains_key(&data.email) {
            return Err(AuthError::EmailAlreadyInUse);
        }
        if self.usernames.contains_key(&data.username) {
            return Err(AuthError::UsernameTaken);
        }
        // Profile document and username index are written together with the
        // account; a store outage aborts the whole sign-up.
        if !self.profile_store_available {
            return Err(AuthError::ProfileWrite);
        }

        let identity = Identity {
            uid: UserId::generate(),
            email: data.email.clone(),
            display_name: Some(data.display_name.as_str().to_string()),
            photo_url: data.profile_picture.clone(),
            email_verified: false,
        };
        let profile = UserProfile::new(&identity, &data, Utc::now());

        self.usernames.insert(data.username.clone(), identity.uid.clone());
        self.profiles.insert(identity.uid.clone(), profile);
        self.accounts.insert(
            data.email,
            Account {
                password: data.password,
                identity: identity.clone(),
                disabled: false,
            },
        );
        Ok(identity)
    }
}

/// In-memory [`SessionSource`].
#[derive(Debug)]
pub struct InMemorySessionSource {
    bus: InMemoryEventBus<SessionNotification>,
    directory: Mutex<Directory>,
}

impl Default for InMemorySessionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionSource {
    /// An empty, uninitialized source. Nothing is delivered to subscribers
    /// until [`initialize`](Self::initialize) runs.
    pub fn new() -> Self {
        Self {
            bus: InMemoryEventBus::replaying(),
            directory: Mutex::new(Directory::new()),
        }
    }

    fn directory(&self) -> MutexGuard<'_, Directory> {
        self.directory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, dir: &mut Directory, notification: SessionNotification) {
        dir.last = notification.clone();
        match self.bus.publish(notification) {
            Ok(sequence) => tracing::debug!(sequence, "auth state published"),
            Err(e) => tracing::warn!(error = %e, "failed to publish auth state"),
        }
    }

    fn publish_signed_in(&self, dir: &mut Directory, uid: &UserId) {
        let notification = match dir.identity_of(uid).cloned() {
            Some(identity) => {
                let profile = dir.fetch_profile(uid);
                SessionNotification::signed_in(identity, profile)
            }
            None => SessionNotification::signed_out(),
        };
        self.publish(dir, notification);
    }

    /// Create an account with its profile without signing in.
    pub fn seed_account(&self, data: SignUpData) -> AuthResult<Identity> {
        let mut dir = self.directory();
        let identity = dir.create_account(data)?;
        tracing::debug!(uid = %identity.uid, "seeded account");
        Ok(identity)
    }

    /// Pretend a session token for `email` was persisted by a previous run.
    ///
    /// Returns `false` when no such account exists.
    pub fn restore_session(&self, email: &Email) -> bool {
        let mut dir = self.directory();
        let Some(uid) = dir.accounts.get(email).map(|a| a.identity.uid.clone()) else {
            return false;
        };
        dir.persisted = Some(uid);
        true
    }

    /// Finish the initial auth check and deliver the first notification.
    ///
    /// Idempotent: once initialized, further calls do nothing.
    pub fn initialize(&self) {
        let mut dir = self.directory();
        if dir.last.ready {
            tracing::debug!("session source already initialized");
            return;
        }
        let restored = dir
            .persisted
            .clone()
            .filter(|uid| dir.identity_of(uid).is_some());
        match restored {
            Some(uid) => {
                tracing::info!(%uid, "restored persisted session");
                dir.signed_in = Some(uid.clone());
                self.publish_signed_in(&mut dir, &uid);
            }
            None => {
                tracing::info!("no persisted session");
                dir.persisted = None;
                self.publish(&mut dir, SessionNotification::signed_out());
            }
        }
    }

    /// Re-deliver the current state unchanged, as a token refresh would.
    pub fn refresh_credentials(&self) {
        let mut dir = self.directory();
        if !dir.last.ready {
            return;
        }
        let last = dir.last.clone();
        self.publish(&mut dir, last);
    }

    /// The provider reported an error on its auth-state channel.
    ///
    /// Local session data is wiped and a signed-out notification carrying the
    /// message is delivered.
    pub fn report_provider_error(&self, message: impl Into<String>) {
        let message = message.into();
        let mut dir = self.directory();
        tracing::error!(error = %message, "identity provider error; clearing session");
        dir.signed_in = None;
        dir.persisted = None;
        self.publish(&mut dir, SessionNotification::failed(message));
    }

    pub fn set_network_available(&self, available: bool) {
        self.directory().network_available = available;
    }

    pub fn set_profile_store_available(&self, available: bool) {
        self.directory().profile_store_available = available;
    }

    pub fn set_registration_enabled(&self, enabled: bool) {
        self.directory().registration_enabled = enabled;
    }

    /// Disable an account. Existing sessions stay until the next sign-in.
    pub fn disable_account(&self, email: &Email) -> bool {
        match self.directory().accounts.get_mut(email) {
            Some(account) => {
                account.disabled = true;
                true
            }
            None => false,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }
}

#[async_trait]
impl SessionSource for InMemorySessionSource {
    fn subscribe(&self) -> Subscription<SessionNotification> {
        self.bus.subscribe()
    }

    fn current(&self) -> SessionNotification {
        self.directory().last.clone()
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let mut dir = self.directory();
        dir.require_network()?;
        let email = Email::parse(email).map_err(|_| AuthError::InvalidEmail)?;
        tracing::info!(%email, "signing in");

        let account = dir.accounts.get(&email).ok_or(AuthError::UserNotFound)?;
        if account.disabled {
            return Err(AuthError::UserDisabled);
        }
        if account.password != password {
            tracing::warn!(%email, "sign-in rejected: wrong password");
            return Err(AuthError::WrongPassword);
        }
        let identity = account.identity.clone();

        dir.signed_in = Some(identity.uid.clone());
        dir.persisted = Some(identity.uid.clone());
        self.publish_signed_in(&mut dir, &identity.uid);
        tracing::info!(uid = %identity.uid, "signed in");
        Ok(identity)
    }

    async fn sign_up(&self, data: SignUpData) -> AuthResult<Identity> {
        let mut dir = self.directory();
        dir.require_network()?;
        tracing::info!(email = %data.email, username = %data.username, "creating account");

        let identity = dir.create_account(data)?;
        dir.signed_in = Some(identity.uid.clone());
        dir.persisted = Some(identity.uid.clone());
        self.publish_signed_in(&mut dir, &identity.uid);
        tracing::info!(uid = %identity.uid, "account created");
        Ok(identity)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let mut dir = self.directory();
        let previous = dir.signed_in.take();
        dir.persisted = None;
        self.publish(&mut dir, SessionNotification::signed_out());
        tracing::info!(uid = ?previous, "signed out");
        Ok(())
    }

    async fn refresh_profile(&self) -> AuthResult<Option<UserProfile>> {
        let mut dir = self.directory();
        let Some(uid) = dir.signed_in.clone() else {
            return Ok(None);
        };
        dir.require_network()?;
        if !dir.profile_store_available {
            return Err(AuthError::ProfileRead);
        }
        let profile = dir.profiles.get(&uid).cloned();
        self.publish_signed_in(&mut dir, &uid);
        Ok(profile)
    }

    async fn is_username_available(&self, username: &Username) -> AuthResult<bool> {
        let dir = self.directory();
        dir.require_network()?;
        if !dir.profile_store_available {
            return Err(AuthError::ProfileRead);
        }
        Ok(!dir.usernames.contains_key(username))
    }
}
