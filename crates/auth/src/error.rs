//! Identity-provider error taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of a Session Source operation.
pub type AuthResult<T> = Result<T, AuthError>;

/// Failure reported by the identity provider or profile store.
///
/// `Display` is the user-facing message; [`AuthError::code`] is the
/// provider's machine-readable code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No account found with this email address.")]
    UserNotFound,

    #[error("Incorrect password. Please try again.")]
    WrongPassword,

    #[error("An account with this email already exists.")]
    EmailAlreadyInUse,

    #[error("Password should be at least 6 characters long.")]
    WeakPassword,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Too many failed attempts. Please try again later.")]
    TooManyRequests,

    #[error("Network error. Please check your connection.")]
    NetworkRequestFailed,

    #[error("Invalid email or password.")]
    InvalidCredential,

    #[error("This account has been disabled.")]
    UserDisabled,

    #[error("Registration is currently disabled. Please try again later.")]
    OperationNotAllowed,

    #[error("Username is already taken.")]
    UsernameTaken,

    /// The profile document could not be written during sign-up.
    #[error("Failed to create user account. Please try again.")]
    ProfileWrite,

    /// The profile document could not be read.
    #[error("Failed to fetch user data. Please try again.")]
    ProfileRead,

    /// Any provider error without a dedicated variant.
    #[error("{message}")]
    Provider { code: String, message: String },
}

impl AuthError {
    /// Provider code for this error.
    pub fn code(&self) -> &str {
        match self {
            AuthError::UserNotFound => "auth/user-not-found",
            AuthError::WrongPassword => "auth/wrong-password",
            AuthError::EmailAlreadyInUse => "auth/email-already-in-use",
            AuthError::WeakPassword => "auth/weak-password",
            AuthError::InvalidEmail => "auth/invalid-email",
            AuthError::TooManyRequests => "auth/too-many-requests",
            AuthError::NetworkRequestFailed => "auth/network-request-failed",
            AuthError::InvalidCredential => "auth/invalid-credential",
            AuthError::UserDisabled => "auth/user-disabled",
            AuthError::OperationNotAllowed => "auth/operation-not-allowed",
            AuthError::UsernameTaken => "username-already-exists",
            AuthError::ProfileWrite => "profile/write-failed",
            AuthError::ProfileRead => "profile/read-failed",
            AuthError::Provider { code, .. } => code,
        }
    }

    /// Map a provider code back to a typed error.
    ///
    /// Unknown codes keep the provider's message, or a generic one if the
    /// provider sent none.
    pub fn from_code(code: &str, message: Option<&str>) -> Self {
        match code {
            "auth/user-not-found" => AuthError::UserNotFound,
            "auth/wrong-password" => AuthError::WrongPassword,
            "auth/email-already-in-use" => AuthError::EmailAlreadyInUse,
            "auth/weak-password" => AuthError::WeakPassword,
            "auth/invalid-email" => AuthError::InvalidEmail,
            "auth/too-many-requests" => AuthError::TooManyRequests,
            "auth/network-request-failed" => AuthError::NetworkRequestFailed,
            "auth/invalid-credential" => AuthError::InvalidCredential,
            "auth/user-disabled" => AuthError::UserDisabled,
            "auth/operation-not-allowed" => AuthError::OperationNotAllowed,
            "username-already-exists" => AuthError::UsernameTaken,
            "profile/write-failed" => AuthError::ProfileWrite,
            "profile/read-failed" => AuthError::ProfileRead,
            other => AuthError::Provider {
                code: other.to_string(),
                message: message
                    .filter(|m| !m.is_empty())
                    .unwrap_or("An unexpected error occurred.")
                    .to_string(),
            },
        }
    }
}

/// `{success, error?}` shape handed to screens and toasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthOutcome {
    pub fn from_result<T>(result: &AuthResult<T>) -> Self {
        match result {
            Ok(_) => Self {
                success: true,
                error: None,
            },
            Err(e) => Self {
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}
