//! Login/register form validation and provider-error feedback.
//!
//! Validation here covers shape only (required fields, formats, lengths).
//! Password acceptance is the identity provider's call and comes back as
//! [`AuthError::WeakPassword`].

use serde::{Deserialize, Serialize};

use crownchat_core::{DisplayName, DomainResult, Email, Username};

use crate::error::AuthError;
use crate::identity::SignUpData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Email,
    Password,
    ConfirmPassword,
    Username,
    DisplayName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

impl FieldError {
    pub fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// All field errors of one submission, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// First message recorded for `field`.
    pub fn for_field(&self, field: FormField) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn push(&mut self, field: FormField, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// Record a value-object parse failure against `field`.
    fn check<T>(&mut self, field: FormField, parsed: DomainResult<T>) -> Option<T> {
        match parsed {
            Ok(v) => Some(v),
            Err(e) => {
                self.push(field, e.message());
                None
            }
        }
    }
}

/// What a screen shows after a failed submission: per-field messages and/or
/// a banner (toast) message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFeedback {
    pub fields: FormErrors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

impl FormFeedback {
    pub fn field(field: FormField, message: impl Into<String>) -> Self {
        let mut fields = FormErrors::default();
        fields.push(field, message);
        Self { fields, banner: None }
    }

    pub fn banner(message: impl Into<String>) -> Self {
        Self {
            fields: FormErrors::default(),
            banner: Some(message.into()),
        }
    }
}

impl From<FormErrors> for FormFeedback {
    fn from(fields: FormErrors) -> Self {
        Self { fields, banner: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login input that passed validation.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidLogin {
    pub email: Email,
    pub password: String,
}

impl core::fmt::Debug for ValidLogin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ValidLogin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl LoginForm {
    pub fn validate(&self) -> Result<ValidLogin, FormErrors> {
        let mut errors = FormErrors::default();
        let email = errors.check(FormField::Email, Email::parse(&self.email));
        if self.password.is_empty() {
            errors.push(FormField::Password, "Password is required");
        }

        match email {
            Some(email) if errors.is_empty() => Ok(ValidLogin {
                email,
                password: self.password.clone(),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub profile_picture: Option<String>,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<SignUpData, FormErrors> {
        let mut errors = FormErrors::default();
        let username = errors.check(FormField::Username, Username::parse(&self.username));
        let display_name =
            errors.check(FormField::DisplayName, DisplayName::parse(&self.display_name));
        let email = errors.check(FormField::Email, Email::parse(&self.email));

        if self.password.is_empty() {
            errors.push(FormField::Password, "Password is required");
        }
        if self.confirm_password.is_empty() {
            errors.push(FormField::ConfirmPassword, "Please confirm your password");
        } else if self.confirm_password != self.password {
            errors.push(FormField::ConfirmPassword, "Passwords must match");
        }

        let profile_picture = self
            .profile_picture
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        match (username, display_name, email) {
            (Some(username), Some(display_name), Some(email)) if errors.is_empty() => {
                Ok(SignUpData {
                    email,
                    password: self.password.clone(),
                    display_name,
                    username,
                    profile_picture,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Feedback for a failed sign-in.
pub fn login_feedback(err: &AuthError) -> FormFeedback {
    match err {
        AuthError::UserNotFound => {
            FormFeedback::field(FormField::Email, "No account found with this email")
        }
        AuthError::WrongPassword => FormFeedback::field(FormField::Password, "Incorrect password"),
        AuthError::InvalidEmail => FormFeedback::field(FormField::Email, "Invalid email format"),
        AuthError::UserDisabled => {
            FormFeedback::field(FormField::Email, "This account has been disabled")
        }
        AuthError::InvalidCredential => {
            FormFeedback::field(FormField::Email, "Invalid email or password")
        }
        AuthError::TooManyRequests => {
            FormFeedback::banner("Too many login attempts. Please try again later.")
        }
        AuthError::NetworkRequestFailed => {
            FormFeedback::banner("Network error. Please check your internet connection.")
        }
        other => FormFeedback::banner(other.to_string()),
    }
}

/// Feedback for a failed registration.
pub fn register_feedback(err: &AuthError) -> FormFeedback {
    match err {
        AuthError::EmailAlreadyInUse => {
            FormFeedback::field(FormField::Email, "An account with this email already exists")
        }
        AuthError::InvalidEmail => FormFeedback::field(FormField::Email, "Invalid email format"),
        AuthError::WeakPassword => FormFeedback::field(FormField::Password, "Password is too weak"),
        AuthError::UsernameTaken => {
            FormFeedback::field(FormField::Username, "Username is already taken")
        }
        AuthError::TooManyRequests => {
            FormFeedback::banner("Too many registration attempts. Please try again later.")
        }
        AuthError::NetworkRequestFailed => {
            FormFeedback::banner("Network error. Please check your internet connection.")
        }
        AuthError::OperationNotAllowed => {
            FormFeedback::banner("Registration is currently disabled. Please try again later.")
        }
        other => FormFeedback::banner(other.to_string()),
    }
}
