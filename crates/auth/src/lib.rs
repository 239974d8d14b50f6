//! `crownchat-auth`
//!
//! **Responsibility:** the Session Source boundary.
//!
//! Identity and profile storage are owned by a hosted backend. This crate
//! defines the contract the rest of the shell depends on ([`SessionSource`]),
//! the data it carries, the provider error taxonomy, form validation for the
//! login/register screens, and an in-memory implementation of the backend.

pub mod error;
pub mod forms;
pub mod identity;
pub mod memory;
pub mod session;
pub mod source;

pub use error::{AuthError, AuthOutcome, AuthResult};
pub use forms::{
    login_feedback, register_feedback, FieldError, FormErrors, FormFeedback, FormField, LoginForm,
    RegisterForm, ValidLogin,
};
pub use identity::{Identity, SignUpData, UserProfile};
pub use memory::InMemorySessionSource;
pub use session::{SessionNotification, SessionState};
pub use source::SessionSource;
