//! Login and register screen controllers.
//!
//! A controller validates its form, calls the session source and turns
//! failures into [`FormFeedback`]. It never navigates: a successful sign-in
//! reaches the gate as a session notification and the gate decides where the
//! user goes.

use crownchat_auth::{
    login_feedback, register_feedback, AuthError, AuthOutcome, FormFeedback, FormField, Identity, LoginForm,
    RegisterForm, SessionSource,
};

pub struct LoginScreen<'a> {
    source: &'a dyn SessionSource,
}

impl<'a> LoginScreen<'a> {
    pub fn new(source: &'a dyn SessionSource) -> Self {
        Self { source }
    }

    pub async fn submit(&self, form: &LoginForm) -> Result<Identity, FormFeedback> {
        let login = form.validate()?;
        match self.source.sign_in(login.email.as_str(), &login.password).await {
            Ok(identity) => {
                tracing::info!(uid = %identity.uid, "signed in");
                Ok(identity)
            }
            Err(err) => {
                tracing::warn!(code = err.code(), "sign-in failed");
                Err(login_feedback(&err))
            }
        }
    }
}

pub struct RegisterScreen<'a> {
    source: &'a dyn SessionSource,
}

impl<'a> RegisterScreen<'a> {
    pub fn new(source: &'a dyn SessionSource) -> Self {
        Self { source }
    }

    pub async fn submit(&self, form: &RegisterForm) -> Result<Identity, FormFeedback> {
        let data = form.validate()?;

        match self.source.is_username_available(&data.username).await {
            Ok(true) => {}
            Ok(false) => return Err(register_feedback(&AuthError::UsernameTaken)),
            Err(err) => {
                tracing::warn!(code = err.code(), "username check failed");
                return Err(register_feedback(&err));
            }
        }

        let username = data.username.clone();
        match self.source.sign_up(data).await {
            Ok(identity) => {
                tracing::info!(uid = %identity.uid, username = %username, "account created");
                Ok(identity)
            }
            Err(err) => {
                tracing::warn!(code = err.code(), "registration failed");
                Err(register_feedback(&err))
            }
        }
    }
}

/// Sign the current user out. The outcome feeds the toast shown on the
/// profile screen.
pub async fn sign_out(source: &dyn SessionSource) -> AuthOutcome {
    let result = source.sign_out().await;
    if let Err(err) = &result {
        tracing::warn!(code = err.code(), "sign-out failed");
    }
    AuthOutcome::from_result(&result)
}

/// Message shown under `field`, if any.
pub fn field_message(feedback: &FormFeedback, field: FormField) -> Option<&str> {
    feedback.fields.for_field(field)
}
