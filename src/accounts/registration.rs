//! User registration.
//!
//! # Responsibilities
//! - Normalize the submitted email
//! - Enforce presence, minimum length and confirmation rules
//! - Hash the password and persist the user together with its first session
//!
//! # Design Decisions
//! - Every rule is evaluated so logs show all problems at once
//! - Uniqueness is left to the store's constraint, not pre-checked
//! - Callers collapse every failure into one generic outcome; the variants
//!   exist for logging and metrics only

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::accounts::email::normalize_email;
use crate::accounts::password::hash_password;
use crate::accounts::session::{start_session_for, Session, SessionContext, SessionToken};
use crate::accounts::user::User;
use crate::store::{AccountStore, StoreError};

/// Submitted signup form, using the HTML field names.
#[derive(Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(rename = "user[email_address]", default)]
    pub email_address: String,
    #[serde(rename = "user[password]", default)]
    pub password: String,
    #[serde(rename = "user[password_confirmation]", default)]
    pub password_confirmation: String,
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("email_address", &self.email_address)
            .finish_non_exhaustive()
    }
}

/// One broken registration rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("email address can't be blank")]
    EmailMissing,
    #[error("password can't be blank")]
    PasswordMissing,
    #[error("password is too short (minimum is {0} characters)")]
    PasswordTooShort(usize),
    #[error("password confirmation doesn't match password")]
    ConfirmationMismatch,
}

/// Input rejected by the registration rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", join(.failures))]
pub struct ValidationError {
    pub failures: Vec<ValidationFailure>,
}

fn join(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why a registration did not complete.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The normalized email is already registered.
    #[error("email address already registered")]
    PersistenceConflict,

    #[error("unexpected registration failure: {0}")]
    Unexpected(String),
}

impl RegistrationError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistrationError::Validation(_) => "invalid",
            RegistrationError::PersistenceConflict => "conflict",
            RegistrationError::Unexpected(_) => "error",
        }
    }
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => RegistrationError::PersistenceConflict,
            other => RegistrationError::Unexpected(other.to_string()),
        }
    }
}

/// A completed registration: the new user, its session, and the client token.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    pub session: Session,
    pub token: SessionToken,
}

/// Check the form against the registration rules.
///
/// Returns the normalized email on success.
pub fn validate(form: &RegistrationForm, min_password_length: usize) -> Result<String, ValidationError> {
    let email_address = normalize_email(&form.email_address);
    let mut failures = Vec::new();

    if email_address.is_empty() {
        failures.push(ValidationFailure::EmailMissing);
    }

    if form.password.is_empty() {
        failures.push(ValidationFailure::PasswordMissing);
    } else if form.password.chars().count() < min_password_length {
        failures.push(ValidationFailure::PasswordTooShort(min_password_length));
    }

    if form.password != form.password_confirmation {
        failures.push(ValidationFailure::ConfirmationMismatch);
    }

    if failures.is_empty() {
        Ok(email_address)
    } else {
        Err(ValidationError { failures })
    }
}

/// Registers users against an [`AccountStore`].
#[derive(Clone)]
pub struct Registrar {
    store: Arc<dyn AccountStore>,
    min_password_length: usize,
}

impl Registrar {
    pub fn new(store: Arc<dyn AccountStore>, min_password_length: usize) -> Self {
        Self {
            store,
            min_password_length,
        }
    }

    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    pub fn min_password_length(&self) -> usize {
        self.min_password_length
    }

    /// Validate the form, then create the user and its first session.
    ///
    /// Either both records are persisted or neither is. Blocking: hashes the
    /// password and writes to the store.
    pub fn register(
        &self,
        form: &RegistrationForm,
        context: SessionContext,
    ) -> Result<Registration, RegistrationError> {
        let email_address = validate(form, self.min_password_length)?;

        let digest = hash_password(&form.password)
            .map_err(|e| RegistrationError::Unexpected(format!("password hashing: {e}")))?;

        let user = User::new(email_address, digest);
        let (session, token) = start_session_for(&user, context);
        self.store.create_user_with_session(&user, &session)?;

        Ok(Registration {
            user,
            session,
            token,
        })
    }
}
