//! Accounts subsystem.
//!
//! # Data Flow
//! ```text
//! RegistrationForm
//!     → email.rs (normalize)
//!     → registration.rs (rules: presence, length, confirmation)
//!     → password.rs (Argon2 digest)
//!     → session.rs (new session + client token)
//!     → store (user + session, atomically)
//! ```

pub mod email;
pub mod password;
pub mod registration;
pub mod session;
pub mod user;

pub use email::normalize_email;
pub use registration::{
    Registrar, Registration, RegistrationError, RegistrationForm, ValidationError,
    ValidationFailure,
};
pub use session::{Session, SessionContext, SessionToken};
pub use user::User;
