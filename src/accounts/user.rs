//! Registered user accounts.

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

/// A persisted user.
///
/// `email_address` is always in normalized form; the plaintext password is
/// never held, only its Argon2 digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email_address: String,
    pub password_digest: String,
    /// Seconds since epoch.
    pub created_at: u64,
}

impl User {
    /// Build a new, not yet persisted user.
    pub fn new(email_address: String, password_digest: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email_address,
            password_digest,
            created_at: epoch_secs(),
        }
    }
}

pub(crate) fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
