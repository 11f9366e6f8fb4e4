//! Password hashing (Argon2id, PHC string format).

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
#[cfg(test)]
use argon2::{PasswordHash, PasswordVerifier};
use rand::RngCore;

fn salt() -> Result<SaltString, argon2::password_hash::Error> {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    SaltString::encode_b64(&bytes)
}

/// Hash a plaintext password into a self-describing PHC string.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    Argon2::default()
        .hash_password(password.as_bytes(), &salt()?)
        .map(|h| h.to_string())
}

/// Check a plaintext password against a stored PHC string.
#[cfg(test)]
pub(crate) fn verify_password(password: &str, digest: &str) -> bool {
    PasswordHash::new(digest)
        .map(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), &hash)
                .is_ok()
        })
        .unwrap_or(false)
}
