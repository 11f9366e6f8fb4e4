//! Session establishment.
//!
//! A session is created for a user at registration time. The client receives
//! an opaque random token; the store only ever sees its SHA-256 digest, so a
//! leaked database does not leak usable session identifiers.

use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::accounts::user::{epoch_secs, User};

/// Token length in bytes before hex encoding (64 hex chars).
const TOKEN_BYTES: usize = 32;

/// Request details recorded alongside a new session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// The session identifier handed to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Wrap a token received from a client.
    pub fn from_client(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex SHA-256 of the token; the form persisted by stores.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// A persisted login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_digest: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    /// Seconds since epoch.
    pub created_at: u64,
}

/// Start a new session for `user`.
///
/// Returns the session record to persist and the token for the client. Every
/// call yields a new token; identifiers are never reused.
pub fn start_session_for(user: &User, context: SessionContext) -> (Session, SessionToken) {
    let token = SessionToken::generate();
    let session = Session {
        id: Uuid::new_v4(),
        user_id: user.id,
        token_digest: token.digest(),
        user_agent: context.user_agent,
        ip_address: context.ip_address,
        created_at: epoch_secs(),
    };
    (session, token)
}
