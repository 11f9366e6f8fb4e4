//! Account persistence.
//!
//! # Data Flow
//! ```text
//! Registrar
//!     → AccountStore::create_user_with_session (one atomic call)
//!         → memory.rs (DashMap, entry lock on the email index)
//!         → sqlite.rs (unique index + foreign key, one transaction)
//! ```
//!
//! # Design Decisions
//! - The uniqueness constraint on the normalized email is the only arbiter
//!   between concurrent registrations; callers never pre-check
//! - A user and its first session are written together or not at all
//! - Stores are synchronous; async callers go through `spawn_blocking`

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::accounts::{Session, User};
use crate::config::{StorageBackend, StorageConfig};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors raised by an [`AccountStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("uniqueness constraint violated")]
    Conflict,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Storage for users and their sessions.
pub trait AccountStore: Send + Sync {
    /// Persist `user` and `session` atomically.
    ///
    /// Fails with [`StoreError::Conflict`] if a user with the same
    /// `email_address` already exists; nothing is written in that case.
    fn create_user_with_session(&self, user: &User, session: &Session) -> Result<(), StoreError>;

    /// Look up a user by normalized email address.
    fn find_user_by_email(&self, email_address: &str) -> Result<Option<User>, StoreError>;

    /// Look up a user by id.
    fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Resolve a session from the digest of its client token.
    fn find_session_by_token_digest(&self, digest: &str) -> Result<Option<Session>, StoreError>;

    /// All sessions owned by a user.
    fn sessions_for_user(&self, user_id: Uuid) -> Result<Vec<Session>, StoreError>;

    /// Number of registered users.
    fn user_count(&self) -> Result<usize, StoreError>;
}

/// Open the store selected by configuration.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn AccountStore>, StoreError> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory account store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Sqlite => {
            tracing::info!(path = %config.sqlite_path, "Opening SQLite account store");
            Ok(Arc::new(SqliteStore::open(&config.sqlite_path)?))
        }
    }
}
