//! In-memory account store.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::accounts::{Session, User};
use crate::store::{AccountStore, StoreError};

/// A thread-safe, process-local account store.
///
/// Users are keyed by normalized email, which doubles as the uniqueness
/// constraint. Sessions are keyed by token digest.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    sessions: DashMap<String, Session>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryStore {
    fn create_user_with_session(&self, user: &User, session: &Session) -> Result<(), StoreError> {
        match self.users.entry(user.email_address.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict),
            Entry::Vacant(slot) => {
                if self.sessions.contains_key(&session.token_digest) {
                    return Err(StoreError::Conflict);
                }
                // The shard lock on the email stays held until the session is in.
                let _user = slot.insert(user.clone());
                self.sessions
                    .insert(session.token_digest.clone(), session.clone());
                Ok(())
            }
        }
    }

    fn find_user_by_email(&self, email_address: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(email_address).map(|u| u.value().clone()))
    }

    fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.value().clone()))
    }

    fn find_session_by_token_digest(&self, digest: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.get(digest).map(|s| s.value().clone()))
    }

    fn sessions_for_user(&self, user_id: Uuid) -> Result<Vec<Session>, StoreError> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.value().clone())
            .collect())
    }

    fn user_count(&self) -> Result<usize, StoreError> {
        Ok(self.users.len())
    }
}
