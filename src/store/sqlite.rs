//! SQLite-backed account store.
//!
//! Tables:
//! - `users`: id, email_address (unique), password_digest, created_at
//! - `sessions`: id, user_id → users, token_digest (unique), user_agent, ip_address, created_at

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use uuid::Uuid;

use crate::accounts::{Session, User};
use crate::store::{AccountStore, StoreError};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email_address TEXT NOT NULL,
        password_digest TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS index_users_on_email_address ON users(email_address);

    CREATE TABLE IF NOT EXISTS sessions (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        token_digest TEXT NOT NULL,
        user_agent TEXT,
        ip_address TEXT,
        created_at INTEGER NOT NULL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS index_sessions_on_token_digest ON sessions(token_digest);
    CREATE INDEX IF NOT EXISTS index_sessions_on_user_id ON sessions(user_id);
";

const USER_COLUMNS: &str = "id, email_address, password_digest, created_at";
const SESSION_COLUMNS: &str = "id, user_id, token_digest, user_agent, ip_address, created_at";

/// Account store persisted in a single SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Self::with_connection(conn)
    }

    /// A private, non-persistent database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_at(row, 0)?,
        email_address: row.get(1)?,
        password_digest: row.get(2)?,
        created_at: row.get::<_, i64>(3)? as u64,
    })
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: uuid_at(row, 0)?,
        user_id: uuid_at(row, 1)?,
        token_digest: row.get(2)?,
        user_agent: row.get(3)?,
        ip_address: row.get(4)?,
        created_at: row.get::<_, i64>(5)? as u64,
    })
}

fn map_constraint(err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(ref e, _) if e.code == ErrorCode::ConstraintViolation => {
            StoreError::Conflict
        }
        other => StoreError::Database(other),
    }
}

impl AccountStore for SqliteStore {
    fn create_user_with_session(&self, user: &User, session: &Session) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO users (id, email_address, password_digest, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.to_string(),
                user.email_address,
                user.password_digest,
                user.created_at as i64
            ],
        )
        .map_err(map_constraint)?;

        tx.execute(
            "INSERT INTO sessions (id, user_id, token_digest, user_agent, ip_address, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.id.to_string(),
                session.user_id.to_string(),
                session.token_digest,
                session.user_agent,
                session.ip_address,
                session.created_at as i64
            ],
        )
        .map_err(map_constraint)?;

        // Dropping `tx` on an early return above rolls back the user row.
        tx.commit()?;
        Ok(())
    }

    fn find_user_by_email(&self, email_address: &str) -> Result<Option<User>, StoreError> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email_address = ?1"),
                params![email_address],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id.to_string()],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn find_session_by_token_digest(&self, digest: &str) -> Result<Option<Session>, StoreError> {
        let conn = self.lock()?;
        let session = conn
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE token_digest = ?1"),
                params![digest],
                session_from_row,
            )
            .optional()?;
        Ok(session)
    }

    fn sessions_for_user(&self, user_id: Uuid) -> Result<Vec<Session>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = ?1 ORDER BY created_at"
        ))?;
        let sessions = stmt
            .query_map(params![user_id.to_string()], session_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }

    fn user_count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::session::{start_session_for, SessionContext};

    fn user(email: &str) -> User {
        User::new(email.to_string(), "$argon2id$placeholder".to_string())
    }

    #[test]
    fn test_round_trip_user_and_session() {
        let store = SqliteStore::open_in_memory().unwrap();
        let user = user("a@example.com");
        let context = SessionContext {
            user_agent: Some("Mozilla/5.0".into()),
            ip_address: None,
        };
        let (session, token) = start_session_for(&user, context);
        store.create_user_with_session(&user, &session).unwrap();

        assert_eq!(store.find_user_by_email("a@example.com").unwrap(), Some(user.clone()));
        assert_eq!(store.find_user(user.id).unwrap(), Some(user.clone()));
        assert_eq!(
            store.find_session_by_token_digest(&token.digest()).unwrap(),
            Some(session.clone())
        );
        assert_eq!(store.sessions_for_user(user.id).unwrap(), vec![session]);
        assert_eq!(store.user_count().unwrap(), 1);
    }

    #[test]
    fn test_unique_email_rolls_back() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = user("dup@example.com");
        let (s1, _) = start_session_for(&first, SessionContext::default());
        store.create_user_with_session(&first, &s1).unwrap();

        let second = user("dup@example.com");
        let (s2, t2) = start_session_for(&second, SessionContext::default());
        assert!(matches!(
            store.create_user_with_session(&second, &s2),
            Err(StoreError::Conflict)
        ));
        assert_eq!(store.user_count().unwrap(), 1);
        assert!(store.find_session_by_token_digest(&t2.digest()).unwrap().is_none());
    }

    #[test]
    fn test_session_conflict_rolls_back_user() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = user("one@example.com");
        let (s1, _) = start_session_for(&first, SessionContext::default());
        store.create_user_with_session(&first, &s1).unwrap();

        // Same token digest as an existing session: the whole write is undone.
        let second = user("two@example.com");
        let (mut s2, _) = start_session_for(&second, SessionContext::default());
        s2.token_digest = s1.token_digest.clone();
        assert!(matches!(
            store.create_user_with_session(&second, &s2),
            Err(StoreError::Conflict)
        ));
        assert!(store.find_user_by_email("two@example.com").unwrap().is_none());
        assert_eq!(store.user_count().unwrap(), 1);
    }

    #[test]
    fn test_session_requires_existing_user() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ghost = user("ghost@example.com");
        let (session, _) = start_session_for(&ghost, SessionContext::default());
        let conn = store.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO sessions (id, user_id, token_digest, created_at) VALUES (?1, ?2, ?3, 0)",
            params![session.id.to_string(), ghost.id.to_string(), session.token_digest],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.sqlite3");
        let user = user("kept@example.com");
        {
            let store = SqliteStore::open(&path).unwrap();
            let (session, _) = start_session_for(&user, SessionContext::default());
            store.create_user_with_session(&user, &session).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.find_user_by_email("kept@example.com").unwrap(), Some(user));
    }
}
