//! Admin sessions.
//!
//! A session is a random token mapped to `{isAdmin, expiresAt}`. Holding a
//! live admin session is the `Authenticated` state; anything else (no
//! token, unknown token, expired token) is `Anonymous`.
//!
//! [`MemorySessionStore`] lives for the process; [`RedbSessionStore`] keeps
//! sessions across restarts in a single redb file whose `SESSIONS` table maps
//! the token to a JSON-encoded [`Session`].

use crate::error::{NotchError, Result};
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const TOKEN_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub is_admin: bool,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new_admin(ttl: Duration) -> Result<Self> {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|delta| Utc::now().checked_add_signed(delta))
            .ok_or_else(|| {
                NotchError::Validation(format!("session ttl out of range: {ttl:?}"))
            })?;
        Ok(Self {
            token: generate_token(),
            is_admin: true,
            expires_at,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Random alphanumeric session token.
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminState {
    Anonymous,
    Authenticated { expires_at: DateTime<Utc> },
}

impl AdminState {
    pub fn is_admin(&self) -> bool {
        matches!(self, AdminState::Authenticated { .. })
    }
}

pub trait SessionStore: Send + Sync {
    /// Start a new admin session lasting `ttl`.
    fn create(&self, ttl: Duration) -> Result<Session>;

    /// Look up a live session. Expired sessions are dropped and reported as
    /// absent.
    fn get(&self, token: &str) -> Result<Option<Session>>;

    fn remove(&self, token: &str) -> Result<()>;

    /// Drop every expired session, returning how many were removed.
    fn purge_expired(&self) -> Result<usize>;

    fn admin_state(&self, token: Option<&str>) -> Result<AdminState> {
        let Some(token) = token else {
            return Ok(AdminState::Anonymous);
        };
        Ok(match self.get(token)? {
            Some(session) if session.is_admin => AdminState::Authenticated {
                expires_at: session.expires_at,
            },
            _ => AdminState::Anonymous,
        })
    }
}

// ---------------------------------------------------------------------------
// MemorySessionStore
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a session as-is. Lets tests plant already-expired sessions.
    pub fn insert(&self, session: Session) {
        self.lock().insert(session.token.clone(), session);
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self, ttl: Duration) -> Result<Session> {
        let session = Session::new_admin(ttl)?;
        self.insert(session.clone());
        Ok(session)
    }

    fn get(&self, token: &str) -> Result<Option<Session>> {
        let mut sessions = self.lock();
        match sessions.get(token) {
            Some(session) if session.is_expired(Utc::now()) => {
                sessions.remove(token);
                Ok(None)
            }
            other => Ok(other.cloned()),
        }
    }

    fn remove(&self, token: &str) -> Result<()> {
        self.lock().remove(token);
        Ok(())
    }

    fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        Ok(before - sessions.len())
    }
}

// ---------------------------------------------------------------------------
// RedbSessionStore
// ---------------------------------------------------------------------------

/// Key: session token. Value: JSON-encoded Session.
const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

fn db_err(e: impl std::fmt::Display) -> NotchError {
    NotchError::SessionDb(e.to_string())
}

pub struct RedbSessionStore {
    db: Database,
}

impl RedbSessionStore {
    /// Open or create the database at `path`, creating the table up front.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(db_err)?;
        let wt = db.begin_write().map_err(db_err)?;
        wt.open_table(SESSIONS).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        Ok(Self { db })
    }

    /// Insert a session as-is.
    pub fn insert(&self, session: &Session) -> Result<()> {
        let value = serde_json::to_vec(session)?;
        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = wt.open_table(SESSIONS).map_err(db_err)?;
            table
                .insert(session.token.as_str(), value.as_slice())
                .map_err(db_err)?;
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }
}

impl SessionStore for RedbSessionStore {
    fn create(&self, ttl: Duration) -> Result<Session> {
        let session = Session::new_admin(ttl)?;
        self.insert(&session)?;
        Ok(session)
    }

    fn get(&self, token: &str) -> Result<Option<Session>> {
        let session = {
            let rt = self.db.begin_read().map_err(db_err)?;
            let table = rt.open_table(SESSIONS).map_err(db_err)?;
            let Some(value) = table.get(token).map_err(db_err)? else {
                return Ok(None);
            };
            let session: Session = serde_json::from_slice(value.value())?;
            session
        };
        if session.is_expired(Utc::now()) {
            self.remove(token)?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    fn remove(&self, token: &str) -> Result<()> {
        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = wt.open_table(SESSIONS).map_err(db_err)?;
            table.remove(token).map_err(db_err)?;
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }

    fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let wt = self.db.begin_write().map_err(db_err)?;
        let removed = {
            let mut table = wt.open_table(SESSIONS).map_err(db_err)?;
            let mut expired = Vec::new();
            for entry in table.iter().map_err(db_err)? {
                let (k, v) = entry.map_err(db_err)?;
                // Undecodable rows are dropped along with expired ones.
                let stale = serde_json::from_slice::<Session>(v.value())
                    .map(|s| s.is_expired(now))
                    .unwrap_or(true);
                if stale {
                    expired.push(k.value().to_string());
                }
            }
            for token in &expired {
                table.remove(token.as_str()).map_err(db_err)?;
            }
            expired.len()
        };
        wt.commit().map_err(db_err)?;
        Ok(removed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HOUR: Duration = Duration::from_secs(3600);

    fn expired_session() -> Session {
        Session {
            token: generate_token(),
            is_admin: true,
            expires_at: Utc::now() - chrono::Duration::minutes(1),
        }
    }

    fn exercise(store: &dyn SessionStore) {
        assert_eq!(store.admin_state(None).unwrap(), AdminState::Anonymous);
        assert_eq!(
            store.admin_state(Some("unknown")).unwrap(),
            AdminState::Anonymous
        );

        let session = store.create(HOUR).unwrap();
        assert!(session.is_admin);
        assert!(store.admin_state(Some(&session.token)).unwrap().is_admin());

        store.remove(&session.token).unwrap();
        assert_eq!(store.get(&session.token).unwrap(), None);
        assert!(!store.admin_state(Some(&session.token)).unwrap().is_admin());
    }

    #[test]
    fn tokens_are_random_alphanumeric() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn memory_store_lifecycle() {
        exercise(&MemorySessionStore::new());
    }

    #[test]
    fn memory_store_expires_sessions() {
        let store = MemorySessionStore::new();
        let stale = expired_session();
        store.insert(stale.clone());
        assert_eq!(store.get(&stale.token).unwrap(), None);
        assert_eq!(
            store.admin_state(Some(&stale.token)).unwrap(),
            AdminState::Anonymous
        );
    }

    #[test]
    fn memory_store_purges_only_expired() {
        let store = MemorySessionStore::new();
        store.insert(expired_session());
        store.insert(expired_session());
        let live = store.create(HOUR).unwrap();
        assert_eq!(store.purge_expired().unwrap(), 2);
        assert!(store.get(&live.token).unwrap().is_some());
    }

    #[test]
    fn ttl_past_the_calendar_is_rejected() {
        // Fits chrono's Duration but lands beyond its last representable date.
        let ttl = Duration::from_secs(1_000_000_000_000_000);
        let err = Session::new_admin(ttl).unwrap_err();
        assert!(matches!(err, NotchError::Validation(_)));

        let err = MemorySessionStore::new().create(Duration::MAX).unwrap_err();
        assert!(matches!(err, NotchError::Validation(_)));
    }

    #[test]
    fn zero_ttl_session_is_already_expired() {
        let store = MemorySessionStore::new();
        let session = store.create(Duration::ZERO).unwrap();
        assert_eq!(store.get(&session.token).unwrap(), None);
    }

    #[test]
    fn redb_store_lifecycle() {
        let dir = TempDir::new().unwrap();
        let store = RedbSessionStore::open(&dir.path().join("sessions.redb")).unwrap();
        exercise(&store);
    }

    #[test]
    fn redb_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state/sessions.redb");
        let token = {
            let store = RedbSessionStore::open(&path).unwrap();
            store.create(HOUR).unwrap().token
        };
        let store = RedbSessionStore::open(&path).unwrap();
        assert!(store.admin_state(Some(&token)).unwrap().is_admin());
    }

    #[test]
    fn redb_store_expires_and_purges() {
        let dir = TempDir::new().unwrap();
        let store = RedbSessionStore::open(&dir.path().join("sessions.redb")).unwrap();
        let stale = expired_session();
        store.insert(&stale).unwrap();
        store.insert(&expired_session()).unwrap();
        let live = store.create(HOUR).unwrap();

        assert_eq!(store.get(&stale.token).unwrap(), None);
        assert_eq!(store.purge_expired().unwrap(), 1);
        assert!(store.get(&live.token).unwrap().is_some());
    }
}
