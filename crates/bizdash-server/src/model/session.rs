//! Per-session state keyed by the session cookie
//!
//! Sessions expire after a period without requests and the store holds a
//! bounded number of them, evicting the least recently used first.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use parking_lot::Mutex;
use serde::Serialize;

use bizdash_ingest::UploadWizard;

pub const SESSION_COOKIE: &str = "BIZDASH_SESSION";
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(1800);
pub const DEFAULT_MAX_SESSIONS: u64 = 10_000;

/// Login flag and upload wizard of one browser session
#[derive(Debug, Default)]
pub struct SessionContext {
    pub logged_in: bool,
    pub wizard: UploadWizard,
}

pub type SharedSession = Arc<Mutex<SessionContext>>;

/// Session id and context attached to a request by the session middleware
#[derive(Clone, Debug)]
pub struct SessionHandle {
    pub id: String,
    pub context: SharedSession,
}

impl SessionHandle {
    pub fn is_logged_in(&self) -> bool {
        self.context.lock().logged_in
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub logged_in: bool,
    pub wizard_step: String,
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: Cache<String, SharedSession>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_SESSION_IDLE, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose sessions end after `idle` without a lookup, holding at most `capacity`
    pub fn with_limits(idle: Duration, capacity: u64) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(capacity)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// Look a session up, which also keeps it alive
    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.get(id).map(|context| SessionHandle {
            id: id.to_string(),
            context,
        })
    }

    /// Start a fresh session with a random id
    pub fn create(&self) -> SessionHandle {
        let id = uuid::Uuid::new_v4().to_string();
        let context: SharedSession = Arc::default();
        self.sessions.insert(id.clone(), context.clone());

        SessionHandle { id, context }
    }

    pub fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn is_logged_in(&self, id: &str) -> bool {
        self.get(id).is_some_and(|session| session.is_logged_in())
    }

    /// Live sessions, after pending expirations and evictions are applied
    pub fn len(&self) -> usize {
        self.sessions.run_pending_tasks();
        self.sessions.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
