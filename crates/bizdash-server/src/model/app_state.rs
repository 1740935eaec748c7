//! Application state shared across all handlers

use std::sync::Arc;

use bizdash_persistence::Database;

use super::config::Configuration;
use super::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub configuration: Configuration,
    pub database: Database,
    pub sessions: Arc<SessionStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("configuration", &self.configuration)
            .field("database", &self.database.info().database_url)
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

impl AppState {
    pub fn new(configuration: Configuration, database: Database) -> Self {
        let sessions = SessionStore::with_limits(
            configuration.session_idle_timeout(),
            configuration.max_sessions(),
        );

        Self {
            configuration,
            database,
            sessions: Arc::new(sessions),
        }
    }

    pub fn context_path(&self) -> String {
        self.configuration.server_context_path()
    }
}
