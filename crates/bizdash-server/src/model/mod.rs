//! Data models module
//!
//! - `config` - Configuration management
//! - `response` - HTTP response envelope
//! - `session` - Per-session login flag and upload wizard
//! - `app_state` - Application state shared across handlers

pub mod app_state;
pub mod config;
pub mod response;
pub mod session;

pub use app_state::AppState;
pub use config::Configuration;
pub use response::Result;
pub use session::{SESSION_COOKIE, SessionContext, SessionHandle, SessionStore};
