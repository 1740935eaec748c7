//! Application startup utilities module.

mod http;
mod logging;

pub use http::{app_config, main_server};
pub use logging::{LogComponent, LogRotation, LoggingConfig, LoggingGuard, init_logging};
