//! Configuration management for the Bizdash server
//!
//! Sources are layered in order: `conf/application.yml`, environment variables
//! prefixed with `bizdash.`, then command line overrides.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File};

use bizdash_common::BizdashError;
use bizdash_persistence::DatabaseConfig;

use crate::startup::LoggingConfig;

use super::session::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE};

pub const DEFAULT_CONFIG_FILE: &str = "conf/application.yml";
pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_CONTEXT_PATH: &str = "/bizdash";

pub const SERVER_ADDRESS_PROPERTY: &str = "server.address";
pub const SERVER_PORT_PROPERTY: &str = "server.port";
pub const CONTEXT_PATH_PROPERTY: &str = "server.context_path";
pub const DATA_DIR_PROPERTY: &str = "data.dir";
pub const DB_FILE_PROPERTY: &str = "data.db_file";
pub const LOG_LEVEL_PROPERTY: &str = "logs.level";

/// Command line arguments for the server
#[derive(Debug, Default, Parser)]
#[command(name = "bizdash-server", about = "Business reporting dashboard server")]
pub struct Cli {
    #[arg(short = 'c', long = "config", env = "BIZDASH_CONFIG")]
    pub config_file: Option<String>,
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<String>,
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

/// Application configuration loaded from config files, environment and CLI
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    /// Load configuration using the process command line
    pub fn new() -> Result<Self, BizdashError> {
        Self::load(Cli::parse())
    }

    pub fn load(args: Cli) -> Result<Self, BizdashError> {
        let config_file = args
            .config_file
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut builder = Config::builder()
            .add_source(File::with_name(&config_file).required(false))
            .add_source(
                Environment::with_prefix("bizdash")
                    .separator(".")
                    .try_parsing(true),
            );

        let overrides: [(&str, Option<config::Value>); 3] = [
            (DATA_DIR_PROPERTY, args.data_dir.map(Into::into)),
            (SERVER_PORT_PROPERTY, args.port.map(|p| i64::from(p).into())),
            (LOG_LEVEL_PROPERTY, args.log_level.map(Into::into)),
        ];
        for (key, value) in overrides {
            if let Some(value) = value {
                builder = builder
                    .set_override(key, value)
                    .map_err(|e| BizdashError::ConfigError(e.to_string()))?;
            }
        }

        let config = builder
            .build()
            .map_err(|e| BizdashError::ConfigError(format!("{config_file}: {e}")))?;

        Ok(Configuration { config })
    }

    pub fn from_config(config: Config) -> Self {
        Configuration { config }
    }

    // ========================================================================
    // Server Configuration
    // ========================================================================

    pub fn server_address(&self) -> String {
        self.config
            .get_string(SERVER_ADDRESS_PROPERTY)
            .unwrap_or(DEFAULT_SERVER_ADDRESS.to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int(SERVER_PORT_PROPERTY)
            .ok()
            .and_then(|p| u16::try_from(p).ok())
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    /// Context path with a leading slash and no trailing slash
    pub fn server_context_path(&self) -> String {
        let path = self
            .config
            .get_string(CONTEXT_PATH_PROPERTY)
            .unwrap_or(DEFAULT_CONTEXT_PATH.to_string());
        let path = path.trim().trim_matches('/');

        if path.is_empty() {
            String::new()
        } else {
            format!("/{path}")
        }
    }

    // ========================================================================
    // Database Configuration
    // ========================================================================

    pub fn data_dir(&self) -> String {
        self.config
            .get_string(DATA_DIR_PROPERTY)
            .unwrap_or("data".to_string())
    }

    pub fn db_file(&self) -> String {
        self.config
            .get_string(DB_FILE_PROPERTY)
            .unwrap_or("business_dashboard.db".to_string())
    }

    fn seconds(&self, key: &str, default: Duration) -> Duration {
        self.config
            .get_int(key)
            .ok()
            .and_then(|s| u64::try_from(s).ok())
            .map(Duration::from_secs)
            .unwrap_or(default)
    }

    pub fn database_config(&self) -> DatabaseConfig {
        let defaults = DatabaseConfig::default();

        DatabaseConfig {
            data_dir: PathBuf::from(self.data_dir()),
            db_file: self.db_file(),
            connect_timeout: self.seconds("db.connect_timeout", defaults.connect_timeout),
            sqlx_logging: self.config.get_bool("db.sqlx_logging").unwrap_or(false),
            ttl_realtime: self.seconds("cache.ttl.realtime", defaults.ttl_realtime),
            ttl_dashboard: self.seconds("cache.ttl.dashboard", defaults.ttl_dashboard),
            ttl_reports: self.seconds("cache.ttl.reports", defaults.ttl_reports),
            ttl_master: self.seconds("cache.ttl.master", defaults.ttl_master),
        }
    }

    /// Idle time after which a session ends
    pub fn session_idle_timeout(&self) -> Duration {
        self.seconds("session.idle_timeout", DEFAULT_SESSION_IDLE)
    }

    pub fn max_sessions(&self) -> u64 {
        self.config
            .get_int("session.max_sessions")
            .ok()
            .and_then(|n| u64::try_from(n).ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_SESSIONS)
    }

    // ========================================================================
    // Logging Configuration
    // ========================================================================

    pub fn log_dir(&self) -> Option<String> {
        self.config.get_string("logs.path").ok()
    }

    pub fn log_level(&self) -> String {
        self.config
            .get_string(LOG_LEVEL_PROPERTY)
            .unwrap_or("info".to_string())
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::from_config(
            self.log_dir(),
            self.config.get_bool("logs.console").unwrap_or(true),
            self.config.get_bool("logs.file").unwrap_or(true),
            &self.log_level(),
            &self.config.get_string("logs.rotation").unwrap_or_default(),
        )
    }
}
