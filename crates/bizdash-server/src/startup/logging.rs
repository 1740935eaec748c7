//! Console and rolling file logging.
//!
//! `bizdash.log` receives every event. Each [`LogComponent`] also writes the
//! events of its own targets to a separate file:
//!
//! | File            | Events                                   |
//! |-----------------|------------------------------------------|
//! | persistence.log | database access, query caches            |
//! | ingest.log      | upload analysis and the wizard endpoints |
//! | access.log      | HTTP access log, session gate            |
//!
//! Files go to `logs/` unless `BIZDASH_LOG_DIR` or `logs.path` points elsewhere.

use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const DEFAULT_LOG_DIR: &str = "logs";
const ROOT_LOG_FILE: &str = "bizdash.log";
const MAX_LOG_FILES: usize = 7;

static LOGGING_CONFIGURED: OnceLock<()> = OnceLock::new();

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// A part of the service with a log file of its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogComponent {
    Persistence,
    Ingest,
    Access,
}

impl LogComponent {
    pub const ALL: [LogComponent; 3] = [
        LogComponent::Persistence,
        LogComponent::Ingest,
        LogComponent::Access,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            LogComponent::Persistence => "persistence.log",
            LogComponent::Ingest => "ingest.log",
            LogComponent::Access => "access.log",
        }
    }

    fn targets(self) -> &'static [&'static str] {
        match self {
            LogComponent::Persistence => &["bizdash_persistence"],
            LogComponent::Ingest => &["bizdash_ingest", "bizdash_server::api::upload"],
            LogComponent::Access => &["actix_web", "bizdash_server::middleware"],
        }
    }

    fn filter(self, level: LevelFilter) -> Targets {
        self.targets()
            .iter()
            .fold(Targets::new(), |targets, target| {
                targets.with_target(*target, level)
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogRotation {
    #[default]
    Daily,
    Hourly,
    Never,
}

impl FromStr for LogRotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(LogRotation::Daily),
            "hourly" => Ok(LogRotation::Hourly),
            "never" => Ok(LogRotation::Never),
            other => Err(format!("unknown log rotation '{other}'")),
        }
    }
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
    pub console_output: bool,
    pub console_level: Level,
    pub file_logging: bool,
    pub file_level: Level,
    pub rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            console_output: true,
            console_level: Level::INFO,
            file_logging: true,
            file_level: Level::INFO,
            rotation: LogRotation::Daily,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

impl LoggingConfig {
    /// Read `BIZDASH_LOG_DIR`, `BIZDASH_LOG_LEVEL`, `BIZDASH_LOG_CONSOLE`,
    /// `BIZDASH_LOG_FILE` and `BIZDASH_LOG_ROTATION`, defaulting what is unset.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();

        Self {
            log_dir: var("BIZDASH_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            console_output: var("BIZDASH_LOG_CONSOLE").is_none_or(|v| parse_flag(&v)),
            file_logging: var("BIZDASH_LOG_FILE").is_none_or(|v| parse_flag(&v)),
            rotation: var("BIZDASH_LOG_ROTATION")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            ..Self::default()
        }
        .with_level(var("BIZDASH_LOG_LEVEL").as_deref().unwrap_or("info"))
    }

    pub fn from_config(
        log_dir: Option<String>,
        console_output: bool,
        file_logging: bool,
        level: &str,
        rotation: &str,
    ) -> Self {
        Self {
            log_dir: log_dir
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            console_output,
            file_logging,
            rotation: rotation.parse().unwrap_or_default(),
            ..Self::default()
        }
        .with_level(level)
    }

    /// Set both sink levels; an unknown level name keeps INFO
    fn with_level(mut self, level: &str) -> Self {
        let level = level.parse().unwrap_or(Level::INFO);
        self.console_level = level;
        self.file_level = level;
        self
    }
}

/// Holds the non-blocking writers open. Dropping it flushes buffered output.
#[derive(Default)]
pub struct LoggingGuard {
    _file_guards: Vec<WorkerGuard>,
}

/// `RUST_LOG` when set, otherwise the configured level
fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

fn file_writer(
    config: &LoggingConfig,
    file_name: &str,
    guards: &mut Vec<WorkerGuard>,
) -> Result<NonBlocking, Box<dyn Error>> {
    let appender = RollingFileAppender::builder()
        .rotation(config.rotation.into())
        .filename_prefix(file_name)
        .max_log_files(MAX_LOG_FILES)
        .build(&config.log_dir)?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    guards.push(guard);
    Ok(writer)
}

fn file_layers(
    config: &LoggingConfig,
    guards: &mut Vec<WorkerGuard>,
) -> Result<Vec<BoxedLayer>, Box<dyn Error>> {
    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(1 + LogComponent::ALL.len());

    let root = fmt::layer()
        .with_writer(file_writer(config, ROOT_LOG_FILE, guards)?)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(level_filter(config.file_level));
    layers.push(Box::new(root));

    for component in LogComponent::ALL {
        let layer = fmt::layer()
            .with_writer(file_writer(config, component.file_name(), guards)?)
            .with_ansi(false)
            .with_filter(component.filter(config.file_level.into()));
        layers.push(Box::new(layer));
    }

    Ok(layers)
}

/// Install the global subscriber.
///
/// Only the first successful call configures anything; later calls return an
/// empty guard.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, Box<dyn Error>> {
    if LOGGING_CONFIGURED.get().is_some() {
        return Ok(LoggingGuard::default());
    }

    let mut guards = Vec::new();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.console_output {
        let console = fmt::layer()
            .with_thread_names(true)
            .with_filter(level_filter(config.console_level));
        layers.push(Box::new(console));
    }

    if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)?;
        layers.extend(file_layers(config, &mut guards)?);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| format!("global subscriber already set: {e}"))?;
    let _ = LOGGING_CONFIGURED.set(());

    if config.file_logging {
        tracing::info!(
            log_dir = %config.log_dir.display(),
            rotation = ?config.rotation,
            "Logging to {} and {} component files",
            ROOT_LOG_FILE,
            LogComponent::ALL.len()
        );
    }

    Ok(LoggingGuard {
        _file_guards: guards,
    })
}
