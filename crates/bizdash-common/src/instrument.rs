//! Instrumentation helpers built on `tracing`.
//!
//! Service code uses `#[tracing::instrument]` for spans; these helpers cover the
//! remaining cases: explicit entry/exit events, duration timing with success and
//! failure paths, lightweight call tracing, and a scoped timing guard.

use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};

use tracing::Level;

/// Emit `message` at a level chosen at runtime.
fn log_at(level: Level, message: &str) {
    if level == Level::ERROR {
        tracing::error!("{}", message);
    } else if level == Level::WARN {
        tracing::warn!("{}", message);
    } else if level == Level::INFO {
        tracing::info!("{}", message);
    } else if level == Level::DEBUG {
        tracing::debug!("{}", message);
    } else {
        tracing::trace!("{}", message);
    }
}

/// Log entry and exit of `f` at `level`.
pub fn traced<T>(name: &str, level: Level, f: impl FnOnce() -> T) -> T {
    log_at(level, &format!("Entering '{}'", name));
    let result = f();
    log_at(level, &format!("Exiting '{}' (completed)", name));
    result
}

/// Run `f` and log how long it took. Errors are logged with the elapsed time
/// and returned unchanged.
pub fn timed<T, E: Display>(operation: &str, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let start = Instant::now();
    tracing::info!("[{}] Starting...", operation);
    let result = f();
    log_outcome(operation, start.elapsed(), &result);
    result
}

/// Async variant of [`timed`].
pub async fn timed_async<T, E, F>(operation: &str, fut: F) -> Result<T, E>
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    tracing::info!("[{}] Starting...", operation);
    let result = fut.await;
    log_outcome(operation, start.elapsed(), &result);
    result
}

fn log_outcome<T, E: Display>(operation: &str, elapsed: Duration, result: &Result<T, E>) {
    match result {
        Ok(_) => tracing::info!(
            "[{}] Completed in {:.3}s",
            operation,
            elapsed.as_secs_f64()
        ),
        Err(e) => tracing::error!(
            "[{}] Failed after {:.3}s: {}",
            operation,
            elapsed.as_secs_f64(),
            e
        ),
    }
}

/// Single debug event per call, no timing.
pub fn lazy_trace<T>(name: &str, f: impl FnOnce() -> T) -> T {
    tracing::debug!("Calling {}", name);
    f()
}

/// Scoped timing guard.
///
/// Logs `[OP] Starting...` on creation and `[OP] Completed in N.NNNs` when
/// dropped. Calling [`LogContext::fail`] logs the failure instead and consumes
/// the guard.
///
/// ```ignore
/// let ctx = LogContext::enter("PROCESSING_CSV");
/// if let Err(e) = parse() {
///     ctx.fail(&e);
/// }
/// ```
#[derive(Debug)]
pub struct LogContext {
    operation: String,
    level: Level,
    start: Instant,
    failed: bool,
}

impl LogContext {
    pub fn enter(operation: impl Into<String>) -> Self {
        Self::with_level(operation, Level::INFO)
    }

    pub fn with_level(operation: impl Into<String>, level: Level) -> Self {
        let operation = operation.into();
        log_at(level, &format!("[{}] Starting...", operation));
        Self {
            operation,
            level,
            start: Instant::now(),
            failed: false,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn fail(mut self, err: &dyn Display) {
        self.failed = true;
        tracing::error!(
            "[{}] Failed after {:.3}s: {}",
            self.operation,
            self.elapsed().as_secs_f64(),
            err
        );
    }
}

impl Drop for LogContext {
    fn drop(&mut self) {
        if !self.failed {
            log_at(
                self.level,
                &format!(
                    "[{}] Completed in {:.3}s",
                    self.operation,
                    self.start.elapsed().as_secs_f64()
                ),
            );
        }
    }
}
