//! Bizdash Common - Shared types and utilities
//!
//! This crate provides the foundational types used across all Bizdash components:
//! - Error types and error codes
//! - Instrumentation helpers (timers, entry/exit tracing, scoped log contexts)

pub mod error;
pub mod instrument;

// Re-exports for convenience
pub use error::{BizdashError, ErrorCode};
pub use instrument::{LogContext, lazy_trace, timed, timed_async, traced};
