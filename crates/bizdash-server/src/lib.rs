// Main library module for Bizdash - a business reporting dashboard server

pub mod api; // HTTP handlers and routes
pub mod error; // Error to HTTP response mapping
pub mod middleware; // HTTP middleware
pub mod model; // Configuration, sessions and shared state
pub mod startup; // Application startup utilities

pub use error::AppError;
pub use model::{AppState, Configuration};
