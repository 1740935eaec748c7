//! Bizdash Persistence - Database entities and persistence layer
//!
//! This crate provides:
//! - SeaORM entity definitions for the business and geographic hierarchy
//! - The soft-delete capability traits (every entity except Retailer)
//! - The database access layer: one connection per process, TTL-class query
//!   caches and scoped transactional writes
//! - Per-entity services and dashboard report queries

pub mod db;
pub mod entity;
pub mod model;
pub mod schema;
pub mod service;
pub mod traits;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export entity prelude
pub use entity::prelude::*;

// Re-export the database access layer
pub use db::{Database, DatabaseConfig};

// Re-export capability traits
pub use traits::{MasterEntity, MasterService, SoftDelete, SoftDeleteEntity};

// Re-export model types
pub use model::{DatabaseInfo, DatabaseStatus, Page, QueryCategory};
