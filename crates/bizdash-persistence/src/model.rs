//! Domain model types for the persistence layer

use std::fmt;

use sea_orm::prelude::DateTime;
use serde::{Deserialize, Serialize};

/// Local wall-clock time, the timestamp stored in audit columns
pub fn now() -> DateTime {
    chrono::Local::now().naive_local()
}

/// Generic paginated result
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_count: u64,
    pub page_number: u64,
    pub pages_available: u64,
    pub page_items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(total_count: u64, page_number: u64, page_size: u64, page_items: Vec<T>) -> Self {
        Self {
            total_count,
            page_number,
            pages_available: if page_size > 0 {
                total_count.div_ceil(page_size)
            } else {
                0
            },
            page_items,
        }
    }

    pub fn empty() -> Self {
        Self {
            total_count: 0,
            page_number: 0,
            pages_available: 0,
            page_items: Vec::new(),
        }
    }
}

impl<T: Clone> Page<T> {
    /// Cut one page out of an already loaded result set. Page numbers start at 1.
    pub fn slice(items: &[T], page_number: u64, page_size: u64) -> Self {
        let total_count = items.len() as u64;
        if page_size == 0 {
            return Self::new(total_count, 1, total_count, items.to_vec());
        }

        let page_number = page_number.max(1);
        let start = (page_number - 1)
            .saturating_mul(page_size)
            .min(total_count) as usize;
        let end = (start as u64).saturating_add(page_size).min(total_count) as usize;

        Self::new(total_count, page_number, page_size, items[start..end].to_vec())
    }
}

/// Query classes, each with its own cache time-to-live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryCategory {
    Realtime,
    Dashboard,
    Reports,
    Master,
}

impl QueryCategory {
    pub const ALL: [QueryCategory; 4] = [
        QueryCategory::Realtime,
        QueryCategory::Dashboard,
        QueryCategory::Reports,
        QueryCategory::Master,
    ];
}

impl fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryCategory::Realtime => write!(f, "realtime"),
            QueryCategory::Dashboard => write!(f, "dashboard"),
            QueryCategory::Reports => write!(f, "reports"),
            QueryCategory::Master => write!(f, "master"),
        }
    }
}

/// Paths and existence flags of the database file
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInfo {
    pub database_path: String,
    pub database_url: String,
    pub data_directory: String,
    pub database_exists: bool,
    pub data_dir_exists: bool,
}

/// Health checks; every flag is `false` when its check failed
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStatus {
    pub data_dir_exists: bool,
    pub database_exists: bool,
    pub connection_ok: bool,
    pub writeable: bool,
}
