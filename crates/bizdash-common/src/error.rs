//! Domain errors and the numeric codes carried in API responses

use serde::{Deserialize, Serialize};

/// Every failure a Bizdash operation can report
#[derive(thiserror::Error, Debug)]
pub enum BizdashError {
    #[error("invalid argument: {0}")]
    IllegalArgument(String),

    #[error("{0} '{1}' not found")]
    NotFound(String, String),

    #[error("{0} '{1}' already exists")]
    AlreadyExists(String, String),

    #[error("missing parent record: {0}")]
    ParentNotFound(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("login required")]
    NotLoggedIn,

    #[error("cannot {action} while at step '{from}'")]
    InvalidTransition { from: String, action: String },

    #[error("please map at least one column")]
    NoColumnMapped,

    #[error("error reading {file}: {message}")]
    FileReadError { file: String, message: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl BizdashError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        BizdashError::NotFound(entity.to_string(), id.to_string())
    }

    pub fn already_exists(entity: &str, id: &str) -> Self {
        BizdashError::AlreadyExists(entity.to_string(), id.to_string())
    }
}

/// Numeric code and short message of an API response
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

pub const SUCCESS: ErrorCode<'static> = ErrorCode {
    code: 0,
    message: "success",
};

pub const ACCESS_DENIED: ErrorCode<'static> = ErrorCode {
    code: 10001,
    message: "login required",
};

pub const DATA_ACCESS_ERROR: ErrorCode<'static> = ErrorCode {
    code: 10002,
    message: "database unavailable",
};

pub const INVALID_PARAMETER: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "invalid parameter",
};

pub const RESOURCE_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20004,
    message: "record not found",
};

pub const RESOURCE_CONFLICT: ErrorCode<'static> = ErrorCode {
    code: 20005,
    message: "record already exists",
};

pub const PARENT_NOT_EXIST: ErrorCode<'static> = ErrorCode {
    code: 20006,
    message: "missing parent record",
};

pub const INVALID_TRANSITION: ErrorCode<'static> = ErrorCode {
    code: 23000,
    message: "wizard step out of order",
};

pub const NO_COLUMN_MAPPED: ErrorCode<'static> = ErrorCode {
    code: 23001,
    message: "no column mapped",
};

pub const SERVER_ERROR: ErrorCode<'static> = ErrorCode {
    code: 30000,
    message: "internal server error",
};

pub const FILE_READ_FAILED: ErrorCode<'static> = ErrorCode {
    code: 100004,
    message: "uploaded file could not be read",
};
