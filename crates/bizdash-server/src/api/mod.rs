//! HTTP API handlers

pub mod auth;
pub mod master;
pub mod navigation;
pub mod report;
pub mod route;
pub mod system;
pub mod upload;

use actix_web::{HttpMessage, HttpRequest};

use crate::error::{AppError, BizdashError};
use crate::model::SessionHandle;

/// Session attached by the session middleware
pub(crate) fn current_session(req: &HttpRequest) -> Result<SessionHandle, AppError> {
    req.extensions()
        .get::<SessionHandle>()
        .cloned()
        .ok_or_else(|| BizdashError::NotLoggedIn.into())
}
