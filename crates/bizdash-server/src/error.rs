// Error handling for HTTP handlers
// Maps domain errors to HTTP status codes and API error codes

use std::fmt::{Display, Formatter};

use actix_web::HttpResponse;
use actix_web::http::StatusCode;

pub use bizdash_common::error::{
    ACCESS_DENIED, DATA_ACCESS_ERROR, FILE_READ_FAILED, INVALID_PARAMETER, INVALID_TRANSITION,
    NO_COLUMN_MAPPED, PARENT_NOT_EXIST, RESOURCE_CONFLICT, RESOURCE_NOT_FOUND, SERVER_ERROR,
};
pub use bizdash_common::{BizdashError, ErrorCode};
use bizdash_persistence::sea_orm::DbErr;

use crate::model::response as common;

// Local wrapper so actix-web error handling can be implemented for anyhow errors
#[derive(Debug)]
pub struct AppError {
    inner: anyhow::Error,
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError { inner: value }
    }
}

impl From<BizdashError> for AppError {
    fn from(value: BizdashError) -> Self {
        AppError {
            inner: value.into(),
        }
    }
}

impl AppError {
    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }

    pub fn downcast_ref<E: std::error::Error + Send + Sync + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// HTTP status and API error code for the wrapped error
    pub fn classify(&self) -> (StatusCode, ErrorCode<'static>) {
        if let Some(e) = self.downcast_ref::<BizdashError>() {
            return match e {
                BizdashError::IllegalArgument(_) => {
                    (StatusCode::BAD_REQUEST, INVALID_PARAMETER)
                }
                BizdashError::NotFound(_, _) => (StatusCode::NOT_FOUND, RESOURCE_NOT_FOUND),
                BizdashError::AlreadyExists(_, _) => (StatusCode::CONFLICT, RESOURCE_CONFLICT),
                BizdashError::ParentNotFound(_) => (StatusCode::BAD_REQUEST, PARENT_NOT_EXIST),
                BizdashError::DatabaseError(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, DATA_ACCESS_ERROR)
                }
                BizdashError::NotLoggedIn => (StatusCode::UNAUTHORIZED, ACCESS_DENIED),
                BizdashError::InvalidTransition { .. } => (StatusCode::CONFLICT, INVALID_TRANSITION),
                BizdashError::NoColumnMapped => (StatusCode::BAD_REQUEST, NO_COLUMN_MAPPED),
                BizdashError::FileReadError { .. } => {
                    (StatusCode::BAD_REQUEST, FILE_READ_FAILED)
                }
                BizdashError::ConfigError(_) | BizdashError::InternalError(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
                }
            };
        }

        if self.downcast_ref::<DbErr>().is_some() {
            (StatusCode::INTERNAL_SERVER_ERROR, DATA_ACCESS_ERROR)
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
        }
    }
}

impl actix_web::error::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.classify().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status, code) = self.classify();
        if status.is_server_error() {
            tracing::error!(code = code.code, "Request failed: {:#}", self.inner);
        }

        common::Result::<String>::http_error(status.as_u16(), code.code, &self.inner.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    fn status_and_code(err: impl Into<AppError>) -> (u16, i32) {
        let (status, code) = err.into().classify();
        (status.as_u16(), code.code)
    }

    #[test]
    fn test_domain_errors_are_classified() {
        assert_eq!(
            status_and_code(BizdashError::IllegalArgument("bad".to_string())),
            (400, INVALID_PARAMETER.code)
        );
        assert_eq!(
            status_and_code(BizdashError::not_found("site", "S1")),
            (404, RESOURCE_NOT_FOUND.code)
        );
        assert_eq!(
            status_and_code(BizdashError::already_exists("site", "S1")),
            (409, RESOURCE_CONFLICT.code)
        );
        assert_eq!(
            status_and_code(BizdashError::ParentNotFound("x".to_string())),
            (400, PARENT_NOT_EXIST.code)
        );
        assert_eq!(
            status_and_code(BizdashError::NotLoggedIn),
            (401, ACCESS_DENIED.code)
        );
        assert_eq!(
            status_and_code(BizdashError::NoColumnMapped),
            (400, NO_COLUMN_MAPPED.code)
        );
        assert_eq!(
            status_and_code(BizdashError::InvalidTransition {
                from: "upload".to_string(),
                action: "process files".to_string(),
            }),
            (409, INVALID_TRANSITION.code)
        );
    }

    #[test]
    fn test_database_errors_are_data_access_errors() {
        let err = anyhow::Error::from(DbErr::Custom("disk I/O error".to_string()));
        assert_eq!(status_and_code(err), (500, DATA_ACCESS_ERROR.code));

        let err = anyhow::anyhow!("something else");
        assert_eq!(status_and_code(err), (500, SERVER_ERROR.code));
    }

    #[test]
    fn test_status_code_matches_response() {
        let err = AppError::from(BizdashError::not_found("partner", "P1"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_response().status(), StatusCode::NOT_FOUND);
    }
}
