//! Service-level errors and their HTTP mapping.
//!
//! Handlers return `Result<_, ServiceError>`; actix turns the error into a
//! JSON [`ApiError`] body with the matching status code.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::requests::ApiError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Failed to load template '{path}': {reason}")]
    TemplateFetch { path: String, reason: String },

    #[error("Storage error: {0}")]
    Persistence(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Portfolio {id} was modified elsewhere (stored version {current}, expected {expected})")]
    Conflict { id: String, current: u64, expected: u64 },

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::TemplateFetch { .. } => "template_fetch",
            ServiceError::Persistence(_) => "persistence",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Conflict { .. } => "conflict",
            ServiceError::BadRequest(_) => "bad_request",
        }
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(e: rusqlite::Error) -> Self {
        ServiceError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Persistence(e.to_string())
    }
}

impl From<actix_web::error::BlockingError> for ServiceError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        ServiceError::Persistence(e.to_string())
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            // a missing template file blocks the editor the same way a
            // missing record does
            ServiceError::TemplateFetch { .. } | ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Conflict { .. } => StatusCode::CONFLICT,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("{self}");
        } else {
            log::warn!("{self}");
        }
        HttpResponse::build(self.status_code()).json(ApiError {
            kind: self.kind().to_string(),
            message: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_map_to_409() {
        let err = ServiceError::Conflict {
            id: "p1".into(),
            current: 3,
            expected: 2,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.kind(), "conflict");
    }

    #[test]
    fn storage_failures_are_503() {
        let err: ServiceError = rusqlite::Error::InvalidQuery.into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
