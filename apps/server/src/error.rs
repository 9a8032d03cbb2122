//! # API Errors
//!
//! What an HTTP client sees when a request fails.
//!
//! ## Mapping
//! ```text
//! ┌──────────────────────────────┬──────────────────────┬────────┬───────────┐
//! │ Source                       │ code                 │ status │ retryable │
//! ├──────────────────────────────┼──────────────────────┼────────┼───────────┤
//! │ CoreError::NoCapacity        │ NO_CAPACITY          │ 500    │ yes       │
//! │ CoreError::Conflict          │ CONFLICT             │ 500    │ yes       │
//! │ CoreError::IntegrityViolation│ INTEGRITY_VIOLATION  │ 500    │ no        │
//! │ CoreError::InvalidOrder...   │ INVALID_TRANSITION   │ 409    │ no        │
//! │ ValidationError              │ VALIDATION_FAILED    │ 400    │ no        │
//! │ DbError::NotFound            │ NOT_FOUND            │ 404    │ no        │
//! │ other DbError                │ DATABASE_ERROR       │ 500    │ pool only │
//! └──────────────────────────────┴──────────────────────┴────────┴───────────┘
//! ```
//!
//! Body: `{"code": "...", "message": "...", "retryable": bool}`, plus
//! `customerId` when the failure left a registered but unseated customer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oaxaca_core::{CoreError, ValidationError};
use oaxaca_db::DbError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NoCapacity,
    Conflict,
    NotFound,
    ValidationFailed,
    InvalidTransition,
    IntegrityViolation,
    DatabaseError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidTransition => StatusCode::CONFLICT,
            ErrorCode::NoCapacity
            | ErrorCode::Conflict
            | ErrorCode::IntegrityViolation
            | ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A failed request.
#[derive(Debug, Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub retryable: bool,
    /// Set when a customer record was created before the failure.
    pub customer_id: Option<i64>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            retryable: false,
            customer_id: None,
        }
    }

    pub fn with_customer_id(mut self, customer_id: i64) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    code: ErrorCode,
    message: &'a str,
    retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<i64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self.code {
            ErrorCode::DatabaseError => {
                error!(target: "database", error = %self.message, "Database error occurred");
                "Database error"
            }
            ErrorCode::IntegrityViolation => {
                error!(error = %self.message, "Integrity violation reached the API");
                "Table data is inconsistent"
            }
            ErrorCode::NoCapacity | ErrorCode::Conflict => {
                warn!(error = %self.message, "Recoverable allocation failure");
                self.message.as_str()
            }
            _ => self.message.as_str(),
        };

        let body = ErrorBody {
            code: self.code,
            message,
            retryable: self.retryable,
            customer_id: self.customer_id,
        };
        (self.code.status(), Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::NoCapacity { .. } => ApiError::new(ErrorCode::NoCapacity, message).retryable(),
            CoreError::Conflict { .. } => ApiError::new(ErrorCode::Conflict, message).retryable(),
            CoreError::IntegrityViolation { .. } => {
                ApiError::new(ErrorCode::IntegrityViolation, message)
            }
            CoreError::InvalidOrderTransition { .. } => {
                ApiError::new(ErrorCode::InvalidTransition, message)
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::new(ErrorCode::ValidationFailed, err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),
            DbError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            DbError::UniqueViolation { .. } => {
                ApiError::new(ErrorCode::Conflict, err.to_string()).retryable()
            }
            DbError::CheckViolation { .. } => {
                ApiError::new(ErrorCode::IntegrityViolation, err.to_string())
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, err.to_string()).retryable()
            }
            other => ApiError::new(ErrorCode::DatabaseError, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_allocation_failures() {
        let err: ApiError = DbError::Domain(CoreError::NoCapacity { total: 3 }).into();
        assert_eq!(err.code, ErrorCode::NoCapacity);
        assert_eq!(err.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.retryable);

        let err: ApiError = CoreError::Conflict {
            table_number: 2,
            reason: "raced".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert!(err.retryable);
    }

    #[test]
    fn test_client_errors() {
        let err: ApiError = DbError::not_found("Table", 9).into();
        assert_eq!(err.code.status(), StatusCode::NOT_FOUND);

        let err: ApiError = DbError::from(ValidationError::Required {
            field: "customer_name".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
        assert!(!err.retryable);
    }

    #[test]
    fn test_storage_errors_hide_detail() {
        let err: ApiError = DbError::QueryFailed("no such table: tables".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
