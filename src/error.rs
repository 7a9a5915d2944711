//! Domain error taxonomy
//!
//! Every service returns [`DomainError`]. The gateway renders it through
//! `IntoResponse` as the unified `{code, msg}` envelope; internal details
//! are logged, never sent to the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::gateway::types::{ApiResponse, error_codes};
use crate::store::StoreError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// No or invalid credential on a protected action
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but not permitted
    #[error("{0}")]
    Forbidden(String),

    /// Id does not resolve, or resolves to the wrong sub-type
    #[error("{0}")]
    NotFound(String),

    /// Malformed or missing input, labeled with the offending field
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    Internal(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Message for an anonymous actor hitting a protected action
pub const CREDENTIALS_MISSING: &str = "Authentication credentials were not provided";

impl DomainError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn credentials_missing() -> Self {
        Self::Unauthenticated(CREDENTIALS_MISSING.to_string())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Envelope error code
    pub fn code(&self) -> i32 {
        match self {
            Self::Unauthenticated(msg) if msg == CREDENTIALS_MISSING => error_codes::MISSING_AUTH,
            Self::Unauthenticated(_) => error_codes::AUTH_FAILED,
            Self::Forbidden(_) => error_codes::FORBIDDEN,
            Self::NotFound(_) => error_codes::NOT_FOUND,
            Self::Validation { .. } => error_codes::INVALID_PARAMETER,
            Self::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert `validator` output into a field-labeled validation error.
    ///
    /// Reports the alphabetically first failing field so the message is
    /// stable across runs.
    pub fn from_validation(errors: &validator::ValidationErrors) -> Self {
        let mut fields: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                errs.first().map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    (field.to_string(), message)
                })
            })
            .collect();
        fields.sort();
        match fields.into_iter().next() {
            Some((field, message)) => Self::validation(field, message),
            None => Self::validation("body", "invalid input"),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::OutOfRange(_) => {
                tracing::warn!(error = %err, "value rejected by storage");
                Self::validation("body", "value is out of range")
            }
            err => {
                tracing::error!(error = %err, "store operation failed");
                Self::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let msg = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        (status, Json(ApiResponse::<()>::error(self.code(), msg))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
        rating: i32,
        #[validate(length(min = 1, message = "must not be empty"))]
        title: String,
    }

    #[test]
    fn test_http_status() {
        assert_eq!(
            DomainError::unauthenticated("x").http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(DomainError::forbidden("x").http_status(), StatusCode::FORBIDDEN);
        assert_eq!(DomainError::not_found("x").http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            DomainError::validation("f", "x").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::internal("x").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthenticated_codes() {
        assert_eq!(
            DomainError::credentials_missing().code(),
            error_codes::MISSING_AUTH
        );
        assert_eq!(
            DomainError::unauthenticated("Invalid credentials").code(),
            error_codes::AUTH_FAILED
        );
    }

    #[test]
    fn test_validation_message_is_field_labeled() {
        let err = DomainError::validation("creator_id", "must be an integer");
        assert_eq!(err.to_string(), "creator_id: must be an integer");
    }

    #[test]
    fn test_from_validator_picks_first_field() {
        let sample = Sample {
            rating: 9,
            title: String::new(),
        };
        let errors = sample.validate().unwrap_err();
        let err = DomainError::from_validation(&errors);
        assert_eq!(
            err,
            DomainError::validation("rating", "must be between 1 and 5")
        );
    }

    #[test]
    fn test_store_error_becomes_internal() {
        let err: DomainError = StoreError::Unavailable("pool closed".into()).into();
        assert!(matches!(err, DomainError::Internal(_)));
        assert_eq!(err.code(), error_codes::INTERNAL_ERROR);
    }

    #[test]
    fn test_storage_range_error_is_validation() {
        let err: DomainError = StoreError::OutOfRange("users_tb".into()).into();
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), error_codes::INVALID_PARAMETER);
    }
}
