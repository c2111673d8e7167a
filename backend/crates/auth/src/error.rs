//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, field::FieldErrors, kind::ErrorKind};
use platform::mail::MailError;
use thiserror::Error;

use crate::domain::policy::PolicyDenial;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or invalid input fields
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// User name already registered (to a different email on signup)
    #[error("A user with that username already exists")]
    UserNameTaken,

    /// Email already registered (to a different user name on signup)
    #[error("A user with that email already exists")]
    EmailTaken,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Submitted confirmation code does not match the live one
    #[error("Confirmation code not correct")]
    InvalidConfirmationCode,

    /// Bearer token missing a valid signature, expired or for a deleted user
    #[error("Token is invalid or expired")]
    TokenInvalid,

    /// Policy refused the request
    #[error(transparent)]
    Denied(#[from] PolicyDenial),

    /// Confirmation mail could not be delivered
    #[error("Mail delivery failed: {0}")]
    MailDelivery(#[from] MailError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Single-field validation error
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        AuthError::Validation(FieldErrors::single(field, message))
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::UserNameTaken | AuthError::EmailTaken => {
                StatusCode::BAD_REQUEST
            }
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidConfirmationCode | AuthError::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Denied(PolicyDenial::Unauthenticated) => StatusCode::UNAUTHORIZED,
            AuthError::Denied(PolicyDenial::Forbidden) => StatusCode::FORBIDDEN,
            AuthError::MailDelivery(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) | AuthError::UserNameTaken | AuthError::EmailTaken => {
                ErrorKind::BadRequest
            }
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::InvalidConfirmationCode
            | AuthError::TokenInvalid
            | AuthError::Denied(PolicyDenial::Unauthenticated) => ErrorKind::Unauthorized,
            AuthError::Denied(PolicyDenial::Forbidden) => ErrorKind::Forbidden,
            AuthError::MailDelivery(_) => ErrorKind::ServiceUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side details (SQL, relay errors) are not exposed to clients.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Validation(errors) => errors
                .clone()
                .into_app_error(self.kind(), "Validation failed"),
            AuthError::UserNameTaken => AppError::new(self.kind(), self.to_string())
                .with_field_error("username", "A user with that username already exists."),
            AuthError::EmailTaken => AppError::new(self.kind(), self.to_string())
                .with_field_error("email", "A user with that email already exists."),
            AuthError::InvalidConfirmationCode => AppError::new(self.kind(), self.to_string())
                .with_field_error("confirmation_code", "Confirmation code not correct.")
                .with_action("Request a new code via signup"),
            AuthError::MailDelivery(_) => AppError::new(
                self.kind(),
                "Confirmation code could not be sent",
            )
            .with_action("Please try again later"),
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::MailDelivery(e) => {
                tracing::error!(error = %e, "Confirmation mail delivery failed");
            }
            AuthError::InvalidConfirmationCode => {
                tracing::warn!("Invalid confirmation code submitted");
            }
            AuthError::TokenInvalid => {
                tracing::warn!("Invalid bearer token presented");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<FieldErrors> for AuthError {
    fn from(errors: FieldErrors) -> Self {
        AuthError::Validation(errors)
    }
}

/// Unparseable bodies are validation failures (400), not 415/422
impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::invalid("non_field_errors", rejection.body_text())
    }
}

impl From<QueryRejection> for AuthError {
    fn from(rejection: QueryRejection) -> Self {
        AuthError::invalid("non_field_errors", rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_into_response_status_codes() {
        let test_cases: Vec<(AuthError, StatusCode)> = vec![
            (AuthError::invalid("username", "bad"), StatusCode::BAD_REQUEST),
            (AuthError::UserNameTaken, StatusCode::BAD_REQUEST),
            (AuthError::EmailTaken, StatusCode::BAD_REQUEST),
            (AuthError::UserNotFound, StatusCode::NOT_FOUND),
            (AuthError::InvalidConfirmationCode, StatusCode::UNAUTHORIZED),
            (AuthError::TokenInvalid, StatusCode::UNAUTHORIZED),
            (
                AuthError::Denied(PolicyDenial::Unauthenticated),
                StatusCode::UNAUTHORIZED,
            ),
            (AuthError::Denied(PolicyDenial::Forbidden), StatusCode::FORBIDDEN),
            (
                AuthError::MailDelivery(MailError::Rejected(502)),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AuthError::Internal("test".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            assert_eq!(error.status_code().as_u16(), error.kind().status_code());
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[test]
    fn test_invalid_code_names_field_without_leaking() {
        let app = AuthError::InvalidConfirmationCode.to_app_error();
        assert_eq!(app.status_code(), 401);
        assert_eq!(
            app.field_errors()["confirmation_code"],
            vec!["Confirmation code not correct."]
        );
    }

    #[test]
    fn test_conflicts_name_the_field() {
        assert!(AuthError::UserNameTaken
            .to_app_error()
            .field_errors()
            .contains_key("username"));
        assert!(AuthError::EmailTaken
            .to_app_error()
            .field_errors()
            .contains_key("email"));
    }

    #[test]
    fn test_internal_details_hidden() {
        let app = AuthError::Internal("pool poisoned at 0xdead".into()).to_app_error();
        assert!(!app.message().contains("0xdead"));
    }
}
