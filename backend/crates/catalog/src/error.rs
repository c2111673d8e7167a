//! Catalog Error Types
//!
//! Catalog-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use auth::PolicyDenial;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, field::FieldErrors, kind::ErrorKind};
use thiserror::Error;

use crate::domain::entity::taxon::TaxonKind;

/// Catalog-specific result type alias
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog-specific error variants
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Malformed or invalid input fields
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Category or genre name already used (after capitalization)
    #[error("This {0} already exists")]
    TaxonNameTaken(TaxonKind),

    /// Category or genre slug already used
    #[error("A {0} with this slug already exists")]
    SlugTaken(TaxonKind),

    /// Same (name, year, category) as an existing title
    #[error("The fields name, year, category must make a unique set")]
    TitleExists,

    /// Author already reviewed this title
    #[error("Only one review per title is allowed for each author")]
    DuplicateReview,

    /// Resource missing, or not under the given parent
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Policy refused the request
    #[error(transparent)]
    Denied(#[from] PolicyDenial),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Single-field validation error
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        CatalogError::Validation(FieldErrors::single(field, message))
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::Validation(_)
            | CatalogError::TaxonNameTaken(_)
            | CatalogError::SlugTaken(_)
            | CatalogError::TitleExists
            | CatalogError::DuplicateReview => StatusCode::BAD_REQUEST,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Denied(PolicyDenial::Unauthenticated) => StatusCode::UNAUTHORIZED,
            CatalogError::Denied(PolicyDenial::Forbidden) => StatusCode::FORBIDDEN,
            CatalogError::Database(_) | CatalogError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Validation(_)
            | CatalogError::TaxonNameTaken(_)
            | CatalogError::SlugTaken(_)
            | CatalogError::TitleExists
            | CatalogError::DuplicateReview => ErrorKind::BadRequest,
            CatalogError::NotFound(_) => ErrorKind::NotFound,
            CatalogError::Denied(PolicyDenial::Unauthenticated) => ErrorKind::Unauthorized,
            CatalogError::Denied(PolicyDenial::Forbidden) => ErrorKind::Forbidden,
            CatalogError::Database(_) | CatalogError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let app = AppError::new(self.kind(), self.to_string());
        match self {
            CatalogError::Validation(errors) => errors
                .clone()
                .into_app_error(self.kind(), "Validation failed"),
            CatalogError::TaxonNameTaken(kind) => {
                app.with_field_error("name", format!("This {kind} already exists."))
            }
            CatalogError::SlugTaken(kind) => {
                app.with_field_error("slug", format!("{kind} with this slug already exists."))
            }
            CatalogError::TitleExists => app.with_field_error(
                "non_field_errors",
                "The fields name, year, category must make a unique set.",
            ),
            CatalogError::DuplicateReview => app.with_field_error(
                "non_field_errors",
                "Only one review for one work from one author.",
            ),
            CatalogError::Database(_) | CatalogError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
            _ => app,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            CatalogError::Database(e) => {
                tracing::error!(error = %e, "Catalog database error");
            }
            CatalogError::Internal(msg) => {
                tracing::error!(message = %msg, "Catalog internal error");
            }
            CatalogError::Denied(denial) => {
                tracing::debug!(denial = ?denial, "Catalog request denied");
            }
            _ => {
                tracing::debug!(error = %self, "Catalog error");
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<FieldErrors> for CatalogError {
    fn from(errors: FieldErrors) -> Self {
        CatalogError::Validation(errors)
    }
}

impl From<JsonRejection> for CatalogError {
    fn from(rejection: JsonRejection) -> Self {
        CatalogError::invalid("non_field_errors", rejection.body_text())
    }
}

impl From<QueryRejection> for CatalogError {
    fn from(rejection: QueryRejection) -> Self {
        CatalogError::invalid("non_field_errors", rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_into_response_status_codes() {
        let test_cases: Vec<(CatalogError, StatusCode)> = vec![
            (CatalogError::invalid("score", "bad"), StatusCode::BAD_REQUEST),
            (
                CatalogError::TaxonNameTaken(TaxonKind::Genre),
                StatusCode::BAD_REQUEST,
            ),
            (
                CatalogError::SlugTaken(TaxonKind::Category),
                StatusCode::BAD_REQUEST,
            ),
            (CatalogError::TitleExists, StatusCode::BAD_REQUEST),
            (CatalogError::DuplicateReview, StatusCode::BAD_REQUEST),
            (CatalogError::NotFound("Title"), StatusCode::NOT_FOUND),
            (
                CatalogError::Denied(PolicyDenial::Unauthenticated),
                StatusCode::UNAUTHORIZED,
            ),
            (
                CatalogError::Denied(PolicyDenial::Forbidden),
                StatusCode::FORBIDDEN,
            ),
            (
                CatalogError::Internal("test".into()),
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
    fn test_conflicts_name_the_field() {
        let app = CatalogError::TaxonNameTaken(TaxonKind::Genre).to_app_error();
        assert_eq!(app.field_errors()["name"], vec!["This genre already exists."]);

        let app = CatalogError::SlugTaken(TaxonKind::Category).to_app_error();
        assert!(app.field_errors().contains_key("slug"));
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            CatalogError::NotFound("Review").to_app_error().message(),
            "Review not found"
        );
    }
}
