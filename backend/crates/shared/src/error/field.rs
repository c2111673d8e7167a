//! Field Errors - Collected per-field validation failures
//!
//! 入力全体を検証してからまとめて返すためのコレクタ。
//! [`AppError`] に変換すると `errors` マップとして出力される。

use std::fmt;

use super::app_error::AppError;
use super::kind::ErrorKind;

/// Message used when a required field is missing or blank
pub const REQUIRED: &str = "This field is required.";

/// Ordered list of `(field, message)` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, String)>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-field shortcut
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push((field.into(), message.into()));
    }

    /// Record the error of `result` under `field` and return its value
    pub fn check<T, E: fmt::Display>(&mut self, field: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.push(field, e.to_string());
                None
            }
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any error was recorded for `field`
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|(f, _)| f == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Convert into an [`AppError`] carrying every field message
    pub fn into_app_error(self, kind: ErrorKind, message: impl Into<String>) -> AppError {
        self.0
            .into_iter()
            .fold(AppError::new(kind, message.into()), |err, (field, msg)| {
                err.with_field_error(field, msg)
            })
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_collects_errors() {
        let mut errors = FieldErrors::new();
        let ok: Option<u8> = errors.check("a", Ok::<u8, String>(1));
        let bad: Option<u8> = errors.check("b", Err::<u8, _>("broken"));
        assert_eq!(ok, Some(1));
        assert_eq!(bad, None);
        assert!(errors.contains("b"));
        assert!(!errors.contains("a"));
        assert_eq!(errors.to_string(), "b: broken");
    }

    #[test]
    fn test_into_result() {
        assert!(FieldErrors::new().into_result().is_ok());
        assert!(FieldErrors::single("x", REQUIRED).into_result().is_err());
    }

    #[test]
    fn test_into_app_error() {
        let mut errors = FieldErrors::single("username", REQUIRED);
        errors.push("email", "Enter a valid email address");
        let err = errors.into_app_error(ErrorKind::BadRequest, "Validation failed");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.field_errors()["username"], vec![REQUIRED]);
        assert_eq!(err.field_errors()["email"].len(), 1);
    }
}
