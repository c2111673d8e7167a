//! Confirmation Code Value Object
//!
//! A 6-digit numeric one-time code mailed to the user on every signup call.

use rand::Rng;
use std::fmt;

/// Number of digits in a code
pub const CONFIRMATION_CODE_DIGITS: usize = 6;

const CODE_SPACE: u32 = 1_000_000;

#[derive(Clone, PartialEq, Eq)]
pub struct ConfirmationCode(String);

impl ConfirmationCode {
    /// Draw a fresh code uniformly from `000000..=999999`
    pub fn generate() -> Self {
        let n = rand::rng().random_range(0..CODE_SPACE);
        Self(format!("{n:0width$}", width = CONFIRMATION_CODE_DIGITS))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time comparison against a submitted code
    pub fn matches(&self, submitted: &str) -> bool {
        platform::crypto::constant_time_eq(self.0.as_bytes(), submitted.trim().as_bytes())
    }
}

// Never print the code itself
impl fmt::Debug for ConfirmationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfirmationCode(******)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..100 {
            let code = ConfirmationCode::generate();
            assert_eq!(code.as_str().len(), CONFIRMATION_CODE_DIGITS);
            assert!(code.as_str().chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generated_codes_vary() {
        let codes: std::collections::HashSet<String> = (0..50)
            .map(|_| ConfirmationCode::generate().as_str().to_string())
            .collect();
        assert!(codes.len() > 1);
    }

    #[test]
    fn test_matches() {
        let code = ConfirmationCode::from_db("012345");
        assert!(code.matches("012345"));
        assert!(code.matches(" 012345 "));
        assert!(!code.matches("12345"));
        assert!(!code.matches("012346"));
        assert!(!code.matches(""));
    }

    #[test]
    fn test_debug_is_redacted() {
        let code = ConfirmationCode::from_db("987654");
        assert!(!format!("{code:?}").contains("987654"));
    }
}
