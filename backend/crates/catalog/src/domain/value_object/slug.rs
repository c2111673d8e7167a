//! Slug Value Object
//!
//! カテゴリ・ジャンルの URL 用識別子。
//! `/categories/{slug}` やタイトル作成時の参照 (`"genre": ["drama"]`) に使用される。
//!
//! ## 不変条件
//! - 長さ: 1〜50文字
//! - 文字種: ASCII 英数字と `-` `_` のみ

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Maximum length for a slug (in characters)
pub const SLUG_MAX_LENGTH: usize = 50;

/// Error returned when slug validation fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("This field may not be blank.")]
    Empty,

    #[error("Ensure this field has no more than {max} characters.")]
    TooLong { max: usize },

    #[error(
        "Enter a valid slug consisting of letters, numbers, underscores or hyphens (found '{char}')."
    )]
    InvalidCharacter { char: char },
}

/// Validated slug
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display("{_0}")]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn new(input: impl AsRef<str>) -> Result<Self, SlugError> {
        let value = input.as_ref().trim();
        if value.is_empty() {
            return Err(SlugError::Empty);
        }
        if value.chars().count() > SLUG_MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: SLUG_MAX_LENGTH,
            });
        }
        if let Some(char) = value.chars().find(|c| !is_slug_char(*c)) {
            return Err(SlugError::InvalidCharacter { char });
        }
        Ok(Self(value.to_string()))
    }

    /// Create from database value (assumes already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lookups from query strings ignore case
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

#[inline]
fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        for s in ["drama", "sci-fi", "rock_n_roll", "90s", "A-b_C"] {
            assert_eq!(Slug::new(s).unwrap().as_str(), s);
        }
        assert_eq!(Slug::new("  films ").unwrap().as_str(), "films");
    }

    #[test]
    fn test_invalid_slugs() {
        assert_eq!(Slug::new("   "), Err(SlugError::Empty));
        assert_eq!(
            Slug::new("a".repeat(51)),
            Err(SlugError::TooLong { max: 50 })
        );
        assert!(Slug::new("a".repeat(50)).is_ok());
        assert_eq!(
            Slug::new("hello world"),
            Err(SlugError::InvalidCharacter { char: ' ' })
        );
        assert!(matches!(
            Slug::new("жанр"),
            Err(SlugError::InvalidCharacter { .. })
        ));
    }

    #[test]
    fn test_eq_ignore_case() {
        let slug = Slug::new("Drama").unwrap();
        assert!(slug.eq_ignore_case("drama"));
        assert!(!slug.eq_ignore_case("dram"));
        assert_eq!(slug.to_string(), "Drama");
    }
}
