//! Category / Genre display name
//!
//! 保存前に先頭のみ大文字・残りを小文字に揃える（"sci-FI" → "Sci-fi"）。
//! 一意性はこの正規化後の値で判定する。

use derive_more::Display;

/// Maximum length for a category or genre name
pub const TAXON_NAME_MAX_LENGTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxonNameError {
    #[error("This field may not be blank.")]
    Empty,

    #[error("Ensure this field has no more than {max} characters.")]
    TooLong { max: usize },
}

/// Capitalized, trimmed name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{_0}")]
pub struct TaxonName(String);

impl TaxonName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TaxonNameError> {
        let value = input.as_ref().trim();
        if value.is_empty() {
            return Err(TaxonNameError::Empty);
        }
        if value.chars().count() > TAXON_NAME_MAX_LENGTH {
            return Err(TaxonNameError::TooLong {
                max: TAXON_NAME_MAX_LENGTH,
            });
        }
        Ok(Self(capitalize(value)))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// First character upper case, the rest lower case
fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalizes() {
        assert_eq!(TaxonName::new("sci-FI").unwrap().as_str(), "Sci-fi");
        assert_eq!(TaxonName::new("  ROCK and Roll ").unwrap().as_str(), "Rock and roll");
        assert_eq!(TaxonName::new("фильм").unwrap().as_str(), "Фильм");
        assert_eq!(TaxonName::new("1984").unwrap().as_str(), "1984");
    }

    #[test]
    fn test_rejects_blank_and_long() {
        assert_eq!(TaxonName::new(" "), Err(TaxonNameError::Empty));
        assert!(TaxonName::new("a".repeat(256)).is_ok());
        assert_eq!(
            TaxonName::new("a".repeat(257)),
            Err(TaxonNameError::TooLong { max: 256 })
        );
    }
}
