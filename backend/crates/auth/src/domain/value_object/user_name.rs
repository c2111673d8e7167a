//! User Name Value Object
//!
//! ユーザー名は、ユーザーを識別するための**公開識別子（ハンドル）**。
//! サインアップ、トークン発行、レビュー・コメントの著者表示、
//! 管理 API の URL (`/users/{username}`) に使用される。
//!
//! ## 設計方針
//! - 文字種: Unicode の英数字と `_ . @ + -`
//! - 大文字小文字は保持する（一意性は入力どおりの値で判定）
//! - NFKC正規化 → trim → 検証 の順で処理
//! - 予約語は大文字小文字を無視して比較（`me` は常に予約、追加分は設定で渡す）
//!
//! ## 不変条件
//! - 長さ: 1〜150文字（正規化後）
//! - 空白を含まない

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 150;

/// Allowed special characters in user name
const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '@', '+', '-'];

/// Reserved words that can never be used as user names
///
/// `me` collides with the `/users/me` route.
const DEFAULT_RESERVED_WORDS: &[&str] = &["me"];

// ============================================================================
// Error Types
// ============================================================================

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    /// User name is empty after normalization
    Empty,

    /// User name is too long (maximum: USER_NAME_MAX_LENGTH)
    TooLong { length: usize, max: usize },

    /// User name contains invalid character
    InvalidCharacter { char: char, position: usize },

    /// User name is a reserved word
    Reserved { word: String },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "User name cannot be empty"),
            Self::TooLong { length, max } => {
                write!(f, "User name is too long ({length} chars, maximum {max})")
            }
            Self::InvalidCharacter { char, position } => {
                write!(
                    f,
                    "Invalid character '{char}' at position {position}. Only letters, digits and @/./+/-/_ are allowed"
                )
            }
            Self::Reserved { word } => {
                write!(f, "The username {word} is not allowed")
            }
        }
    }
}

impl std::error::Error for UserNameError {}

// ============================================================================
// UserName Value Object
// ============================================================================

/// Validated, normalized user name
///
/// # Invariants
/// - Non-empty after normalization
/// - At most USER_NAME_MAX_LENGTH characters
/// - Only alphanumeric and allowed special characters
/// - Not a reserved word (case-insensitive)
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Create a new UserName, checking only the built-in reserved words
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        Self::new_with_reserved::<&str>(input, &[])
    }

    /// Create a new UserName with an additional forbidden list
    ///
    /// The built-in reserved words are always checked as well.
    pub fn new_with_reserved<S: AsRef<str>>(
        input: impl AsRef<str>,
        forbidden: &[S],
    ) -> Result<Self, UserNameError> {
        let value = Self::normalize(input.as_ref());
        Self::validate(&value, forbidden)?;
        Ok(Self(value))
    }

    /// Get the user name
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Create from database value (assumes already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Normalize input string (NFKC, trim)
    fn normalize(input: &str) -> String {
        input.nfkc().collect::<String>().trim().to_string()
    }

    /// Validate the normalized user name
    fn validate<S: AsRef<str>>(value: &str, forbidden: &[S]) -> Result<(), UserNameError> {
        if value.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = value.chars().count();
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        for (pos, ch) in value.chars().enumerate() {
            if !Self::is_valid_char(ch) {
                return Err(UserNameError::InvalidCharacter {
                    char: ch,
                    position: pos,
                });
            }
        }

        if Self::is_reserved(value, forbidden) {
            return Err(UserNameError::Reserved {
                word: value.to_string(),
            });
        }

        Ok(())
    }

    /// Check if character is valid in a user name
    #[inline]
    fn is_valid_char(c: char) -> bool {
        c.is_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(&c)
    }

    /// Check a name against the built-in and the given forbidden words
    pub fn is_reserved<S: AsRef<str>>(name: &str, forbidden: &[S]) -> bool {
        let lowered = name.to_lowercase();
        DEFAULT_RESERVED_WORDS.iter().any(|&w| w == lowered)
            || forbidden
                .iter()
                .any(|w| w.as_ref().trim().to_lowercase() == lowered)
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserName").field(&self.0).finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_names() {
        for name in ["alice", "Alice_99", "a", "j.doe@site+tag-1", "ユーザー"] {
            assert!(UserName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_case_is_preserved() {
        let name = UserName::new("  BoB  ").unwrap();
        assert_eq!(name.as_str(), "BoB");
    }

    #[test]
    fn test_nfkc_normalization() {
        // Fullwidth letters fold to ASCII
        let name = UserName::new("ａｌｉｃｅ").unwrap();
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn test_empty() {
        assert_eq!(UserName::new(""), Err(UserNameError::Empty));
        assert_eq!(UserName::new("   "), Err(UserNameError::Empty));
    }

    #[test]
    fn test_too_long() {
        assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
        assert!(matches!(
            UserName::new("a".repeat(USER_NAME_MAX_LENGTH + 1)),
            Err(UserNameError::TooLong { length: 151, max: 150 })
        ));
    }

    #[test]
    fn test_invalid_characters() {
        assert!(matches!(
            UserName::new("bad name"),
            Err(UserNameError::InvalidCharacter { char: ' ', position: 3 })
        ));
        assert!(matches!(
            UserName::new("semi;colon"),
            Err(UserNameError::InvalidCharacter { char: ';', .. })
        ));
        assert!(UserName::new("slash/").is_err());
    }

    #[test]
    fn test_me_is_always_reserved() {
        assert!(matches!(UserName::new("me"), Err(UserNameError::Reserved { .. })));
        assert!(matches!(UserName::new("ME"), Err(UserNameError::Reserved { .. })));
        assert!(UserName::new("meme").is_ok());
    }

    #[test]
    fn test_configured_forbidden_words() {
        let forbidden = vec!["admin".to_string(), " Root ".to_string()];
        assert!(UserName::new_with_reserved("Admin", &forbidden).is_err());
        assert!(UserName::new_with_reserved("root", &forbidden).is_err());
        assert!(UserName::new_with_reserved("me", &forbidden).is_err());
        assert!(UserName::new_with_reserved("alice", &forbidden).is_ok());
    }

    #[test]
    fn test_serde_validates() {
        let name: UserName = serde_json::from_str(r#""alice""#).unwrap();
        assert_eq!(name.as_str(), "alice");
        assert!(serde_json::from_str::<UserName>(r#""me""#).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = UserName::new("me").unwrap_err();
        assert_eq!(err.to_string(), "The username me is not allowed");
    }
}
