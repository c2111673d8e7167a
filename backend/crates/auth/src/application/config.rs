//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use crate::error::{AuthError, AuthResult};

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token secret key for HMAC signing (32 bytes)
    pub token_secret: [u8; 32],
    /// Access token lifetime (1 day)
    pub access_token_ttl: Duration,
    /// Confirmation code lifetime (1 hour)
    pub confirmation_code_ttl: Duration,
    /// User names refused at signup, on top of the built-in `me`
    pub forbidden_usernames: Vec<String>,
    /// Sender address for confirmation mail
    pub mail_from: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: [0u8; 32],
            access_token_ttl: Duration::from_secs(24 * 3600), // 1 day
            confirmation_code_ttl: Duration::from_secs(3600), // 1 hour
            forbidden_usernames: Vec::new(),
            mail_from: "noreply@yamdb.local".to_string(),
        }
    }
}

impl AuthConfig {
    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            token_secret: platform::crypto::random_key(),
            ..Default::default()
        }
    }

    /// Create config for development
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    /// Access token TTL in whole seconds
    pub fn access_token_ttl_secs(&self) -> AuthResult<i64> {
        i64::try_from(self.access_token_ttl.as_secs())
            .map_err(|_| AuthError::Internal("access token TTL out of range".to_string()))
    }

    /// Confirmation code TTL as a chrono duration
    pub fn confirmation_code_ttl(&self) -> AuthResult<chrono::Duration> {
        i64::try_from(self.confirmation_code_ttl.as_secs())
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| AuthError::Internal("confirmation code TTL out of range".to_string()))
    }
}
