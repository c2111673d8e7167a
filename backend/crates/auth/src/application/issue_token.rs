//! Issue Token Use Case
//!
//! Exchanges (user name, confirmation code) for a bearer access token.
//! A code is redeemable once; a successful exchange clears it.

use std::sync::Arc;

use chrono::Utc;
use kernel::error::field::{FieldErrors, REQUIRED};

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::domain::token::{AccessClaims, TokenSigner};
use crate::domain::value_object::user_name::UserName;
use crate::error::{AuthError, AuthResult};

/// Token input
pub struct TokenInput {
    pub username: String,
    pub confirmation_code: String,
}

/// Token output
#[derive(Debug)]
pub struct TokenOutput {
    pub token: String,
    pub expires_at: i64,
}

/// Issue token use case
pub struct IssueTokenUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    signer: Arc<dyn TokenSigner>,
    config: Arc<AuthConfig>,
}

impl<R> IssueTokenUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, signer: Arc<dyn TokenSigner>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            signer,
            config,
        }
    }

    pub async fn execute(&self, input: TokenInput) -> AuthResult<TokenOutput> {
        let mut errors = FieldErrors::new();
        if input.username.trim().is_empty() {
            errors.push("username", REQUIRED);
        }
        if input.confirmation_code.trim().is_empty() {
            errors.push("confirmation_code", REQUIRED);
        }
        errors.into_result()?;

        // Lookup only: reserved-word rules apply at signup, not here
        let username = UserName::from_db(input.username.trim());
        let user = self
            .repo
            .find_by_username(&username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let now = Utc::now();
        let iat = now.timestamp();
        let exp = iat
            .checked_add(self.config.access_token_ttl_secs()?)
            .ok_or_else(|| AuthError::Internal("token expiry out of range".to_string()))?;

        if !user.accepts_confirmation_code(&input.confirmation_code, now) {
            return Err(AuthError::InvalidConfirmationCode);
        }

        // Compare-and-clear: loses to a concurrent redemption or a newer signup
        let Some(code) = user.confirmation_code.as_ref() else {
            return Err(AuthError::InvalidConfirmationCode);
        };
        if !self
            .repo
            .consume_confirmation_code(&user.user_id, code)
            .await?
        {
            return Err(AuthError::InvalidConfirmationCode);
        }

        let claims = AccessClaims {
            sub: user.user_id.into_uuid(),
            iat,
            exp,
        };
        let token = self.signer.sign(&claims)?;

        tracing::info!(user_id = %user.user_id, "Access token issued");

        Ok(TokenOutput {
            token,
            expires_at: claims.exp,
        })
    }
}
