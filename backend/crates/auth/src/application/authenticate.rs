//! Authenticate Use Case
//!
//! Verifies a bearer token and resolves the caller.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::policy::Principal;
use crate::domain::repository::UserRepository;
use crate::domain::token::TokenSigner;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Authenticate use case
pub struct AuthenticateUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    signer: Arc<dyn TokenSigner>,
}

impl<R> AuthenticateUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, signer: Arc<dyn TokenSigner>) -> Self {
        Self { repo, signer }
    }

    /// Resolve the principal behind `token`
    ///
    /// The user is reloaded on every call so role changes and deletions
    /// take effect before the token expires.
    pub async fn execute(&self, token: &str) -> AuthResult<Principal> {
        let claims = self.signer.verify(token, Utc::now().timestamp())?;

        let user = self
            .repo
            .find_by_id(&UserId::from_uuid(claims.sub))
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        Ok(Principal {
            user_id: user.user_id,
            authority: user.authority(),
            username: user.username,
        })
    }
}
