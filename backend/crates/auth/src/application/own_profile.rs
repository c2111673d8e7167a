//! Own Profile Use Case
//!
//! `/users/me`: the caller reads and edits their own account.
//! The role cannot be changed here.

use std::sync::Arc;

use http::Method;

use crate::application::config::AuthConfig;
use crate::application::manage_users::{UpdateUserInput, ensure_available, validate_changes};
use crate::domain::entity::user::User;
use crate::domain::policy::{Caller, Policy};
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

const POLICY: Policy = Policy::Authenticated;

/// Own profile use case
pub struct OwnProfileUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> OwnProfileUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Collection-level check, run before the request body is decoded
    pub fn authorize(&self, method: &Method, caller: &Caller) -> AuthResult<()> {
        Ok(POLICY.check(method, caller)?)
    }

    /// GET /users/me
    pub async fn get(&self, caller: &Caller) -> AuthResult<User> {
        POLICY.check(&Method::GET, caller)?;
        self.load(caller).await
    }

    /// PATCH /users/me
    pub async fn update(&self, caller: &Caller, mut input: UpdateUserInput) -> AuthResult<User> {
        POLICY.check(&Method::PATCH, caller)?;
        let mut user = self.load(caller).await?;

        // Role is pinned to the stored value
        if input.role.take().is_some_and(|r| r != user.role) {
            tracing::debug!(user_id = %user.user_id, "Ignoring role change on own profile");
        }

        let changes = validate_changes(input, &self.config.forbidden_usernames)?;
        ensure_available(self.repo.as_ref(), &changes, Some(&user.user_id)).await?;
        user.apply(changes);
        self.repo.update(&user).await?;

        tracing::info!(user_id = %user.user_id, "Own profile updated");
        Ok(user)
    }

    async fn load(&self, caller: &Caller) -> AuthResult<User> {
        let principal = caller.require_principal()?;
        self.repo
            .find_by_id(&principal.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
