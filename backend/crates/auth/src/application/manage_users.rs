//! Manage Users Use Case
//!
//! Administrator CRUD over accounts. Every operation is `AdminOnly`.

use std::sync::Arc;

use http::Method;
use kernel::error::field::{FieldErrors, REQUIRED};
use kernel::pagination::{Page, PageRequest};

use crate::application::config::AuthConfig;
use crate::domain::entity::user::{Profile, User, UserChanges};
use crate::domain::policy::{Caller, Policy};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

const POLICY: Policy = Policy::AdminOnly;

/// Create user input
#[derive(Debug, Default)]
pub struct CreateUserInput {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<UserRole>,
}

/// Partial update input; `None` leaves a field unchanged
#[derive(Debug, Default)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<UserRole>,
}

/// Validate every supplied field, collecting all failures
pub(crate) fn validate_changes(
    input: UpdateUserInput,
    forbidden: &[String],
) -> AuthResult<UserChanges> {
    let mut errors = FieldErrors::new();

    let username = input.username.and_then(|raw| {
        errors.check("username", UserName::new_with_reserved(raw, forbidden))
    });
    let email = input
        .email
        .and_then(|raw| errors.check("email", Email::new(raw)));
    let first_name = input
        .first_name
        .and_then(|v| errors.check("first_name", Profile::validate_field("first_name", v)));
    let last_name = input
        .last_name
        .and_then(|v| errors.check("last_name", Profile::validate_field("last_name", v)));
    let bio = input
        .bio
        .and_then(|v| errors.check("bio", Profile::validate_field("bio", v)));

    errors.into_result()?;

    Ok(UserChanges {
        username,
        email,
        first_name,
        last_name,
        bio,
        role: input.role,
    })
}

/// Refuse identity values already held by another account
pub(crate) async fn ensure_available<R: UserRepository>(
    repo: &R,
    changes: &UserChanges,
    except: Option<&UserId>,
) -> AuthResult<()> {
    let is_other = |user: &User| except != Some(&user.user_id);

    if let Some(username) = &changes.username {
        if repo
            .find_by_username(username)
            .await?
            .is_some_and(|u| is_other(&u))
        {
            return Err(AuthError::UserNameTaken);
        }
    }
    if let Some(email) = &changes.email {
        if repo
            .find_by_email(email)
            .await?
            .is_some_and(|u| is_other(&u))
        {
            return Err(AuthError::EmailTaken);
        }
    }
    Ok(())
}

/// Manage users use case
pub struct ManageUsersUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> ManageUsersUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Collection-level check, run before the request body or path is decoded
    pub fn authorize(&self, method: &Method, caller: &Caller) -> AuthResult<()> {
        Ok(POLICY.check(method, caller)?)
    }

    /// GET /users
    pub async fn list(
        &self,
        caller: &Caller,
        search: Option<&str>,
        page: PageRequest,
    ) -> AuthResult<Page<User>> {
        POLICY.check(&Method::GET, caller)?;

        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let (users, count) = self.repo.list(search, page).await?;
        Ok(Page::new(users, count, page))
    }

    /// POST /users
    pub async fn create(&self, caller: &Caller, input: CreateUserInput) -> AuthResult<User> {
        POLICY.check(&Method::POST, caller)?;

        let mut required = FieldErrors::new();
        if input.username.trim().is_empty() {
            required.push("username", REQUIRED);
        }
        if input.email.trim().is_empty() {
            required.push("email", REQUIRED);
        }
        required.into_result()?;

        let changes = validate_changes(
            UpdateUserInput {
                username: Some(input.username),
                email: Some(input.email),
                first_name: input.first_name,
                last_name: input.last_name,
                bio: input.bio,
                role: input.role,
            },
            &self.config.forbidden_usernames,
        )?;
        ensure_available(self.repo.as_ref(), &changes, None).await?;

        let (Some(username), Some(email)) = (changes.username.clone(), changes.email.clone())
        else {
            return Err(AuthError::Internal("validated identity missing".into()));
        };
        let mut user = User::new(username, email);
        user.apply(changes);
        self.repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            username = %user.username,
            role = %user.role,
            "User created by administrator"
        );

        Ok(user)
    }

    /// GET /users/{username}
    pub async fn get(&self, caller: &Caller, username: &str) -> AuthResult<User> {
        POLICY.check(&Method::GET, caller)?;
        let user = self.load(username).await?;
        POLICY.check_object(&Method::GET, caller, &user)?;
        Ok(user)
    }

    /// PATCH /users/{username}
    pub async fn update(
        &self,
        caller: &Caller,
        username: &str,
        input: UpdateUserInput,
    ) -> AuthResult<User> {
        POLICY.check(&Method::PATCH, caller)?;
        let mut user = self.load(username).await?;
        POLICY.check_object(&Method::PATCH, caller, &user)?;

        let changes = validate_changes(input, &self.config.forbidden_usernames)?;
        ensure_available(self.repo.as_ref(), &changes, Some(&user.user_id)).await?;
        user.apply(changes);
        self.repo.update(&user).await?;

        tracing::info!(user_id = %user.user_id, role = %user.role, "User updated by administrator");
        Ok(user)
    }

    /// DELETE /users/{username}
    pub async fn delete(&self, caller: &Caller, username: &str) -> AuthResult<()> {
        POLICY.check(&Method::DELETE, caller)?;
        let user = self.load(username).await?;
        POLICY.check_object(&Method::DELETE, caller, &user)?;

        if !self.repo.delete(&user.user_id).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(user_id = %user.user_id, username = %user.username, "User deleted");
        Ok(())
    }

    async fn load(&self, username: &str) -> AuthResult<User> {
        self.repo
            .find_by_username(&UserName::from_db(username))
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
