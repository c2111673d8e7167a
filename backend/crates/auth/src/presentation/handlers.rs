//! HTTP Handlers

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use kernel::pagination::{Page, PageQuery};
use platform::mail::Mailer;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    CreateUserInput, IssueTokenUseCase, ManageUsersUseCase, OwnProfileUseCase,
    RequestSignupUseCase, SignupInput, TokenInput, UpdateUserInput,
};
use crate::domain::policy::Caller;
use crate::domain::repository::UserRepository;
use crate::domain::token::TokenSigner;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    CreateUserRequest, SignupRequest, SignupResponse, TokenRequest, TokenResponse,
    UpdateUserRequest, UserListQuery, UserResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<R, M>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub signer: Arc<dyn TokenSigner>,
    pub config: Arc<AuthConfig>,
}

impl<R, M> Clone for AuthAppState<R, M>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            signer: self.signer.clone(),
            config: self.config.clone(),
        }
    }
}

/// Parse an optional role name into a field error on failure
fn parse_role(raw: Option<String>) -> AuthResult<Option<UserRole>> {
    raw.map(|code| {
        UserRole::from_code(code.trim())
            .ok_or_else(|| AuthError::invalid("role", format!("\"{code}\" is not a valid choice.")))
    })
    .transpose()
}

// ============================================================================
// Signup / Token
// ============================================================================

/// POST /auth/signup
pub async fn signup<R, M>(
    State(state): State<AuthAppState<R, M>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AuthResult<Json<SignupResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let Json(req) = payload?;

    let use_case = RequestSignupUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(SignupInput {
            username: req.username,
            email: req.email,
        })
        .await?;

    Ok(Json(SignupResponse {
        username: output.username,
        email: output.email,
    }))
}

/// POST /auth/token
pub async fn token<R, M>(
    State(state): State<AuthAppState<R, M>>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> AuthResult<Json<TokenResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let Json(req) = payload?;

    let use_case = IssueTokenUseCase::new(
        state.repo.clone(),
        state.signer.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(TokenInput {
            username: req.username,
            confirmation_code: req.confirmation_code,
        })
        .await?;

    Ok(Json(TokenResponse {
        token: output.token,
    }))
}

// ============================================================================
// Own Profile
// ============================================================================

/// GET /users/me
pub async fn get_me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: Caller,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = OwnProfileUseCase::new(state.repo.clone(), state.config.clone());
    let user = use_case.get(&caller).await?;
    Ok(Json(user.into()))
}

/// PATCH /users/me
pub async fn update_me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: Caller,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = OwnProfileUseCase::new(state.repo.clone(), state.config.clone());
    use_case.authorize(&Method::PATCH, &caller)?;
    let Json(req) = payload?;

    let input = UpdateUserInput {
        username: req.username,
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
        bio: req.bio,
        // Accepted but ignored: the role stays server-side
        role: None,
    };

    let user = use_case.update(&caller, input).await?;
    Ok(Json(user.into()))
}

// ============================================================================
// User Administration
// ============================================================================

/// GET /users
pub async fn list_users<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: Caller,
    query: Result<Query<UserListQuery>, QueryRejection>,
) -> AuthResult<Json<Page<UserResponse>>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ManageUsersUseCase::new(state.repo.clone(), state.config.clone());
    use_case.authorize(&Method::GET, &caller)?;
    let Query(query) = query?;
    let page = PageQuery {
        page: query.page,
        page_size: query.page_size,
    }
    .resolve();

    let users = use_case
        .list(&caller, query.search.as_deref(), page)
        .await?;

    Ok(Json(users.map(UserResponse::from)))
}

/// POST /users
pub async fn create_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: Caller,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> AuthResult<(StatusCode, Json<UserResponse>)>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ManageUsersUseCase::new(state.repo.clone(), state.config.clone());
    use_case.authorize(&Method::POST, &caller)?;
    let Json(req) = payload?;

    let input = CreateUserInput {
        username: req.username,
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
        bio: req.bio,
        role: parse_role(req.role)?,
    };

    let user = use_case.create(&caller, input).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users/{username}
pub async fn get_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: Caller,
    Path(username): Path<String>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ManageUsersUseCase::new(state.repo.clone(), state.config.clone());
    let user = use_case.get(&caller, &username).await?;
    Ok(Json(user.into()))
}

/// PATCH /users/{username}
pub async fn update_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: Caller,
    Path(username): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ManageUsersUseCase::new(state.repo.clone(), state.config.clone());
    use_case.authorize(&Method::PATCH, &caller)?;
    let Json(req) = payload?;

    let input = UpdateUserInput {
        username: req.username,
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
        bio: req.bio,
        role: parse_role(req.role)?,
    };

    let user = use_case.update(&caller, &username, input).await?;
    Ok(Json(user.into()))
}

/// DELETE /users/{username}
pub async fn delete_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: Caller,
    Path(username): Path<String>,
) -> AuthResult<StatusCode>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ManageUsersUseCase::new(state.repo.clone(), state.config.clone());
    use_case.delete(&caller, &username).await?;
    Ok(StatusCode::NO_CONTENT)
}
