//! Auth Middleware
//!
//! Resolves the `Authorization: Bearer` header into a [`Caller`] stored in
//! request extensions. Routes decide what a caller may do; this layer only
//! establishes who it is.

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::Request;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use platform::client::extract_bearer_token;
use std::convert::Infallible;
use std::sync::Arc;

use crate::application::AuthenticateUseCase;
use crate::domain::policy::Caller;
use crate::domain::repository::UserRepository;
use crate::domain::token::TokenSigner;
use crate::error::AuthError;

/// Middleware state
pub struct AuthMiddlewareState<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub signer: Arc<dyn TokenSigner>,
}

impl<R> Clone for AuthMiddlewareState<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            signer: self.signer.clone(),
        }
    }
}

/// Attach the request's [`Caller`]
///
/// No header means anonymous. A header that is present but malformed, or a
/// token that fails verification, is rejected with 401 on every route.
pub async fn authenticate<R>(
    State(state): State<AuthMiddlewareState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    R: UserRepository + Send + Sync + 'static,
{
    let token = match extract_bearer_token(req.headers()) {
        Ok(token) => token.map(str::to_owned),
        Err(e) => {
            tracing::debug!(error = %e, "Unusable Authorization header");
            return Err(AuthError::TokenInvalid);
        }
    };

    let caller = match token {
        None => Caller::Anonymous,
        Some(token) => {
            let use_case = AuthenticateUseCase::new(state.repo.clone(), state.signer.clone());
            Caller::Authenticated(use_case.execute(&token).await?)
        }
    };

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}

/// Handlers take `Caller` directly; routes outside the middleware see
/// an anonymous caller.
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Caller>().cloned().unwrap_or_default())
    }
}
