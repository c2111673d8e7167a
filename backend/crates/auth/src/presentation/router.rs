//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use platform::mail::{AnyMailer, Mailer};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::domain::token::TokenSigner;
use crate::infra::postgres::PgUserRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthMiddlewareState, authenticate};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(
    repo: PgUserRepository,
    mailer: AnyMailer,
    signer: Arc<dyn TokenSigner>,
    config: AuthConfig,
) -> Router {
    auth_router_generic(repo, mailer, signer, config)
}

/// Create a generic Auth router for any repository and mailer implementation
pub fn auth_router_generic<R, M>(
    repo: R,
    mailer: M,
    signer: Arc<dyn TokenSigner>,
    config: AuthConfig,
) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        mailer: Arc::new(mailer),
        signer,
        config: Arc::new(config),
    };

    Router::new()
        .route("/auth/signup", post(handlers::signup::<R, M>))
        .route("/auth/token", post(handlers::token::<R, M>))
        .route(
            "/users",
            get(handlers::list_users::<R, M>).post(handlers::create_user::<R, M>),
        )
        .route(
            "/users/me",
            get(handlers::get_me::<R, M>).patch(handlers::update_me::<R, M>),
        )
        .route(
            "/users/{username}",
            get(handlers::get_user::<R, M>)
                .patch(handlers::update_user::<R, M>)
                .delete(handlers::delete_user::<R, M>),
        )
        .with_state(state)
}

/// Wrap `router` so every request carries a resolved `Caller`
pub fn with_authentication<R>(router: Router, repo: R, signer: Arc<dyn TokenSigner>) -> Router
where
    R: UserRepository + Send + Sync + 'static,
{
    let state = AuthMiddlewareState {
        repo: Arc::new(repo),
        signer,
    };

    router.layer(middleware::from_fn_with_state(state, authenticate::<R>))
}
