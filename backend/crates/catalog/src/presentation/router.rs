//! Catalog Router

use axum::{
    Router,
    routing::{delete, get},
};
use std::sync::Arc;

use crate::application::config::CatalogConfig;
use crate::domain::repository::CatalogRepository;
use crate::infra::postgres::PgCatalogRepository;
use crate::presentation::handlers::{self, CatalogAppState};

/// Create the Catalog router with PostgreSQL repository
pub fn catalog_router(repo: PgCatalogRepository, config: CatalogConfig) -> Router {
    catalog_router_generic(repo, config)
}

/// Create a generic Catalog router for any repository implementation
///
/// Handlers read the `Caller` placed by `auth::with_authentication`; without
/// that layer every request is anonymous.
pub fn catalog_router_generic<R>(repo: R, config: CatalogConfig) -> Router
where
    R: CatalogRepository,
{
    let state = CatalogAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    Router::new()
        .route(
            "/categories",
            get(handlers::list_categories::<R>).post(handlers::create_category::<R>),
        )
        .route("/categories/{slug}", delete(handlers::delete_category::<R>))
        .route(
            "/genres",
            get(handlers::list_genres::<R>).post(handlers::create_genre::<R>),
        )
        .route("/genres/{slug}", delete(handlers::delete_genre::<R>))
        .route(
            "/titles",
            get(handlers::list_titles::<R>).post(handlers::create_title::<R>),
        )
        .route(
            "/titles/{title_id}",
            get(handlers::get_title::<R>)
                .patch(handlers::update_title::<R>)
                .delete(handlers::delete_title::<R>),
        )
        .route(
            "/titles/{title_id}/reviews",
            get(handlers::list_reviews::<R>).post(handlers::create_review::<R>),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}",
            get(handlers::get_review::<R>)
                .patch(handlers::update_review::<R>)
                .delete(handlers::delete_review::<R>),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments",
            get(handlers::list_comments::<R>).post(handlers::create_comment::<R>),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
            get(handlers::get_comment::<R>)
                .patch(handlers::update_comment::<R>)
                .delete(handlers::delete_comment::<R>),
        )
        .with_state(state)
}
