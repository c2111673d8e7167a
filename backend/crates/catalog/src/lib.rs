//! Catalog Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository ports
//! - `application/` - Use cases
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Categories and genres addressed by slug
//! - Titles with one category, several genres and a derived rating
//! - Reviews (one per author and title) and comments on reviews
//! - Filtering and page-number pagination on every collection
//!
//! Permission checks use the policies and the request `Caller` exported by
//! the `auth` crate.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::CatalogConfig;
pub use domain::repository::CatalogRepository;
pub use error::{CatalogError, CatalogResult};
pub use infra::postgres::PgCatalogRepository;
pub use presentation::router::{catalog_router, catalog_router_generic};

#[cfg(any(test, feature = "testing"))]
pub use infra::memory::InMemoryCatalogRepository;

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
