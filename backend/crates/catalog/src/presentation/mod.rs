//! Presentation Layer
//!
//! HTTP handlers, DTOs and routing.

pub mod dto;
pub mod handlers;
pub mod router;

// Re-exports
pub use handlers::CatalogAppState;
pub use router::{catalog_router, catalog_router_generic};
