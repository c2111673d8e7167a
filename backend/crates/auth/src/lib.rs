//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, permission policies, ports
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations, token signing
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Passwordless signup: a 6-digit confirmation code is mailed per request
//! - Code-for-token exchange; codes expire and are redeemable once
//! - HMAC-SHA256 signed bearer tokens, user reloaded on every request
//! - Roles (user, moderator, admin) plus a superuser override
//! - Named policies shared with other crates via [`Caller`] and [`Policy`]
//!
//! ## Security Model
//! - Confirmation codes compared in constant time and never logged
//! - Compare-and-clear redemption so a code cannot be used twice
//! - Deleted or demoted users lose access immediately

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::policy::{Caller, Owned, Policy, PolicyDenial, Principal};
pub use domain::token::TokenSigner;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgUserRepository;
pub use infra::token::HmacTokenSigner;
pub use presentation::router::{auth_router, auth_router_generic, with_authentication};

#[cfg(any(test, feature = "testing"))]
pub use infra::memory::InMemoryUserRepository;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
