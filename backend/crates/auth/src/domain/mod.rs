//! Domain Layer
//!
//! Contains entities, value objects, permission policies and ports.

pub mod entity;
pub mod policy;
pub mod repository;
pub mod token;
pub mod value_object;

// Re-exports
pub use entity::user::User;
pub use policy::{Caller, Owned, Policy, PolicyDenial, Principal};
pub use repository::UserRepository;
pub use token::{AccessClaims, TokenSigner};
