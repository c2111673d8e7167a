//! Infrastructure Layer
//!
//! Database implementations and token signing.

#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod postgres;
pub mod token;

#[cfg(any(test, feature = "testing"))]
pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;
pub use token::HmacTokenSigner;
