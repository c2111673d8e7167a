//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod issue_token;
pub mod manage_users;
pub mod own_profile;
pub mod request_signup;

// Re-exports
pub use authenticate::AuthenticateUseCase;
pub use config::AuthConfig;
pub use issue_token::{IssueTokenUseCase, TokenInput, TokenOutput};
pub use manage_users::{CreateUserInput, ManageUsersUseCase, UpdateUserInput};
pub use own_profile::OwnProfileUseCase;
pub use request_signup::{RequestSignupUseCase, SignupInput, SignupOutput};
