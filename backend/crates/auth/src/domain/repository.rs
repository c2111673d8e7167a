//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::pagination::PageRequest;

use crate::domain::entity::user::User;
use crate::domain::value_object::{
    confirmation_code::ConfirmationCode, email::Email, user_id::UserId, user_name::UserName,
};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    ///
    /// Fails with `UserNameTaken` / `EmailTaken` on a uniqueness clash.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by exact user name
    async fn find_by_username(&self, username: &UserName) -> AuthResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Page through users ordered by user name, optionally filtered by a
    /// case-insensitive user name substring
    async fn list(&self, search: Option<&str>, page: PageRequest)
    -> AuthResult<(Vec<User>, u64)>;

    /// Update identity, role and profile fields
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Delete user; returns false when nothing was deleted
    async fn delete(&self, user_id: &UserId) -> AuthResult<bool>;

    /// Overwrite the live confirmation code
    async fn store_confirmation_code(
        &self,
        user_id: &UserId,
        code: &ConfirmationCode,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<()>;

    /// Clear the code only if it still equals `code` (compare-and-clear).
    /// Returns false when another request redeemed or rotated it first.
    async fn consume_confirmation_code(
        &self,
        user_id: &UserId,
        code: &ConfirmationCode,
    ) -> AuthResult<bool>;
}
