//! In-memory user repository for tests and local wiring

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use kernel::pagination::PageRequest;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    confirmation_code::ConfirmationCode, email::Email, user_id::UserId, user_name::UserName,
};
use crate::error::{AuthError, AuthResult};

/// `HashMap`-backed [`UserRepository`] enforcing the same uniqueness rules
/// as the `users` table
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user as-is, bypassing uniqueness checks
    pub fn seed(&self, user: User) -> AuthResult<()> {
        self.lock()?.insert(user.user_id, user);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|users| users.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> AuthResult<MutexGuard<'_, HashMap<UserId, User>>> {
        self.users
            .lock()
            .map_err(|_| AuthError::Internal("user store poisoned".into()))
    }

    fn check_unique(users: &HashMap<UserId, User>, candidate: &User) -> AuthResult<()> {
        for other in users.values().filter(|u| u.user_id != candidate.user_id) {
            if other.username == candidate.username {
                return Err(AuthError::UserNameTaken);
            }
            if other.email == candidate.email {
                return Err(AuthError::EmailTaken);
            }
        }
        Ok(())
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.lock()?;
        Self::check_unique(&users, user)?;
        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.lock()?.get(user_id).cloned())
    }

    async fn find_by_username(&self, username: &UserName) -> AuthResult<Option<User>> {
        Ok(self
            .lock()?
            .values()
            .find(|u| &u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self.lock()?.values().find(|u| &u.email == email).cloned())
    }

    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> AuthResult<(Vec<User>, u64)> {
        let needle = search.map(str::to_lowercase);
        let mut matching: Vec<User> = self
            .lock()?
            .values()
            .filter(|u| {
                needle
                    .as_deref()
                    .is_none_or(|n| u.username.as_str().to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.username.as_str().cmp(b.username.as_str()));

        let count = matching.len() as u64;
        Ok((page.slice(&matching), count))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut users = self.lock()?;
        Self::check_unique(&users, user)?;
        let Some(stored) = users.get_mut(&user.user_id) else {
            return Ok(());
        };
        // The confirmation code is owned by the store/consume pair
        let code = stored.confirmation_code.take();
        let expires_at = stored.confirmation_code_expires_at.take();
        *stored = user.clone();
        stored.confirmation_code = code;
        stored.confirmation_code_expires_at = expires_at;
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        Ok(self.lock()?.remove(user_id).is_some())
    }

    async fn store_confirmation_code(
        &self,
        user_id: &UserId,
        code: &ConfirmationCode,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<()> {
        if let Some(user) = self.lock()?.get_mut(user_id) {
            user.confirmation_code = Some(code.clone());
            user.confirmation_code_expires_at = Some(expires_at);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn consume_confirmation_code(
        &self,
        user_id: &UserId,
        code: &ConfirmationCode,
    ) -> AuthResult<bool> {
        let mut users = self.lock()?;
        match users.get_mut(user_id) {
            Some(user) if user.confirmation_code.as_ref() == Some(code) => {
                user.clear_confirmation_code();
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str) -> User {
        User::new(UserName::new(name).unwrap(), Email::new(email).unwrap())
    }

    #[tokio::test]
    async fn test_create_enforces_uniqueness() {
        let repo = InMemoryUserRepository::new();
        repo.create(&user("alice", "alice@example.com")).await.unwrap();

        let err = repo
            .create(&user("alice", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNameTaken));

        let err = repo
            .create(&user("bob", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_consume_is_single_use() {
        let repo = InMemoryUserRepository::new();
        let alice = user("alice", "alice@example.com");
        repo.create(&alice).await.unwrap();

        let code = ConfirmationCode::from_db("123456");
        repo.store_confirmation_code(&alice.user_id, &code, Utc::now())
            .await
            .unwrap();

        assert!(repo.consume_confirmation_code(&alice.user_id, &code).await.unwrap());
        assert!(!repo.consume_confirmation_code(&alice.user_id, &code).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let repo = InMemoryUserRepository::new();
        for (name, email) in [("carol", "c@x.io"), ("Alice", "a@x.io"), ("bob", "b@x.io")] {
            repo.create(&user(name, email)).await.unwrap();
        }

        let (all, count) = repo.list(None, PageRequest::new(1, 10)).await.unwrap();
        assert_eq!(count, 3);
        let names: Vec<_> = all.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["Alice", "bob", "carol"]);

        let (found, count) = repo.list(Some("AL"), PageRequest::new(1, 10)).await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(found[0].username.as_str(), "Alice");
    }
}
