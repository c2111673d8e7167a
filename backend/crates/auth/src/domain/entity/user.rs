//! User Entity
//!
//! A registered account: identity, role, optional profile text and the
//! single live confirmation code.

use chrono::{DateTime, Duration, Utc};

use crate::domain::policy::Owned;
use crate::domain::value_object::{
    authority::Authority, confirmation_code::ConfirmationCode, email::Email, user_id::UserId,
    user_name::UserName, user_role::UserRole,
};

/// Maximum length of `first_name` / `last_name`
pub const PERSON_NAME_MAX_LENGTH: usize = 150;

/// Maximum length of `bio`
pub const BIO_MAX_LENGTH: usize = 250;

/// Profile field validation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Ensure {field} has at most {max} characters")]
pub struct ProfileError {
    pub field: &'static str,
    pub max: usize,
}

/// Free-text profile fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
}

impl Profile {
    /// Trim and length-check one profile field
    pub fn validate_field(field: &'static str, value: String) -> Result<String, ProfileError> {
        let max = match field {
            "bio" => BIO_MAX_LENGTH,
            _ => PERSON_NAME_MAX_LENGTH,
        };
        let value = value.trim().to_string();
        if value.chars().count() > max {
            return Err(ProfileError { field, max });
        }
        Ok(value)
    }
}

/// Validated field changes for an existing user
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<UserName>,
    pub email: Option<Email>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<UserRole>,
}

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier (token subject)
    pub user_id: UserId,
    /// Unique handle
    pub username: UserName,
    /// Unique, lowercased
    pub email: Email,
    pub role: UserRole,
    /// Override bit: counts as admin whatever the role
    pub is_superuser: bool,
    pub profile: Profile,
    /// Current code; overwritten on every signup call, cleared on redemption
    pub confirmation_code: Option<ConfirmationCode>,
    pub confirmation_code_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the default role
    pub fn new(username: UserName, email: Email) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            username,
            email,
            role: UserRole::default(),
            is_superuser: false,
            profile: Profile::default(),
            confirmation_code: None,
            confirmation_code_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn authority(&self) -> Authority {
        Authority::new(self.role, self.is_superuser)
    }

    /// Replace the live confirmation code with a fresh one.
    /// `None` if `ttl` pushes the expiry past the representable range;
    /// the previous code is then left untouched.
    pub fn issue_confirmation_code(&mut self, ttl: Duration) -> Option<ConfirmationCode> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl)?;
        let code = ConfirmationCode::generate();
        self.confirmation_code = Some(code.clone());
        self.confirmation_code_expires_at = Some(expires_at);
        self.updated_at = now;
        Some(code)
    }

    /// Whether `submitted` equals the live, unexpired code
    pub fn accepts_confirmation_code(&self, submitted: &str, now: DateTime<Utc>) -> bool {
        let Some(code) = &self.confirmation_code else {
            return false;
        };
        let unexpired = self
            .confirmation_code_expires_at
            .is_none_or(|expires_at| now < expires_at);
        // Compare regardless of expiry so timing does not reveal it
        code.matches(submitted) && unexpired
    }

    pub fn clear_confirmation_code(&mut self) {
        self.confirmation_code = None;
        self.confirmation_code_expires_at = None;
    }

    /// Apply validated changes
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(username) = changes.username {
            self.username = username;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(first_name) = changes.first_name {
            self.profile.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            self.profile.last_name = last_name;
        }
        if let Some(bio) = changes.bio {
            self.profile.bio = bio;
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
        self.updated_at = Utc::now();
    }
}

impl Owned for User {
    fn owner_id(&self) -> &UserId {
        &self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User::new(
            UserName::new("alice").unwrap(),
            Email::new("alice@example.com").unwrap(),
        )
    }

    #[test]
    fn test_new_user_defaults() {
        let user = alice();
        assert_eq!(user.role, UserRole::User);
        assert!(!user.is_superuser);
        assert!(user.confirmation_code.is_none());
        assert!(!user.authority().is_admin());
    }

    #[test]
    fn test_issue_overwrites_previous_code() {
        let mut user = alice();
        let first = user.issue_confirmation_code(Duration::hours(1)).unwrap();
        let second = user.issue_confirmation_code(Duration::hours(1)).unwrap();
        assert_eq!(user.confirmation_code.as_ref(), Some(&second));

        let now = Utc::now();
        assert!(user.accepts_confirmation_code(second.as_str(), now));
        if first != second {
            assert!(!user.accepts_confirmation_code(first.as_str(), now));
        }
    }

    #[test]
    fn test_expired_code_is_rejected() {
        let mut user = alice();
        let code = user.issue_confirmation_code(Duration::minutes(5)).unwrap();
        let later = Utc::now() + Duration::minutes(6);
        assert!(!user.accepts_confirmation_code(code.as_str(), later));
    }

    #[test]
    fn test_unrepresentable_expiry_keeps_previous_code() {
        let mut user = alice();
        let code = user.issue_confirmation_code(Duration::hours(1)).unwrap();
        assert!(user.issue_confirmation_code(Duration::MAX).is_none());
        assert_eq!(user.confirmation_code.as_ref(), Some(&code));
        assert!(user.accepts_confirmation_code(code.as_str(), Utc::now()));
    }

    #[test]
    fn test_cleared_code_is_rejected() {
        let mut user = alice();
        let code = user.issue_confirmation_code(Duration::hours(1)).unwrap();
        user.clear_confirmation_code();
        assert!(!user.accepts_confirmation_code(code.as_str(), Utc::now()));
    }

    #[test]
    fn test_apply_changes() {
        let mut user = alice();
        user.apply(UserChanges {
            bio: Some("Reads a lot".into()),
            role: Some(UserRole::Moderator),
            ..Default::default()
        });
        assert_eq!(user.profile.bio, "Reads a lot");
        assert_eq!(user.role, UserRole::Moderator);
        assert_eq!(user.username.as_str(), "alice");
    }

    #[test]
    fn test_profile_field_limits() {
        assert!(Profile::validate_field("first_name", "a".repeat(150)).is_ok());
        assert_eq!(
            Profile::validate_field("last_name", "a".repeat(151)),
            Err(ProfileError { field: "last_name", max: 150 })
        );
        assert!(Profile::validate_field("bio", "a".repeat(250)).is_ok());
        assert!(Profile::validate_field("bio", "a".repeat(251)).is_err());
        assert_eq!(Profile::validate_field("bio", "  hi ".into()).unwrap(), "hi");
    }
}
