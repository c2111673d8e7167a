//! Authority - the role predicates a caller carries
//!
//! `is_superuser` is a separate override bit: a superuser with role `user`
//! still counts as admin.

use super::user_role::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Authority {
    pub role: UserRole,
    pub is_superuser: bool,
}

impl Authority {
    pub const fn new(role: UserRole, is_superuser: bool) -> Self {
        Self { role, is_superuser }
    }

    /// `role == admin || is_superuser`
    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin) || self.is_superuser
    }

    #[inline]
    pub const fn is_moderator(&self) -> bool {
        matches!(self.role, UserRole::Moderator)
    }

    #[inline]
    pub const fn is_user(&self) -> bool {
        matches!(self.role, UserRole::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_predicates() {
        let user = Authority::new(UserRole::User, false);
        assert!(user.is_user() && !user.is_moderator() && !user.is_admin());

        let moderator = Authority::new(UserRole::Moderator, false);
        assert!(moderator.is_moderator() && !moderator.is_admin());

        let admin = Authority::new(UserRole::Admin, false);
        assert!(admin.is_admin() && !admin.is_moderator());
    }

    #[test]
    fn test_superuser_overrides_role() {
        let root = Authority::new(UserRole::User, true);
        assert!(root.is_admin());
        assert!(root.is_user());
        assert!(!root.is_moderator());
    }
}
