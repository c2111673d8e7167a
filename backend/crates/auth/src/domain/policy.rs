//! Permission policies
//!
//! Every endpoint declares one [`Policy`]. Handlers evaluate it in two steps:
//! 1. [`Policy::check`] before touching storage
//! 2. [`Policy::check_object`] after the target object is loaded
//!
//! A caller that fails step 1 never learns whether the object exists.

use http::Method;

use crate::domain::value_object::{authority::Authority, user_id::UserId, user_name::UserName};

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub username: UserName,
    pub authority: Authority,
}

/// Who is making the request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Caller {
    #[default]
    Anonymous,
    Authenticated(Principal),
}

impl Caller {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(principal) => Some(principal),
        }
    }

    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.principal().is_some()
    }

    /// The principal, or `Unauthenticated`
    pub fn require_principal(&self) -> Result<&Principal, PolicyDenial> {
        self.principal().ok_or(PolicyDenial::Unauthenticated)
    }

    fn authority(&self) -> Option<Authority> {
        self.principal().map(|p| p.authority)
    }

    fn is_owner_of<O: Owned + ?Sized>(&self, object: &O) -> bool {
        self.principal()
            .is_some_and(|p| &p.user_id == object.owner_id())
    }
}

/// Objects with an author
pub trait Owned {
    fn owner_id(&self) -> &UserId;
}

/// Why a request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolicyDenial {
    /// Anonymous caller on a protected action (401)
    #[error("Authentication credentials were not provided")]
    Unauthenticated,

    /// Authenticated caller without the required role (403)
    #[error("You do not have permission to perform this action")]
    Forbidden,
}

/// GET, HEAD and OPTIONS
#[inline]
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Named access policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Anyone may read; only admins may write
    AdminOrReadOnly,
    /// Admins only, reads included
    AdminOnly,
    /// Anyone may read; authenticated callers may create; author,
    /// moderators and admins may modify a given object
    OwnerAdminModeratorOrReadOnly,
    /// Any authenticated caller
    Authenticated,
}

impl Policy {
    /// Collection-level decision
    pub fn has_permission(&self, method: &Method, caller: &Caller) -> bool {
        let is_admin = caller.authority().is_some_and(|a| a.is_admin());
        match self {
            Policy::AdminOrReadOnly => is_safe_method(method) || is_admin,
            Policy::AdminOnly => is_admin,
            Policy::OwnerAdminModeratorOrReadOnly => {
                is_safe_method(method) || caller.is_authenticated()
            }
            Policy::Authenticated => caller.is_authenticated(),
        }
    }

    /// Object-level decision
    pub fn has_object_permission<O: Owned + ?Sized>(
        &self,
        method: &Method,
        caller: &Caller,
        object: &O,
    ) -> bool {
        match self {
            Policy::OwnerAdminModeratorOrReadOnly => {
                is_safe_method(method)
                    || caller
                        .authority()
                        .is_some_and(|a| a.is_admin() || a.is_moderator())
                    || caller.is_owner_of(object)
            }
            _ => self.has_permission(method, caller),
        }
    }

    /// [`Policy::has_permission`] as a `Result`
    pub fn check(&self, method: &Method, caller: &Caller) -> Result<(), PolicyDenial> {
        if self.has_permission(method, caller) {
            Ok(())
        } else {
            Err(Self::denial(caller))
        }
    }

    /// [`Policy::has_object_permission`] as a `Result`
    pub fn check_object<O: Owned + ?Sized>(
        &self,
        method: &Method,
        caller: &Caller,
        object: &O,
    ) -> Result<(), PolicyDenial> {
        if self.has_object_permission(method, caller, object) {
            Ok(())
        } else {
            Err(Self::denial(caller))
        }
    }

    fn denial(caller: &Caller) -> PolicyDenial {
        if caller.is_authenticated() {
            PolicyDenial::Forbidden
        } else {
            PolicyDenial::Unauthenticated
        }
    }
}
