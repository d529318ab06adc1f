//! Session snapshot: who is signed in, if anyone.

use serde::Serialize;

use crate::{DomainError, DomainResult, Role, RoleKind, User, UserUpdate};

/// Authentication state of the application.
///
/// # Invariants
/// - `is_logged_in()` implies `user().is_some()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    is_logged_in: bool,
    user: Option<User>,
}

impl Session {
    /// Build a session, rejecting a logged-in flag without a user.
    pub fn new(is_logged_in: bool, user: Option<User>) -> DomainResult<Self> {
        if is_logged_in && user.is_none() {
            return Err(DomainError::invariant("logged-in session requires a user"));
        }
        Ok(Self { is_logged_in, user })
    }

    pub fn logged_out() -> Self {
        Self::default()
    }

    pub fn logged_in(user: User) -> Self {
        Self {
            is_logged_in: true,
            user: Some(user),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub(crate) fn user_mut(&mut self) -> Option<&mut User> {
        self.user.as_mut()
    }

    /// Current role; an empty role counts as none.
    pub fn user_role(&self) -> Option<&Role> {
        self.user.as_ref().map(|u| &u.role).filter(|r| !r.is_empty())
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(RoleKind::InspectionTeam)
    }

    pub fn is_teacher(&self) -> bool {
        self.has_role(RoleKind::Teacher)
    }

    pub fn is_parent(&self) -> bool {
        self.has_role(RoleKind::Parent)
    }

    pub fn has_role(&self, kind: RoleKind) -> bool {
        self.user_role().is_some_and(|role| kind.matches(role))
    }

    /// Apply a partial update to the current user.
    ///
    /// Returns `false` (and changes nothing) when no user is signed in.
    pub fn update_user(&mut self, update: UserUpdate) -> bool {
        match self.user_mut() {
            Some(user) => {
                user.merge(update);
                true
            }
            None => false,
        }
    }
}
