//! User profile and partial updates.

use serde::{Deserialize, Serialize};

use crate::{DomainError, DomainResult, Role};

/// Profile of the signed-in user, as persisted alongside the login flag.
///
/// Optional fields are omitted from the JSON form when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    pub fn new(username: impl Into<String>, role: impl Into<Role>) -> Self {
        Self {
            id: None,
            username: username.into(),
            role: role.into(),
            avatar: None,
        }
    }

    /// Build a user from login input.
    ///
    /// Missing `username` or `role` become empty strings rather than errors.
    pub fn from_update(update: UserUpdate) -> Self {
        Self {
            id: update.id,
            username: update.username.unwrap_or_default(),
            role: update.role.unwrap_or_default(),
            avatar: update.avatar,
        }
    }

    /// Shallow merge: every field set in `update` replaces the current value.
    pub fn merge(&mut self, update: UserUpdate) {
        if let Some(id) = update.id {
            self.id = Some(id);
        }
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(avatar) = update.avatar {
            self.avatar = Some(avatar);
        }
    }
}

/// A partial [`User`]; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn role(mut self, role: impl Into<Role>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.username.is_none() && self.role.is_none() && self.avatar.is_none()
    }

    /// Set a field by its persisted name (`id`, `username`, `role`, `avatar`).
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> DomainResult<()> {
        let value = value.into();
        match field {
            "id" => self.id = Some(value),
            "username" => self.username = Some(value),
            "role" => self.role = Some(Role::from(value)),
            "avatar" => self.avatar = Some(value),
            other => {
                return Err(DomainError::validation(format!("unknown user field '{other}'")));
            }
        }
        Ok(())
    }
}

impl From<User> for UserUpdate {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: Some(user.username),
            role: Some(user.role),
            avatar: user.avatar,
        }
    }
}
