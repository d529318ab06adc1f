use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier attached to a user.
///
/// Roles are open strings: user records may carry English or localized role
/// names, and unknown roles are kept verbatim. [`RoleKind`] maps the known
/// tokens onto the roles the application reasons about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const TEACHER: Role = Role(Cow::Borrowed("teacher"));
    pub const TEACHER_ZH: Role = Role(Cow::Borrowed("教师"));
    pub const PARENT: Role = Role(Cow::Borrowed("parent"));
    pub const PARENT_ZH: Role = Role(Cow::Borrowed("家长"));
    pub const INSPECTION_TEAM: Role = Role(Cow::Borrowed("验收小组"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The known role this token names, if any.
    pub fn kind(&self) -> Option<RoleKind> {
        RoleKind::from_token(self.as_str())
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Role {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

/// Roles the application knows about.
///
/// Teacher and parent accept both the English and the Chinese token so that
/// mixed-language user data resolves to the same role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Teacher,
    Parent,
    /// Acceptance/inspection team; the administrative role.
    InspectionTeam,
}

impl RoleKind {
    pub const ALL: [RoleKind; 3] = [RoleKind::Teacher, RoleKind::Parent, RoleKind::InspectionTeam];

    /// Every token that names this role.
    pub fn tokens(self) -> &'static [Role] {
        static TEACHER: [Role; 2] = [Role::TEACHER, Role::TEACHER_ZH];
        static PARENT: [Role; 2] = [Role::PARENT, Role::PARENT_ZH];
        static INSPECTION_TEAM: [Role; 1] = [Role::INSPECTION_TEAM];

        match self {
            RoleKind::Teacher => &TEACHER,
            RoleKind::Parent => &PARENT,
            RoleKind::InspectionTeam => &INSPECTION_TEAM,
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tokens().iter().any(|t| t.as_str() == token))
    }

    pub fn matches(self, role: &Role) -> bool {
        self.tokens().contains(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilingual_tokens_resolve_to_same_kind() {
        assert_eq!(Role::new("teacher").kind(), Some(RoleKind::Teacher));
        assert_eq!(Role::new("教师").kind(), Some(RoleKind::Teacher));
        assert_eq!(Role::new("parent").kind(), Some(RoleKind::Parent));
        assert_eq!(Role::new("家长").kind(), Some(RoleKind::Parent));
        assert_eq!(Role::new("验收小组").kind(), Some(RoleKind::InspectionTeam));
    }

    #[test]
    fn unknown_and_empty_roles_have_no_kind() {
        assert_eq!(Role::new("principal").kind(), None);
        assert_eq!(Role::default().kind(), None);
        // Matching is exact; no case folding.
        assert_eq!(Role::new("Teacher").kind(), None);
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Role::TEACHER_ZH).unwrap();
        assert_eq!(json, "\"教师\"");

        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::TEACHER_ZH);
    }
}
