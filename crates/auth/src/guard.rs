//! Navigation guard: decides whether a route transition proceeds.

use serde::Serialize;

use safecampus_core::Session;

use crate::route::{AllowList, Params, RouteMeta, RouteName};

/// Where a navigation is heading (or coming from), as seen by a guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: String,
    pub name: Option<RouteName>,
    pub params: Params,
    pub meta: RouteMeta,
}

/// Outcome of a guard: continue, or go somewhere else instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "to", rename_all = "snake_case")]
pub enum Decision {
    Proceed,
    Redirect(RouteName),
}

impl Decision {
    pub fn to_login() -> Self {
        Self::Redirect(RouteName::LOGIN)
    }

    pub fn to_home() -> Self {
        Self::Redirect(RouteName::HOME)
    }

    pub fn is_proceed(&self) -> bool {
        matches!(self, Decision::Proceed)
    }
}

/// Hook run before every route transition.
///
/// `from` is `None` on the first navigation of a navigator.
pub trait NavigationGuard {
    fn before_each(&self, to: &Location, from: Option<&Location>, session: &Session) -> Decision;
}

impl<F> NavigationGuard for F
where
    F: Fn(&Location, Option<&Location>, &Session) -> Decision,
{
    fn before_each(&self, to: &Location, from: Option<&Location>, session: &Session) -> Decision {
        self(to, from, session)
    }
}

/// The application's access-control guard; see [`check_access`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGuard;

impl NavigationGuard for AccessGuard {
    fn before_each(&self, to: &Location, _from: Option<&Location>, session: &Session) -> Decision {
        check_access(to.name.as_ref(), &to.meta, session)
    }
}

/// Which access rule decided a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRule {
    /// Signed-in users are sent home instead of to the login page.
    AlreadyAuthenticated,
    /// The route requires a signed-in user.
    LoginRequired,
    /// The route has an allow-list but the user has no role.
    RoleMissing,
    /// The route's allow-list is not a list of roles.
    AllowListMalformed,
    /// The user's role is not on the route's allow-list.
    RoleNotAllowed,
    /// Nothing objected.
    Allowed,
}

impl AccessRule {
    pub fn decision(self) -> Decision {
        match self {
            AccessRule::AlreadyAuthenticated
            | AccessRule::RoleMissing
            | AccessRule::AllowListMalformed
            | AccessRule::RoleNotAllowed => Decision::to_home(),
            AccessRule::LoginRequired => Decision::to_login(),
            AccessRule::Allowed => Decision::Proceed,
        }
    }
}

/// Determine which access rule applies. Rules are checked in order:
///
/// 1. login route while signed in → home
/// 2. auth required while signed out → login
/// 3. restrictive allow-list and no matching role → home
/// 4. otherwise proceed
///
/// - No IO
/// - No panics
/// - No mutation
pub fn evaluate(name: Option<&RouteName>, meta: &RouteMeta, session: &Session) -> AccessRule {
    if name == Some(&RouteName::LOGIN) && session.is_logged_in() {
        return AccessRule::AlreadyAuthenticated;
    }

    if !meta.requires_auth {
        return AccessRule::Allowed;
    }

    if !session.is_logged_in() {
        return AccessRule::LoginRequired;
    }

    let Some(allow_list) = meta.roles.as_ref().filter(|list| list.is_restrictive()) else {
        return AccessRule::Allowed;
    };

    let Some(role) = session.user_role() else {
        return AccessRule::RoleMissing;
    };

    match allow_list {
        AllowList::Malformed(_) => AccessRule::AllowListMalformed,
        AllowList::Roles(roles) if roles.contains(role) => AccessRule::Allowed,
        AllowList::Roles(_) => AccessRule::RoleNotAllowed,
    }
}

/// Decide a navigation to the route `name` with metadata `meta`.
pub fn check_access(name: Option<&RouteName>, meta: &RouteMeta, session: &Session) -> Decision {
    let rule = evaluate(name, meta, session);
    let decision = rule.decision();

    tracing::debug!(
        route = name.map(RouteName::as_str).unwrap_or("<unnamed>"),
        ?rule,
        proceed = decision.is_proceed(),
        "navigation guard decision"
    );

    decision
}

// ─────────────────────────────────────────────────────────────────────────────
// Access Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of a navigation decision.
#[derive(Debug, Clone, Serialize)]
pub struct AccessExplanation {
    pub route: Option<RouteName>,
    pub granted: bool,
    pub rule: AccessRule,
    pub decision: Decision,
    pub reason: String,
    pub session: SessionState,
    pub requires_auth: bool,
    /// Roles allowed on the route; `None` when unrestricted or malformed.
    pub allowed_roles: Option<Vec<String>>,
}

/// The parts of the session the guard looked at.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub logged_in: bool,
    pub role: Option<String>,
}

/// Explain why a navigation was (or would be) allowed or redirected.
pub fn explain_access(
    name: Option<&RouteName>,
    meta: &RouteMeta,
    session: &Session,
) -> AccessExplanation {
    let rule = evaluate(name, meta, session);
    let role = session.user_role().map(|r| r.as_str().to_string());
    let route_label = name.map(RouteName::as_str).unwrap_or("<unnamed>");

    let allowed_roles = meta
        .roles
        .as_ref()
        .and_then(AllowList::roles)
        .filter(|roles| !roles.is_empty())
        .map(|roles| roles.iter().map(|r| r.as_str().to_string()).collect::<Vec<_>>());

    let reason = match rule {
        AccessRule::AlreadyAuthenticated => {
            "Already signed in; the login page redirects to home".to_string()
        }
        AccessRule::LoginRequired => format!("Route '{route_label}' requires a signed-in user"),
        AccessRule::RoleMissing => {
            format!("Route '{route_label}' is role-restricted and the user has no role")
        }
        AccessRule::AllowListMalformed => {
            format!("Route '{route_label}' has a malformed role allow-list; access denied")
        }
        AccessRule::RoleNotAllowed => format!(
            "Role '{}' is not allowed on route '{route_label}'. Allowed roles: {:?}",
            role.as_deref().unwrap_or_default(),
            allowed_roles.as_deref().unwrap_or_default()
        ),
        AccessRule::Allowed if meta.requires_auth => {
            format!("Signed-in user may open route '{route_label}'")
        }
        AccessRule::Allowed => format!("Route '{route_label}' is public"),
    };

    AccessExplanation {
        route: name.cloned(),
        granted: rule == AccessRule::Allowed,
        rule,
        decision: rule.decision(),
        reason,
        session: SessionState {
            logged_in: session.is_logged_in(),
            role,
        },
        requires_auth: meta.requires_auth,
        allowed_roles,
    }
}
