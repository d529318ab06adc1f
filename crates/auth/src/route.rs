//! Declarative route table.
//!
//! Routes are plain data: a path pattern, an optional name, the page component
//! to show and the access metadata the navigation guard reads. Tables are
//! matched first-to-last, so a catch-all record must come last.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use safecampus_core::Role;

/// Captured path parameters (`/class/:id` → `{"id": "..."}`).
pub type Params = BTreeMap<String, String>;

/// Route name, used for redirects and named navigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteName(Cow<'static, str>);

impl RouteName {
    pub const HOME: RouteName = RouteName(Cow::Borrowed("home"));
    pub const LOGIN: RouteName = RouteName(Cow::Borrowed("login"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RouteName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for RouteName {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: &'static str },

    #[error("duplicate route name '{0}'")]
    DuplicateName(RouteName),

    #[error("catch-all route '{0}' must be the last entry")]
    CatchAllNotLast(String),

    #[error("route '{from}' redirects to unknown route '{to}'")]
    UnknownRedirect { from: String, to: RouteName },

    #[error("route table has no '{0}' route")]
    MissingRoute(RouteName),

    #[error("route '{0}' has neither a component nor a redirect")]
    EmptyRoute(String),

    #[error("failed to parse route table: {0}")]
    Json(#[from] serde_json::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// Path patterns
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    /// `:name(.*)*`: matches the remaining path, including nothing.
    CatchAll(String),
}

/// A route path such as `/`, `/class/:id` or `/:pathMatch(.*)*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, RouteTableError> {
        let invalid = |reason| RouteTableError::InvalidPattern {
            pattern: raw.to_string(),
            reason,
        };

        if !raw.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let parts: Vec<&str> = split_segments(raw).collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            let Some(param) = part.strip_prefix(':') else {
                segments.push(Segment::Static((*part).to_string()));
                continue;
            };

            if let Some(name) = param.strip_suffix("(.*)*") {
                if i + 1 != parts.len() {
                    return Err(invalid("catch-all must be the final segment"));
                }
                if name.is_empty() {
                    return Err(invalid("catch-all needs a name"));
                }
                segments.push(Segment::CatchAll(name.to_string()));
            } else if param.is_empty() || !param.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(invalid("parameter names must be alphanumeric"));
            } else {
                segments.push(Segment::Param(param.to_string()));
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::CatchAll(_)))
    }

    /// Match a concrete path (query string and fragment are ignored).
    ///
    /// Static segments match ASCII case-insensitively; captured parameters
    /// keep their original case.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let path = strip_query(path);
        let parts: Vec<&str> = split_segments(path).collect();
        let mut params = Params::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::CatchAll(name) => {
                    params.insert(name.clone(), parts.get(i..).unwrap_or_default().join("/"));
                    return Some(params);
                }
                Segment::Static(expected) => {
                    if !parts.get(i).is_some_and(|part| part.eq_ignore_ascii_case(expected)) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i)?;
                    params.insert(name.clone(), (*value).to_string());
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// Build a concrete path from parameters. Returns the first missing name on failure.
    pub fn build(&self, params: &Params) -> Result<String, String> {
        let mut path = String::new();
        for segment in &self.segments {
            let part = match segment {
                Segment::Static(s) => s.as_str(),
                Segment::Param(name) => params.get(name).ok_or_else(|| name.clone())?.as_str(),
                Segment::CatchAll(name) => match params.get(name) {
                    Some(rest) if !rest.is_empty() => rest.as_str(),
                    _ => continue,
                },
            };
            path.push('/');
            path.push_str(part);
        }

        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }
}

impl TryFrom<String> for PathPattern {
    type Error = RouteTableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PathPattern> for String {
    fn from(value: PathPattern) -> Self {
        value.raw
    }
}

impl core::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

// ─────────────────────────────────────────────────────────────────────────────
// Route metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Role allow-list attached to a route.
///
/// Anything other than a list of strings is kept as `Malformed`; the guard
/// denies access to such routes rather than guessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowList {
    Roles(Vec<Role>),
    Malformed(serde_json::Value),
}

impl AllowList {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self::Roles(roles.into_iter().collect())
    }

    /// Whether this list restricts access at all. Malformed lists always do.
    pub fn is_restrictive(&self) -> bool {
        match self {
            AllowList::Roles(roles) => !roles.is_empty(),
            AllowList::Malformed(_) => true,
        }
    }

    pub fn roles(&self) -> Option<&[Role]> {
        match self {
            AllowList::Roles(roles) => Some(roles),
            AllowList::Malformed(_) => None,
        }
    }
}

/// Access annotations read by the navigation guard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    #[serde(default)]
    pub requires_auth: bool,

    /// When present, the authoritative list of roles allowed on the route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<AllowList>,
}

impl RouteMeta {
    pub fn public() -> Self {
        Self::default()
    }

    pub fn authenticated() -> Self {
        Self {
            requires_auth: true,
            roles: None,
        }
    }

    pub fn restricted(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            requires_auth: true,
            roles: Some(AllowList::new(roles)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Records and table
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub path: PathPattern,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<RouteName>,

    /// Page component, resolved on first visit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    #[serde(default)]
    pub meta: RouteMeta,

    /// Unconditional redirect applied before the guard runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<RouteName>,
}

impl RouteRecord {
    /// A named page route, public until restricted with [`RouteRecord::with_meta`].
    pub fn page(
        path: &str,
        name: impl Into<RouteName>,
        component: impl Into<String>,
    ) -> Result<Self, RouteTableError> {
        Ok(Self {
            path: PathPattern::parse(path)?,
            name: Some(name.into()),
            component: Some(component.into()),
            meta: RouteMeta::public(),
            redirect: None,
        })
    }

    pub fn redirect(path: &str, to: impl Into<RouteName>) -> Result<Self, RouteTableError> {
        Ok(Self {
            path: PathPattern::parse(path)?,
            name: None,
            component: None,
            meta: RouteMeta::public(),
            redirect: Some(to.into()),
        })
    }

    pub fn with_meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }
}

/// Ordered, validated list of routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: Vec<RouteRecord>,
}

impl RouteTable {
    /// Validate and build a table.
    ///
    /// Requires unique names, a catch-all (if any) in last position, existing
    /// redirect targets, and both the `home` and `login` routes.
    pub fn new(routes: Vec<RouteRecord>) -> Result<Self, RouteTableError> {
        let mut names = HashSet::new();
        for route in &routes {
            if let Some(name) = &route.name {
                if !names.insert(name.clone()) {
                    return Err(RouteTableError::DuplicateName(name.clone()));
                }
            }
            if route.component.is_none() && route.redirect.is_none() {
                return Err(RouteTableError::EmptyRoute(route.path.to_string()));
            }
        }

        if let Some(pos) = routes.iter().position(|r| r.path.is_catch_all()) {
            if pos + 1 != routes.len() {
                return Err(RouteTableError::CatchAllNotLast(routes[pos].path.to_string()));
            }
        }

        for route in &routes {
            if let Some(to) = &route.redirect {
                if !names.contains(to) {
                    return Err(RouteTableError::UnknownRedirect {
                        from: route.path.to_string(),
                        to: to.clone(),
                    });
                }
            }
        }

        for required in [RouteName::HOME, RouteName::LOGIN] {
            if !names.contains(&required) {
                return Err(RouteTableError::MissingRoute(required));
            }
        }

        Ok(Self { routes })
    }

    /// Parse a JSON array of route records and validate it.
    pub fn from_json(json: &str) -> Result<Self, RouteTableError> {
        let routes: Vec<RouteRecord> = serde_json::from_str(json)?;
        Self::new(routes)
    }

    pub fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    /// First record whose pattern matches `path`.
    pub fn resolve(&self, path: &str) -> Option<(&RouteRecord, Params)> {
        self.routes
            .iter()
            .find_map(|record| record.path.matches(path).map(|params| (record, params)))
    }

    pub fn by_name(&self, name: &RouteName) -> Option<&RouteRecord> {
        self.routes.iter().find(|r| r.name.as_ref() == Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Vec<RouteRecord> {
        vec![
            RouteRecord::page("/", "home", "HomePage").unwrap(),
            RouteRecord::page("/login", "login", "LoginPage").unwrap(),
        ]
    }

    #[test]
    fn static_and_param_patterns_match() {
        let pattern = PathPattern::parse("/class/:id").unwrap();

        let params = pattern.matches("/class/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));

        assert!(pattern.matches("/class").is_none());
        assert!(pattern.matches("/class/42/extra").is_none());
        assert!(pattern.matches("/classes/42").is_none());
    }

    #[test]
    fn query_fragment_and_trailing_slash_are_ignored() {
        let pattern = PathPattern::parse("/profile").unwrap();
        assert!(pattern.matches("/profile/").is_some());
        assert!(pattern.matches("/profile?tab=1").is_some());
        assert!(pattern.matches("/profile#top").is_some());

        let root = PathPattern::parse("/").unwrap();
        assert!(root.matches("/").is_some());
        assert!(root.matches("").is_some());
        assert!(root.matches("/x").is_none());
    }

    #[test]
    fn static_segments_ignore_ascii_case() {
        let pattern = PathPattern::parse("/class/:id").unwrap();

        let params = pattern.matches("/Class/AbC").unwrap();
        assert_eq!(params["id"], "AbC");
        assert!(PathPattern::parse("/item-entry").unwrap().matches("/ITEM-ENTRY").is_some());
        assert!(PathPattern::parse("/item-entry").unwrap().matches("/item_entry").is_none());
    }

    #[test]
    fn catch_all_matches_everything() {
        let pattern = PathPattern::parse("/:pathMatch(.*)*").unwrap();
        assert!(pattern.is_catch_all());

        let params = pattern.matches("/no/such/page").unwrap();
        assert_eq!(params.get("pathMatch").map(String::as_str), Some("no/such/page"));
        assert!(pattern.matches("/").is_some());
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        assert!(PathPattern::parse("profile").is_err());
        assert!(PathPattern::parse("/:rest(.*)*/tail").is_err());
        assert!(PathPattern::parse("/class/:").is_err());
        assert!(PathPattern::parse("/class/:id-x").is_err());
    }

    #[test]
    fn build_fills_parameters() {
        let pattern = PathPattern::parse("/class/:id").unwrap();
        let mut params = Params::new();
        assert_eq!(pattern.build(&params), Err("id".to_string()));

        params.insert("id".to_string(), "7".to_string());
        assert_eq!(pattern.build(&params).unwrap(), "/class/7");

        assert_eq!(PathPattern::parse("/").unwrap().build(&Params::new()).unwrap(), "/");
    }

    #[test]
    fn table_rejects_duplicate_names() {
        let mut routes = minimal();
        routes.push(RouteRecord::page("/other", "home", "OtherPage").unwrap());

        let err = RouteTable::new(routes).unwrap_err();
        assert!(matches!(err, RouteTableError::DuplicateName(name) if name == RouteName::HOME));
    }

    #[test]
    fn table_requires_catch_all_last() {
        let mut routes = minimal();
        routes.insert(1, RouteRecord::redirect("/:pathMatch(.*)*", "home").unwrap());

        let err = RouteTable::new(routes).unwrap_err();
        assert!(matches!(err, RouteTableError::CatchAllNotLast(_)));
    }

    #[test]
    fn table_rejects_unknown_redirect_and_missing_login() {
        let mut routes = minimal();
        routes.push(RouteRecord::redirect("/old", "nowhere").unwrap());
        assert!(matches!(
            RouteTable::new(routes).unwrap_err(),
            RouteTableError::UnknownRedirect { .. }
        ));

        let routes = vec![RouteRecord::page("/", "home", "HomePage").unwrap()];
        assert!(matches!(
            RouteTable::new(routes).unwrap_err(),
            RouteTableError::MissingRoute(name) if name == RouteName::LOGIN
        ));
    }

    #[test]
    fn first_match_wins() {
        let mut routes = minimal();
        routes.push(RouteRecord::page("/class/new", "classNew", "ClassNewPage").unwrap());
        routes.push(RouteRecord::page("/class/:id", "classDetail", "ClassDetailPage").unwrap());
        let table = RouteTable::new(routes).unwrap();

        let (record, _) = table.resolve("/class/new").unwrap();
        assert_eq!(record.name, Some(RouteName::new("classNew")));

        let (record, params) = table.resolve("/class/3").unwrap();
        assert_eq!(record.name, Some(RouteName::new("classDetail")));
        assert_eq!(params["id"], "3");
    }

    #[test]
    fn json_tables_keep_malformed_allow_lists() {
        let json = r#"[
            {"path": "/", "name": "home", "component": "HomePage"},
            {"path": "/login", "name": "login", "component": "LoginPage", "meta": {"requiresAuth": false}},
            {"path": "/a", "name": "a", "component": "A", "meta": {"requiresAuth": true, "roles": ["teacher", "教师"]}},
            {"path": "/b", "name": "b", "component": "B", "meta": {"requiresAuth": true, "roles": "teacher"}},
            {"path": "/:pathMatch(.*)*", "redirect": "home"}
        ]"#;

        let table = RouteTable::from_json(json).unwrap();

        let a = table.by_name(&RouteName::new("a")).unwrap();
        assert_eq!(
            a.meta.roles,
            Some(AllowList::new([Role::TEACHER, Role::TEACHER_ZH]))
        );

        let b = table.by_name(&RouteName::new("b")).unwrap();
        assert!(matches!(b.meta.roles, Some(AllowList::Malformed(_))));
        assert!(b.meta.roles.as_ref().unwrap().is_restrictive());

        let (fallback, _) = table.resolve("/missing").unwrap();
        assert_eq!(fallback.redirect, Some(RouteName::HOME));
    }

    #[test]
    fn json_rejects_bad_patterns() {
        let json = r#"[{"path": "no-slash", "name": "home", "component": "HomePage"}]"#;
        assert!(matches!(RouteTable::from_json(json).unwrap_err(), RouteTableError::Json(_)));
    }
}
