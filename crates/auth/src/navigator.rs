//! Router integration: resolve, guard, redirect, load.

use serde::Serialize;
use thiserror::Error;

use safecampus_core::Session;

use crate::guard::{AccessGuard, Decision, Location, NavigationGuard};
use crate::pages::{BuiltinPages, Page, PageCache, PageLoader};
use crate::route::{Params, RouteName, RouteRecord, RouteTable};

/// Upper bound on redirects followed by a single navigation.
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no route matches path '{0}'")]
    NoMatch(String),

    #[error("unknown route '{0}'")]
    UnknownRoute(RouteName),

    #[error("route '{route}' needs parameter '{param}'")]
    MissingParam { route: RouteName, param: String },

    #[error("too many redirects while navigating to '{0}'")]
    RedirectLoop(String),

    #[error("page component '{0}' could not be loaded")]
    UnknownComponent(String),
}

/// Why a navigation was diverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectCause {
    /// The route record itself redirects (e.g. the catch-all).
    Route,
    /// The navigation guard redirected.
    Guard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub from: String,
    pub to: RouteName,
    pub cause: RedirectCause,
}

/// A completed navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    /// Path that was requested.
    pub requested: String,
    /// Where the navigation ended up.
    pub location: Location,
    pub page: Page,
    pub redirects: Vec<Redirect>,
}

impl Navigation {
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// Resolves paths against a [`RouteTable`] and runs a guard before every
/// transition.
#[derive(Debug)]
pub struct Navigator<G = AccessGuard, L = BuiltinPages> {
    table: RouteTable,
    guard: G,
    pages: PageCache<L>,
    current: Option<Location>,
}

impl Navigator {
    /// Navigator with the access guard and the built-in page components.
    pub fn new(table: RouteTable) -> Self {
        Self::with_parts(table, AccessGuard, BuiltinPages)
    }
}

impl<G: NavigationGuard, L: PageLoader> Navigator<G, L> {
    pub fn with_parts(table: RouteTable, guard: G, loader: L) -> Self {
        Self {
            table,
            guard,
            pages: PageCache::new(loader),
            current: None,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Location of the last successful navigation.
    pub fn current(&self) -> Option<&Location> {
        self.current.as_ref()
    }

    /// Navigate to a concrete path.
    pub fn push(&mut self, path: &str, session: &Session) -> Result<Navigation, NavigationError> {
        let (record, params) = self
            .table
            .resolve(path)
            .ok_or_else(|| NavigationError::NoMatch(path.to_string()))?;
        let start = to_location(path, record, params);
        self.navigate(path.to_string(), start, session)
    }

    /// Navigate to a named route.
    pub fn push_named(
        &mut self,
        name: &RouteName,
        params: &Params,
        session: &Session,
    ) -> Result<Navigation, NavigationError> {
        let start = self.locate(name, params)?;
        self.navigate(start.path.clone(), start, session)
    }

    fn navigate(
        &mut self,
        requested: String,
        mut target: Location,
        session: &Session,
    ) -> Result<Navigation, NavigationError> {
        let mut redirects = Vec::new();

        loop {
            if redirects.len() > MAX_REDIRECTS {
                tracing::warn!(path = %requested, "redirect loop detected");
                return Err(NavigationError::RedirectLoop(requested));
            }

            let (to, cause) = match self.record_redirect(&target) {
                Some(to) => (to, RedirectCause::Route),
                None => match self.guard.before_each(&target, self.current.as_ref(), session) {
                    Decision::Proceed => break,
                    Decision::Redirect(to) => (to, RedirectCause::Guard),
                },
            };

            tracing::debug!(from = %target.path, to = %to, ?cause, "navigation redirected");
            let next = self.locate(&to, &Params::new())?;
            redirects.push(Redirect {
                from: std::mem::replace(&mut target, next).path,
                to,
                cause,
            });
        }

        let component = self
            .component_of(&target)
            .ok_or_else(|| NavigationError::UnknownComponent(target.path.clone()))?;
        let page = self
            .pages
            .get(&component)
            .cloned()
            .ok_or(NavigationError::UnknownComponent(component))?;

        tracing::info!(
            requested = %requested,
            path = %target.path,
            route = target.name.as_ref().map(RouteName::as_str).unwrap_or("<unnamed>"),
            redirects = redirects.len(),
            "navigated"
        );

        self.current = Some(target.clone());

        Ok(Navigation {
            requested,
            location: target,
            page,
            redirects,
        })
    }

    fn record_for(&self, location: &Location) -> Option<&RouteRecord> {
        match &location.name {
            Some(name) => self.table.by_name(name),
            None => self.table.resolve(&location.path).map(|(record, _)| record),
        }
    }

    fn record_redirect(&self, location: &Location) -> Option<RouteName> {
        self.record_for(location).and_then(|r| r.redirect.clone())
    }

    fn component_of(&self, location: &Location) -> Option<String> {
        self.record_for(location).and_then(|r| r.component.clone())
    }

    fn locate(&self, name: &RouteName, params: &Params) -> Result<Location, NavigationError> {
        let record = self
            .table
            .by_name(name)
            .ok_or_else(|| NavigationError::UnknownRoute(name.clone()))?;

        let path = record
            .path
            .build(params)
            .map_err(|param| NavigationError::MissingParam {
                route: name.clone(),
                param,
            })?;

        Ok(to_location(&path, record, params.clone()))
    }
}

fn to_location(path: &str, record: &RouteRecord, params: Params) -> Location {
    Location {
        path: path.to_string(),
        name: record.name.clone(),
        params,
        meta: record.meta.clone(),
    }
}
