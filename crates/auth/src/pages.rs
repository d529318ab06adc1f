//! Built-in pages and their route table.

use std::collections::HashMap;

use serde::Serialize;

use safecampus_core::Role;

use crate::route::{RouteMeta, RouteRecord, RouteTable, RouteTableError};

/// A loaded page component, as handed to the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub component: String,
    pub title: String,
}

/// Resolves page components on demand.
///
/// The navigator calls this at most once per component, on the first visit
/// that the guard lets through.
pub trait PageLoader {
    fn load(&self, component: &str) -> Option<Page>;
}

impl<F> PageLoader for F
where
    F: Fn(&str) -> Option<Page>,
{
    fn load(&self, component: &str) -> Option<Page> {
        self(component)
    }
}

/// Loader for the components shipped with the application.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinPages;

const CATALOG: &[(&str, &str)] = &[
    ("HomePage", "Home"),
    ("LoginPage", "Sign in"),
    ("AIAssistantPage", "AI Assistant"),
    ("CheckInPage", "Check-in"),
    ("ClassDetailPage", "Class"),
    ("DangerBehaviorPage", "Dangerous Behaviors"),
    ("ProfilePage", "Profile"),
    ("SafetyOverviewPage", "Safety Overview"),
    ("TemporaryPickupPage", "Temporary Pickup"),
    ("ExpiryWarningPage", "Expiry Warnings"),
    ("ItemEntryPage", "Item Entry"),
];

impl PageLoader for BuiltinPages {
    fn load(&self, component: &str) -> Option<Page> {
        CATALOG
            .iter()
            .find(|(name, _)| *name == component)
            .map(|(name, title)| Page {
                component: (*name).to_string(),
                title: (*title).to_string(),
            })
    }
}

/// Memoizes a [`PageLoader`] so each component is loaded once.
#[derive(Debug, Default)]
pub struct PageCache<L> {
    loader: L,
    loaded: HashMap<String, Page>,
}

impl<L: PageLoader> PageCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            loaded: HashMap::new(),
        }
    }

    pub fn get(&mut self, component: &str) -> Option<&Page> {
        if !self.loaded.contains_key(component) {
            let page = self.loader.load(component)?;
            tracing::debug!(component, "page component loaded");
            self.loaded.insert(component.to_string(), page);
        }
        self.loaded.get(component)
    }

    pub fn is_loaded(&self, component: &str) -> bool {
        self.loaded.contains_key(component)
    }
}

fn teachers() -> [Role; 2] {
    [Role::TEACHER, Role::TEACHER_ZH]
}

/// The application's route table.
pub fn builtin_routes() -> Result<RouteTable, RouteTableError> {
    RouteTable::new(vec![
        RouteRecord::page("/", "home", "HomePage")?,
        RouteRecord::page("/login", "login", "LoginPage")?,
        RouteRecord::page("/ai-assistant", "aiAssistant", "AIAssistantPage")?
            .with_meta(RouteMeta::authenticated()),
        RouteRecord::page("/check-in", "checkIn", "CheckInPage")?
            .with_meta(RouteMeta::authenticated()),
        RouteRecord::page("/class/:id", "classDetail", "ClassDetailPage")?
            .with_meta(RouteMeta::authenticated()),
        RouteRecord::page("/danger-behaviors", "dangerBehaviors", "DangerBehaviorPage")?
            .with_meta(RouteMeta::authenticated()),
        RouteRecord::page("/profile", "profile", "ProfilePage")?
            .with_meta(RouteMeta::authenticated()),
        RouteRecord::page("/safety-overview", "safetyOverview", "SafetyOverviewPage")?
            .with_meta(RouteMeta::restricted(teachers().into_iter().chain([Role::INSPECTION_TEAM]))),
        RouteRecord::page("/temporary-pickup", "temporaryPickup", "TemporaryPickupPage")?
            .with_meta(RouteMeta::restricted(
                teachers().into_iter().chain([Role::PARENT, Role::PARENT_ZH]),
            )),
        RouteRecord::page("/expiry-warning", "expiryWarning", "ExpiryWarningPage")?
            .with_meta(RouteMeta::restricted(teachers().into_iter().chain([Role::INSPECTION_TEAM]))),
        RouteRecord::page("/item-entry", "itemEntry", "ItemEntryPage")?
            .with_meta(RouteMeta::restricted(teachers())),
        // Unknown paths fall back to the home page.
        RouteRecord::redirect("/:pathMatch(.*)*", "home")?,
    ])
}
