//! `safecampus-auth`: route access control (pure, no IO).
//!
//! This crate is intentionally decoupled from storage and from any UI
//! framework: it sees a [`RouteTable`] and a [`safecampus_core::Session`]
//! snapshot, nothing else.

pub mod guard;
pub mod navigator;
pub mod pages;
pub mod route;

pub use guard::{
    AccessExplanation, AccessGuard, AccessRule, Decision, Location, NavigationGuard, check_access,
    evaluate, explain_access,
};
pub use navigator::{Navigation, NavigationError, Navigator, Redirect, RedirectCause};
pub use pages::{BuiltinPages, Page, PageLoader, builtin_routes};
pub use route::{AllowList, Params, PathPattern, RouteMeta, RouteName, RouteRecord, RouteTable, RouteTableError};
