//! `safecampus-core`: identity and session primitives.
//!
//! This crate contains **pure** data types (no storage, no routing).

pub mod error;
pub mod role;
pub mod session;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use role::{Role, RoleKind};
pub use session::Session;
pub use user::{User, UserUpdate};
