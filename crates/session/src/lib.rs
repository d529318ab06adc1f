//! `safecampus-session`
//!
//! **Responsibility:** the signed-in user's session and its persistence.
//!
//! This crate provides:
//! - A synchronous key-value storage abstraction (in-memory and file-backed)
//! - The session store (`login`, `logout`, `update_user_info`) on top of it

pub mod storage;
pub mod store;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{LOGGED_IN_KEY, SessionStore, USER_KEY};
