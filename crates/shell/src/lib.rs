//! `safecampus-shell`
//!
//! **Responsibility:** command-line front end for the session store and the
//! navigator. Each invocation restores the persisted session, runs one
//! command, and prints the result as JSON.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{CliError, Command, USAGE};
pub use commands::Shell;
pub use config::ShellConfig;
