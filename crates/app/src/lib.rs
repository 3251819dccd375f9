//! Command-line front end: configuration, argument parsing and command runners.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Command};
pub use commands::run_command;
pub use config::AppConfig;
