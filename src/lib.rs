//! kimicc: run Claude Code against the Kimi K2 API.
//!
//! The binary in `main.rs` is a thin clap dispatcher; the actual behavior
//! lives here so integration tests can drive it directly:
//!
//! - [`config`]: the `~/.kimicc.json` profile store and credential resolution.
//! - [`shell`]: marker-delimited env-var injection into shell rc files.
//! - [`launcher`]: locating/installing the `claude` binary and spawning it.
//! - [`commands`]: subcommand handlers wiring the pieces together.

pub mod cli;
pub mod commands;
pub mod config;
pub mod launcher;
pub mod prompt;
pub mod shell;
