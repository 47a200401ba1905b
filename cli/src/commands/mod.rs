//! # targz Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! Aggregates the subcommands of the targz CLI. Each command module defines
//! its own clap arguments struct and a `handle_*` function that `main.rs`
//! dispatches to.
//!
//! ## Commands
//!
//! - `pack`: build a `.tar.gz` from files, a manifest and inline entries
//!

/// Builds an archive and saves it, or prints it as base64 or a shell command.
pub mod pack;
