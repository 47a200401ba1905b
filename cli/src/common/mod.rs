//! # targz Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared utilities used by the command handlers, kept apart from
//! command-specific logic (`commands::`) and core infrastructure (`core::`).
//!
//! - **`archive`**: input collection and the filesystem archive sink.
//! - **`fs`**: directory creation, file reads, symlink targets.
//!

/// Input collection and the `FileSink`.
pub mod archive;
/// Utilities for filesystem operations (I/O, links).
pub mod fs;
