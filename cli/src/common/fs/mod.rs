//! # targz Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! Filesystem helpers used while collecting inputs and saving archives.
//!
//! - **`io`**: directory creation and whole-file reads, with error context.
//! - **`links`**: symlink detection and link-target reading.
//!
//! Import from the specific submodule, e.g. `crate::common::fs::io::ensure_dir_exists`.
//!

/// Basic file I/O operations (e.g., `ensure_dir_exists`, `read_file_bytes`).
pub mod io;
/// Symbolic link helpers (e.g., `read_link_target`).
pub mod links;
