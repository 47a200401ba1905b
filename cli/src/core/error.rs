//! # targz CLI Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! Error types for the command-line front end. Library failures arrive as
//! `targz::TarGzError`; everything the CLI itself can get wrong
//! (configuration, arguments, filesystem inputs) is a `CliError`.
//!
//! ## Architecture
//!
//! - `CliError`: a `thiserror` enum for CLI-specific failures. Library errors
//!   convert into it with `?` through the `Archive` variant.
//! - `Result<T>`: alias for `anyhow::Result<T>`, so handlers can attach
//!   context with `.with_context(...)` on the way up to `main`.
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if !path.exists() {
//!     return Err(CliError::FileSystem(format!("Input not found: {}", path.display())))?;
//! }
//!
//! // Add context to errors using anyhow
//! let manifest = fs::read_to_string(&path)
//!     .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
//! ```
//!
use thiserror::Error;

/// Custom error type for the targz CLI.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Argument parsing error: {0}")]
    ArgumentParsing(String),

    #[error("Manifest error in '{path}': {reason}")]
    Manifest { path: String, reason: String },

    #[error("Archive error: {source}")]
    Archive {
        #[from]
        source: targz::TarGzError,
    },
}

/// Type alias for Result using anyhow::Error so callers can add context.
pub type Result<T> = anyhow::Result<T>;
