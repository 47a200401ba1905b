//! # targz Error Types
//!
//! File: lib/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the single error type returned by every fallible
//! operation in the library. The codec itself is a pure, synchronous
//! pipeline, so errors only come from input validation (entry shapes, names,
//! sizes, options) and from the sink a caller hands to `save_as`.
//!
//! ## Architecture
//!
//! - `TarGzError`: a `thiserror` enum, one variant per failure class.
//! - `Result<T>`: alias over `std::result::Result<T, TarGzError>`.
//!
//! Internal codec invariants (bit counts, tree completeness) are checked with
//! `debug_assert!` and are never surfaced as error values. No operation
//! returns a partial archive: a call either yields a complete buffer or fails.
//!
//! ## Examples
//!
//! ```rust
//! use targz::{CompressionLevel, TarGzError};
//!
//! let err = CompressionLevel::new(12).unwrap_err();
//! assert!(matches!(err, TarGzError::InvalidOption(_)));
//! ```
//!
use std::io;
use thiserror::Error;

/// Errors produced while building, compressing, or saving an archive.
#[derive(Error, Debug)]
pub enum TarGzError {
    #[error("Invalid entry '{name}': {reason}")]
    InvalidEntry { name: String, reason: String },

    #[error("Entry name '{name}' is {len} bytes; the tar name field holds at most {max}")]
    NameTooLong { name: String, len: usize, max: usize },

    #[error("Link target of '{name}' is {len} bytes; the tar linkname field holds at most {max}")]
    LinkTargetTooLong { name: String, len: usize, max: usize },

    #[error("Entry '{name}' is {size} bytes, which does not fit in a tar size field")]
    EntryTooLarge { name: String, size: u64 },

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Failed to save archive as '{name}': {source}")]
    Sink {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, TarGzError>;
