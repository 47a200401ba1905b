//! # targz CLI Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces used by the command handlers:
//! - `config`: loading, merging, expanding and validating `.targz.toml`
//! - `error`: the `CliError` enum and the `anyhow`-based `Result` alias
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{CliError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
