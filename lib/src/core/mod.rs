//! # targz Core Infrastructure
//!
//! File: lib/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces shared by the codec and the builder:
//! - `error`: the `TarGzError` enum and the `Result` alias
//! - `options`: `CompressionLevel` and `CompressOptions`
//!
pub mod error;
pub mod options;
