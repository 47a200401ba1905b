//! # targz Compression Options
//!
//! File: lib/src/core/options.rs
//!
//! ## Overview
//!
//! Options accepted by `Tar::compress`: the DEFLATE effort level and the
//! archive build timestamp. The level is a validated newtype: values above 9
//! are rejected when it is constructed and never clamped.
//!
//! Both types deserialize from TOML so the CLI can read them from its
//! configuration files.
//!
use crate::core::error::{Result, TarGzError};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// DEFLATE effort level in `0..=9`.
///
/// `0` stores the data without compression, `1` is the fastest setting and
/// `9` searches hardest for matches. Every level produces a stream that
/// inflates back to the exact input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "u8")]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// Store only, no compression.
    pub const NONE: CompressionLevel = CompressionLevel(0);
    /// Fastest compression.
    pub const FAST: CompressionLevel = CompressionLevel(1);
    /// Strongest compression; the builder's default.
    pub const BEST: CompressionLevel = CompressionLevel(9);

    /// Validates `level`, rejecting anything above 9 with `InvalidOption`.
    pub fn new(level: u8) -> Result<Self> {
        if level > 9 {
            return Err(TarGzError::InvalidOption(format!(
                "compression level {} is outside 0-9",
                level
            )));
        }
        Ok(CompressionLevel(level))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        CompressionLevel::BEST
    }
}

impl TryFrom<u8> for CompressionLevel {
    type Error = TarGzError;

    fn try_from(level: u8) -> Result<Self> {
        CompressionLevel::new(level)
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Options for `Tar::compress`.
///
/// `timestamp` is the archive build time: it becomes the gzip MTIME and the
/// tar mtime of every entry that has no modification time of its own. When
/// unset, the time of the `compress` call is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressOptions {
    pub level: CompressionLevel,
    pub timestamp: Option<DateTime<Utc>>,
}

impl CompressOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build time in whole seconds since the Unix epoch, resolving an unset
    /// timestamp to the current time.
    pub(crate) fn build_time(&self) -> i64 {
        self.timestamp.unwrap_or_else(Utc::now).timestamp()
    }
}
