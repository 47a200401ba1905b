//! # Compressed Archive Output (`TarGzData`)
//!
//! File: lib/src/output.rs
//!
//! ## Overview
//!
//! The result of `Tar::compress`: an owned `.tar.gz` buffer plus the ways
//! it leaves the process.
//!
//! - `to_bytes` / `into_bytes`: the raw buffer.
//! - `to_base64`: base64 text, or a shell command that recreates the archive
//!   on another machine:
//!   `echo '<base64>' | base64 --decode | tee <name>.tar.gz > /dev/null`
//! - `save_as`: hands the buffer to an `ArchiveSink`, which decides where it
//!   goes (a file, a browser download, a test double).
//!
//! Every file name that leaves this module ends in `.tar.gz`.
//!
use crate::core::error::{Result, TarGzError};
use base64::prelude::*;
use std::io;

/// MIME type handed to sinks.
pub const MIME_TYPE: &str = "application/tar+gzip";

/// Name used by `save_as` when none is given.
pub const DEFAULT_ARCHIVE_NAME: &str = "archive.tar.gz";

pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Destination for a finished archive.
pub trait ArchiveSink {
    /// Stores `data` under `name`. `name` always ends in `.tar.gz`.
    fn save(&mut self, name: &str, mime_type: &str, data: &[u8]) -> io::Result<()>;
}

impl<S: ArchiveSink + ?Sized> ArchiveSink for &mut S {
    fn save(&mut self, name: &str, mime_type: &str, data: &[u8]) -> io::Result<()> {
        (**self).save(name, mime_type, data)
    }
}

/// A gzip-compressed tar archive.
#[derive(Clone, PartialEq, Eq)]
pub struct TarGzData {
    data: Vec<u8>,
}

impl std::fmt::Debug for TarGzData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TarGzData")
            .field("len", &self.data.len())
            .finish()
    }
}

impl TarGzData {
    pub(crate) fn new(data: Vec<u8>) -> Self {
        TarGzData { data }
    }

    pub fn to_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Base64 of the archive, or with `path`, a shell command writing the
    /// decoded archive to `path` (with `.tar.gz` appended if missing).
    pub fn to_base64(&self, path: Option<&str>) -> String {
        let encoded = BASE64_STANDARD.encode(&self.data);
        match path {
            None => encoded,
            Some(path) => format!(
                "echo '{}' | base64 --decode | tee {} > /dev/null",
                encoded,
                safe_name(path)
            ),
        }
    }

    /// Saves the archive through `sink` as `name` (default `archive.tar.gz`).
    pub fn save_as<S: ArchiveSink>(&self, mut sink: S, name: Option<&str>) -> Result<String> {
        let name = safe_name(name.unwrap_or(DEFAULT_ARCHIVE_NAME));
        sink.save(&name, MIME_TYPE, &self.data)
            .map_err(|source| TarGzError::Sink {
                name: name.clone(),
                source,
            })?;
        Ok(name)
    }
}

impl AsRef<[u8]> for TarGzData {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Appends `.tar.gz` to `name` unless it already ends with it.
pub fn safe_name(name: &str) -> String {
    if name.ends_with(ARCHIVE_SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, ARCHIVE_SUFFIX)
    }
}
