//! # Archive Entries
//!
//! File: lib/src/archive/entry.rs
//!
//! ## Overview
//!
//! An `Entry` is one unit stored in the archive: either a regular file with
//! its bytes or a symbolic link with its target. The name is not part of the
//! entry; it is the key under which the builder stores it.
//!
//! `EntrySpec` is the loose, deserializable shape used by manifests:
//!
//! ```toml
//! ["test.txt"]
//! contents = "Hello world"
//! modified = "2020-01-01T00:00:00Z"
//!
//! ["hello.txt"]
//! target = "test.txt"
//! ```
//!
//! Converting a spec into an `Entry` is the one place where shape is
//! validated: a spec must carry exactly one of `contents` or `target`.
//! Specs with neither or both are rejected with `TarGzError::InvalidEntry`.
//!
use crate::core::error::{Result, TarGzError};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// What an entry stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    File { contents: Vec<u8> },
    Symlink { target: String },
}

/// A file or symlink together with its optional modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: EntryKind,
    pub modified: Option<DateTime<Utc>>,
}

impl Entry {
    /// A regular file. Without `modified`, the archive build time is used.
    pub fn file(contents: impl Into<Vec<u8>>) -> Self {
        Entry {
            kind: EntryKind::File {
                contents: contents.into(),
            },
            modified: None,
        }
    }

    /// A symbolic link pointing at `target`.
    pub fn symlink(target: impl Into<String>) -> Self {
        Entry {
            kind: EntryKind::Symlink {
                target: target.into(),
            },
            modified: None,
        }
    }

    pub fn modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Content bytes; empty for symlinks.
    pub fn contents(&self) -> &[u8] {
        match &self.kind {
            EntryKind::File { contents } => contents,
            EntryKind::Symlink { .. } => &[],
        }
    }

    pub fn link_target(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::File { .. } => None,
            EntryKind::Symlink { target } => Some(target),
        }
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self.kind, EntryKind::Symlink { .. })
    }
}

/// Manifest form of an entry: `{ contents, modified? }` or `{ target, modified? }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntrySpec {
    #[serde(default)]
    pub contents: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
}

impl EntrySpec {
    /// Validates the spec's shape and turns it into an `Entry`.
    ///
    /// `name` is only used for the error message.
    pub fn into_entry(self, name: &str) -> Result<Entry> {
        let kind = match (self.contents, self.target) {
            (Some(contents), None) => EntryKind::File {
                contents: contents.into_bytes(),
            },
            (None, Some(target)) => EntryKind::Symlink { target },
            (None, None) => {
                return Err(TarGzError::InvalidEntry {
                    name: name.to_string(),
                    reason: "neither contents nor target given".into(),
                })
            }
            (Some(_), Some(_)) => {
                return Err(TarGzError::InvalidEntry {
                    name: name.to_string(),
                    reason: "both contents and target given".into(),
                })
            }
        };
        Ok(Entry {
            kind,
            modified: self.modified,
        })
    }
}
