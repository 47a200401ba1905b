//! # Archive Builder (`Tar`)
//!
//! File: lib/src/builder.rs
//!
//! ## Overview
//!
//! `Tar` owns the set of entries that will go into an archive, keyed by
//! name and kept in insertion order so the output is deterministic.
//!
//! - `add` / `upsert` replace an existing entry wholesale. A replaced entry
//!   keeps the position of the original insertion.
//! - `remove` deletes names if present and ignores the rest.
//! - `compress` serializes the entries to tar, deflates and gzip-frames the
//!   result and returns it as `TarGzData`.
//!
//! ## Examples
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use targz::{CompressOptions, Entry, Tar};
//!
//! let when = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
//! let mut tar = Tar::new();
//! tar.add([("test.txt", Entry::file("Hello world").modified(when))]);
//! tar.add([("hello.txt", Entry::symlink("test.txt"))]);
//! tar.remove(["world.txt"]);
//!
//! let data = tar.compress(&CompressOptions::new().timestamp(when)).unwrap();
//! let command = data.to_base64(Some("test"));
//! assert!(command.ends_with("| tee test.tar.gz > /dev/null"));
//! ```
//!
use crate::archive::entry::{Entry, EntrySpec};
use crate::archive::tar;
use crate::compression::gzip;
use crate::core::error::Result;
use crate::core::options::CompressOptions;
use crate::output::TarGzData;
use indexmap::IndexMap;
use tracing::debug;

/// An uncompressed, mutable set of archive entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tar {
    entries: IndexMap<String, Entry>,
}

impl Tar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder holding `entries`; later duplicates replace earlier ones.
    pub fn with_entries<I, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, Entry)>,
        N: Into<String>,
    {
        let mut tar = Tar::new();
        tar.add(entries);
        tar
    }

    /// Creates a builder from manifest-shaped specs, rejecting invalid shapes.
    pub fn from_specs<I, N>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, EntrySpec)>,
        N: Into<String>,
    {
        let mut tar = Tar::new();
        tar.add_specs(specs)?;
        Ok(tar)
    }

    /// Inserts or replaces a single entry.
    ///
    /// Returns the entry previously stored under `name`, if any.
    pub fn upsert(&mut self, name: impl Into<String>, entry: Entry) -> Option<Entry> {
        let name = name.into();
        let previous = self.entries.insert(name.clone(), entry);
        if previous.is_some() {
            debug!("Replaced archive entry '{}'", name);
        }
        previous
    }

    /// Merges `entries` into the set. Existing names are replaced wholesale.
    pub fn add<I, N>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (N, Entry)>,
        N: Into<String>,
    {
        for (name, entry) in entries {
            self.upsert(name, entry);
        }
    }

    /// Validates every spec, then merges them. Nothing is added if any spec
    /// is invalid.
    pub fn add_specs<I, N>(&mut self, specs: I) -> Result<()>
    where
        I: IntoIterator<Item = (N, EntrySpec)>,
        N: Into<String>,
    {
        let converted = specs
            .into_iter()
            .map(|(name, spec)| -> Result<(String, Entry)> {
                let name: String = name.into();
                let entry = spec.into_entry(&name)?;
                Ok((name, entry))
            })
            .collect::<Result<Vec<_>>>()?;
        self.add(converted);
        Ok(())
    }

    /// Removes the given names. Names that are not present are ignored.
    pub fn remove<I, N>(&mut self, names: I)
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        for name in names {
            if self.entries.shift_remove(name.as_ref()).is_some() {
                debug!("Removed archive entry '{}'", name.as_ref());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in archive order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in archive order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Serializes the entries to an uncompressed tar archive.
    ///
    /// `build_time` is used for entries without their own modification time.
    pub fn to_tar_bytes(&self, build_time: i64) -> Result<Vec<u8>> {
        tar::serialize(self.iter(), build_time)
    }

    /// Builds the gzip-compressed archive.
    pub fn compress(&self, options: &CompressOptions) -> Result<TarGzData> {
        let build_time = options.build_time();
        let raw = self.to_tar_bytes(build_time)?;
        let member = gzip::compress(&raw, options.level, build_time);
        debug!(
            "Compressed {} entries: {} tar bytes -> {} gzip bytes (level {})",
            self.len(),
            raw.len(),
            member.len(),
            options.level
        );
        Ok(TarGzData::new(member))
    }

    /// `compress` with default options: level 9, timestamp = now.
    pub fn gz(&self) -> Result<TarGzData> {
        self.compress(&CompressOptions::default())
    }
}

impl<N: Into<String>> FromIterator<(N, Entry)> for Tar {
    fn from_iter<I: IntoIterator<Item = (N, Entry)>>(iter: I) -> Self {
        Tar::with_entries(iter)
    }
}

impl<N: Into<String>> Extend<(N, Entry)> for Tar {
    fn extend<I: IntoIterator<Item = (N, Entry)>>(&mut self, iter: I) {
        self.add(iter);
    }
}
