//! # Filesystem Input Collection (`common::archive::collect`)
//!
//! File: cli/src/common/archive/collect.rs
//!
//! ## Overview
//!
//! Turns the paths given to `targz pack` into archive entries.
//!
//! - A regular file becomes a file entry carrying its bytes and its
//!   modification time.
//! - A symlink becomes a symlink entry with the link's own target; it is
//!   never followed.
//! - A directory is walked recursively (`walkdir`, sorted by file name) and
//!   contributes the files and symlinks below it. Directories themselves get
//!   no entry.
//!
//! ## Entry Names
//!
//! Names are the input paths as given, with `/` separators and without a
//! leading `/`, `./` or `../` prefix: `./src/lib.rs` is stored as
//! `src/lib.rs`, `/etc/hosts` as `etc/hosts`. A `..` after the first normal
//! component is rejected.
//!
use crate::common::fs::{io, links};
use crate::core::error::{CliError, Result};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::fs::Metadata;
use std::path::{Component, Path};
use targz::Entry;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

/// Collects entries for every input path, in the order given.
pub fn collect_inputs<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<(String, Entry)>> {
    let mut entries = Vec::new();
    for input in inputs {
        collect_input(input.as_ref(), &mut entries)?;
    }
    debug!("Collected {} entries from {} inputs", entries.len(), inputs.len());
    Ok(entries)
}

fn collect_input(input: &Path, entries: &mut Vec<(String, Entry)>) -> Result<()> {
    let metadata = input.symlink_metadata().map_err(|_| {
        CliError::FileSystem(format!("Input not found: {}", input.display()))
    })?;

    if !metadata.file_type().is_dir() {
        if let Some(entry) = entry_for_path(input, &metadata)? {
            entries.push((archive_name(input)?, entry));
        }
        return Ok(());
    }

    for dir_entry in WalkDir::new(input).follow_links(false).sort_by_file_name() {
        let dir_entry = dir_entry
            .with_context(|| format!("Failed to walk directory {}", input.display()))?;
        if dir_entry.file_type().is_dir() {
            continue;
        }
        let metadata = dir_entry
            .metadata()
            .with_context(|| format!("Failed to read metadata of {}", dir_entry.path().display()))?;
        if let Some(entry) = entry_for_path(dir_entry.path(), &metadata)? {
            entries.push((archive_name(dir_entry.path())?, entry));
        }
    }
    Ok(())
}

/// Builds the entry for a single non-directory path. Special files are skipped.
fn entry_for_path(path: &Path, metadata: &Metadata) -> Result<Option<Entry>> {
    let file_type = metadata.file_type();
    let entry = if file_type.is_symlink() {
        Entry::symlink(links::read_link_target(path)?)
    } else if file_type.is_file() {
        Entry::file(io::read_file_bytes(path)?)
    } else {
        warn!("Skipping {}: not a regular file or symlink", path.display());
        return Ok(None);
    };
    trace!("Adding {}", path.display());
    Ok(Some(match modified_time(metadata) {
        Some(modified) => entry.modified(modified),
        None => entry,
    }))
}

fn modified_time(metadata: &Metadata) -> Option<DateTime<Utc>> {
    metadata.modified().ok().map(DateTime::<Utc>::from)
}

/// Converts a filesystem path or user-given name into an archive entry name.
pub fn archive_name(path: &Path) -> Result<String> {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| {
                    CliError::FileSystem(format!("Path is not valid UTF-8: {:?}", path))
                })?;
                parts.push(part);
            }
            Component::ParentDir if parts.is_empty() => {}
            Component::ParentDir => {
                return Err(CliError::ArgumentParsing(format!(
                    "'..' is not allowed inside an entry name: {}",
                    path.display()
                ))
                .into());
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    Ok(parts.join("/"))
}
