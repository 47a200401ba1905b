//! # targz Symbolic Link Helpers
//!
//! File: cli/src/common/fs/links.rs
//!
//! ## Overview
//!
//! Symlinks found among the inputs of `targz pack` are archived as links,
//! not followed. This module reads a link's target in the form the tar
//! `linkname` field stores: a UTF-8 string with `/` separators, kept relative
//! or absolute exactly as the link itself stores it.
//!
use crate::core::error::{CliError, Result};
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Returns `true` if `path` itself is a symbolic link (without following it).
pub fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

/// Reads the target of the symlink at `path`.
///
/// # Errors
///
/// Fails if `path` is not a symlink or its target is not valid UTF-8.
pub fn read_link_target(path: &Path) -> Result<String> {
    let target = fs::read_link(path)
        .with_context(|| format!("Failed to read symlink target of {:?}", path))?;
    let target = target.to_str().ok_or_else(|| {
        CliError::FileSystem(format!(
            "Symlink target of {:?} is not valid UTF-8: {:?}",
            path, target
        ))
    })?;
    let target = if std::path::MAIN_SEPARATOR == '/' {
        target.to_string()
    } else {
        target.replace(std::path::MAIN_SEPARATOR, "/")
    };
    debug!("Symlink {:?} -> {}", path, target);
    Ok(target)
}
