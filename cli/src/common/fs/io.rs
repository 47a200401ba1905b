//! # targz Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! Thin wrappers around `std::fs` that attach context to every failure:
//!
//! - **`ensure_dir_exists`**: `mkdir -p`, failing if the path is a file.
//! - **`read_file_to_string`**: reads manifests.
//! - **`read_file_bytes`**: reads file inputs of `targz pack`.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::fs::io;
//! use std::path::Path;
//!
//! # fn run_example() -> crate::core::error::Result<()> {
//! io::ensure_dir_exists(Path::new("./dist"))?;
//! let manifest = io::read_file_to_string(Path::new("entries.toml"))?;
//! let bytes = io::read_file_bytes(Path::new("README.md"))?;
//! # Ok(())
//! # }
//! ```
//!
use crate::core::error::{CliError, Result};
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Ensures that a directory exists at the specified path.
///
/// Missing directories are created together with their parents. If the path
/// exists but is not a directory, `CliError::FileSystem` is returned.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        info!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(CliError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Reads the entire content of a file into a string.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Reads the entire content of a file as raw bytes.
pub fn read_file_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read file {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Test `ensure_dir_exists` when the directory needs to be created, including parents.
    #[test]
    fn test_ensure_dir_exists_creates_new() -> Result<()> {
        let base_dir = tempdir()?;
        let new_dir = base_dir.path().join("new/subdir");
        assert!(!new_dir.exists());
        ensure_dir_exists(&new_dir)?;
        assert!(new_dir.is_dir());
        Ok(())
    }

    /// Test `ensure_dir_exists` when the directory already exists.
    #[test]
    fn test_ensure_dir_exists_already_exists() -> Result<()> {
        let base_dir = tempdir()?;
        let existing_dir = base_dir.path().join("existing");
        fs::create_dir(&existing_dir)?;
        ensure_dir_exists(&existing_dir)?;
        assert!(existing_dir.is_dir());
        Ok(())
    }

    /// Test `ensure_dir_exists` when the target path exists but is a file.
    #[test]
    fn test_ensure_dir_exists_path_is_file() -> Result<()> {
        let base_dir = tempdir()?;
        let file_path = base_dir.path().join("a_file.txt");
        fs::write(&file_path, "hello")?;
        let result = ensure_dir_exists(&file_path);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Path exists but is not a directory"));
        Ok(())
    }

    /// Test reading text and binary content back.
    #[test]
    fn test_read_file_helpers() -> Result<()> {
        let base_dir = tempdir()?;
        let text_path = base_dir.path().join("notes.txt");
        fs::write(&text_path, "Hello world")?;
        assert_eq!(read_file_to_string(&text_path)?, "Hello world");

        let bin_path = base_dir.path().join("blob.bin");
        fs::write(&bin_path, [0u8, 159, 146, 150])?;
        assert_eq!(read_file_bytes(&bin_path)?, vec![0u8, 159, 146, 150]);
        assert!(read_file_to_string(&bin_path).is_err());
        Ok(())
    }

    /// Test `read_file_to_string` when the target file does not exist.
    #[test]
    fn test_read_file_not_found() -> Result<()> {
        let base_dir = tempdir()?;
        let file_path = base_dir.path().join("nonexistent.txt");
        let err = read_file_to_string(&file_path).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
        Ok(())
    }
}
