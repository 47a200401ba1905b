//! # Filesystem Archive Sink (`common::archive::sink`)
//!
//! File: cli/src/common/archive/sink.rs
//!
//! ## Overview
//!
//! `FileSink` is the CLI's `targz::ArchiveSink`: `TarGzData::save_as` hands
//! it the final name and bytes, and it writes them below a base directory.
//! Existing files are overwritten. Missing parent directories of the target
//! file are created.
//!
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use targz::ArchiveSink;
use tracing::{debug, info};

/// Writes archives into a directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    directory: PathBuf,
    saved: Vec<PathBuf>,
}

impl FileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        FileSink {
            directory: directory.into(),
            saved: Vec::new(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Paths written so far, in order.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl ArchiveSink for FileSink {
    fn save(&mut self, name: &str, mime_type: &str, data: &[u8]) -> io::Result<()> {
        let path = self.directory.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("Writing {} bytes of {} to {:?}", data.len(), mime_type, path);
        fs::write(&path, data)?;
        info!("Saved archive to {:?}", path);
        self.saved.push(path);
        Ok(())
    }
}
