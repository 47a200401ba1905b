//! # targz CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each other
//! `.rs` file in this directory is compiled as its own test crate and pulls
//! these in with `mod common;`.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use flate2::read::GzDecoder;
use std::io::Read;
use std::path::Path;

/// # Get targz Command (`targz_cmd`)
///
/// Creates an `assert_cmd::Command` for the compiled `targz` binary, running
/// in `dir` with the user configuration directory pointed at `dir` too, so
/// no configuration from the host leaks into the test.
///
/// A `.git` directory is created in `dir` to stop the project configuration
/// search there.
///
/// ## Panics
/// Panics if the `targz` binary cannot be found via `Command::cargo_bin`.
pub fn targz_cmd(dir: &Path) -> Command {
    std::fs::create_dir_all(dir.join(".git")).expect("Failed to create .git marker");
    let mut cmd = Command::cargo_bin("targz").expect("Failed to find targz binary for testing");
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("HOME", dir)
        .env_remove("RUST_LOG");
    cmd
}

/// One entry read back from an archive.
#[derive(Debug, PartialEq)]
pub enum Extracted {
    File { name: String, contents: Vec<u8> },
    Symlink { name: String, target: String },
}

/// # Read Archive (`read_archive`)
///
/// Decompresses `data` with `flate2` and lists it with the `tar` crate.
pub fn read_archive(data: &[u8]) -> Vec<Extracted> {
    let mut raw = Vec::new();
    GzDecoder::new(data)
        .read_to_end(&mut raw)
        .expect("archive should be valid gzip");
    let mut archive = tar::Archive::new(&raw[..]);
    let mut found = Vec::new();
    for entry in archive.entries().expect("archive should be valid tar") {
        let mut entry = entry.expect("entry should parse");
        let name = entry.path().unwrap().to_string_lossy().into_owned();
        match entry.header().entry_type() {
            tar::EntryType::Regular => {
                let mut contents = Vec::new();
                entry.read_to_end(&mut contents).unwrap();
                found.push(Extracted::File { name, contents });
            }
            tar::EntryType::Symlink => {
                let target = entry
                    .link_name()
                    .unwrap()
                    .expect("symlink target")
                    .to_string_lossy()
                    .into_owned();
                found.push(Extracted::Symlink { name, target });
            }
            other => panic!("unexpected entry type {:?}", other),
        }
    }
    found
}

/// Shorthand for an expected file entry.
pub fn file(name: &str, contents: &str) -> Extracted {
    Extracted::File {
        name: name.to_string(),
        contents: contents.as_bytes().to_vec(),
    }
}

/// Shorthand for an expected symlink entry.
pub fn symlink(name: &str, target: &str) -> Extracted {
    Extracted::Symlink {
        name: name.to_string(),
        target: target.to_string(),
    }
}
