//! # targz Pack Command
//!
//! File: cli/src/commands/pack.rs
//!
//! ## Overview
//!
//! `targz pack` builds one gzip-compressed tar archive from any mix of:
//! - files, directories and symlinks on disk (positional `INPUTS`)
//! - a TOML manifest of entries (`--manifest`)
//! - inline text files (`--text NAME=CONTENTS`)
//! - symlinks (`--link NAME=TARGET`)
//!
//! and then writes it out as a `.tar.gz` file, as base64 text, or as a shell
//! command that recreates the file on another machine.
//!
//! ## Architecture
//!
//! Sources are applied in a fixed order, each one replacing earlier entries
//! of the same name: inputs, manifest, `--text`, `--link`. `--remove` runs
//! last. Flags override `.targz.toml`, which overrides built-in defaults.
//!
//! ## Examples
//!
//! ```bash
//! # Archive a directory into ./site.tar.gz
//! targz pack ./site -o site
//!
//! # Print a command that recreates a two-entry archive as deploy.tar.gz
//! targz pack --text test.txt='Hello world' --link hello.txt=test.txt --shell deploy
//!
//! # Reproducible output
//! targz pack ./site --timestamp 2020-01-01T00:00:00Z --base64
//! ```
//!
//! Manifest format:
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
use crate::common::archive::{collect, sink::FileSink};
use crate::common::fs::io;
use crate::core::config::{self, Config};
use crate::core::error::{CliError, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use indexmap::IndexMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use targz::{CompressOptions, CompressionLevel, Entry, EntrySpec, Tar, TarGzData};
use tracing::{debug, info, warn};

/// Arguments for `targz pack`.
#[derive(Parser, Debug)]
pub struct PackArgs {
    /// Files, directories and symlinks to add. Directories are added recursively.
    #[arg(value_name = "INPUTS")]
    pub inputs: Vec<PathBuf>,

    /// TOML manifest of entries (`contents` or `target`, optional `modified`).
    #[arg(long, short, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Add a text file. May be repeated.
    #[arg(long = "text", value_name = "NAME=CONTENTS", value_parser = parse_assignment)]
    pub texts: Vec<(String, String)>,

    /// Add a symbolic link. May be repeated.
    #[arg(long = "link", value_name = "NAME=TARGET", value_parser = parse_assignment)]
    pub links: Vec<(String, String)>,

    /// Remove an entry by name after everything else is added. Absent names are ignored.
    #[arg(long = "remove", value_name = "NAME")]
    pub removals: Vec<String>,

    /// Compression level, 0 (store) to 9 (best). Defaults to the configured level.
    #[arg(long, short, value_name = "LEVEL", value_parser = parse_level)]
    pub level: Option<CompressionLevel>,

    /// Build time (RFC 3339) for the gzip header and entries without their own time.
    #[arg(long, value_name = "RFC3339", value_parser = parse_timestamp)]
    pub timestamp: Option<DateTime<Utc>>,

    /// Output file name; `.tar.gz` is appended if missing.
    #[arg(long, short, value_name = "NAME")]
    pub output: Option<String>,

    /// Directory the archive is saved into.
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Print the archive as base64 on stdout.
    #[arg(long, conflicts_with = "shell")]
    pub base64: bool,

    /// Print a shell command that writes the archive to PATH.tar.gz.
    #[arg(long, value_name = "PATH")]
    pub shell: Option<String>,
}

/// # Handle Pack Command (`handle_pack`)
///
/// Loads configuration, builds the archive, compresses it and emits it.
///
/// ## Errors
///
/// Fails on configuration problems, unreadable inputs or manifests, invalid
/// entries (empty names, names or link targets over 100 bytes) and write
/// failures.
pub fn handle_pack(args: PackArgs) -> Result<()> {
    info!("Handling pack command with args: {:?}", args);

    let config = config::load_config()?;
    let tar = build_archive(&args)?;
    if tar.is_empty() {
        warn!("Archive has no entries; writing an empty archive.");
    }

    let options = compress_options(&args, &config)?;
    let data = tar.compress(&options).map_err(CliError::from)?;
    info!(
        "Built archive: {} entries, {} bytes (level {})",
        tar.len(),
        data.len(),
        options.level
    );

    emit(&args, &config, &tar, &data)
}

/// Applies inputs, manifest, `--text`, `--link` and `--remove`, in that order.
fn build_archive(args: &PackArgs) -> Result<Tar> {
    let mut tar = Tar::new();

    tar.add(collect::collect_inputs(&args.inputs)?);

    if let Some(manifest) = &args.manifest {
        let specs = load_manifest(manifest)?;
        debug!("Manifest {:?} lists {} entries", manifest, specs.len());
        tar.add_specs(specs).map_err(CliError::from)?;
    }

    for (name, contents) in &args.texts {
        tar.upsert(entry_name(name)?, Entry::file(contents.as_bytes()));
    }
    for (name, target) in &args.links {
        tar.upsert(entry_name(name)?, Entry::symlink(target.as_str()));
    }

    let removals = args
        .removals
        .iter()
        .map(|name| entry_name(name))
        .collect::<Result<Vec<_>>>()?;
    tar.remove(&removals);

    debug!("Archive entries: {:?}", tar.names().collect::<Vec<_>>());
    Ok(tar)
}

fn compress_options(args: &PackArgs, config: &Config) -> Result<CompressOptions> {
    let level = match args.level {
        Some(level) => level,
        None => config.compression_level()?,
    };
    let mut options = CompressOptions::new().level(level);
    if let Some(timestamp) = args.timestamp {
        options = options.timestamp(timestamp);
    }
    Ok(options)
}

/// Writes base64 or the shell command to stdout, and saves to disk unless
/// only stdout output was requested.
fn emit(args: &PackArgs, config: &Config, tar: &Tar, data: &TarGzData) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    let printed = if args.base64 {
        writeln!(stdout, "{}", data.to_base64(None))?;
        true
    } else if let Some(path) = args.shell.as_deref() {
        writeln!(stdout, "{}", data.to_base64(Some(path)))?;
        true
    } else {
        false
    };

    if printed && args.output.is_none() {
        return Ok(());
    }

    let directory = match &args.dir {
        Some(dir) => dir.clone(),
        None => PathBuf::from(&config.output.directory),
    };
    io::ensure_dir_exists(&directory)?;
    let name = args.output.as_deref().unwrap_or(&config.output.name);

    let mut sink = FileSink::new(directory);
    let saved_name = data.save_as(&mut sink, Some(name)).map_err(CliError::from)?;
    let saved_path = sink.directory().join(&saved_name);
    if printed {
        info!("Saved {}", saved_path.display());
    } else {
        writeln!(
            stdout,
            "Saved {} ({} entries, {} bytes)",
            saved_path.display(),
            tar.len(),
            data.len()
        )?;
    }
    Ok(())
}

/// Reads a TOML manifest into entry specs, keeping the file's order.
fn load_manifest(path: &Path) -> Result<IndexMap<String, EntrySpec>> {
    let content = io::read_file_to_string(path)?;
    let specs: IndexMap<String, EntrySpec> =
        toml::from_str(&content).map_err(|e| CliError::Manifest {
            path: path.display().to_string(),
            reason: e.message().to_string(),
        })?;
    specs
        .into_iter()
        .map(|(name, spec)| -> Result<(String, EntrySpec)> { Ok((entry_name(&name)?, spec)) })
        .collect()
}

fn entry_name(name: &str) -> Result<String> {
    collect::archive_name(Path::new(name))
}

/// Parses `NAME=VALUE`; the value may itself contain `=`.
fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

fn parse_level(s: &str) -> std::result::Result<CompressionLevel, String> {
    let level: u8 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number between 0 and 9", s))?;
    CompressionLevel::new(level).map_err(|e| e.to_string())
}

fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("'{}' is not an RFC 3339 timestamp: {}", s, e))
}
