//! # targz Library
//!
//! File: lib/src/lib.rs
//!
//! ## Overview
//!
//! Builds gzip-compressed tar archives entirely in memory. Entries (regular
//! files and symbolic links) are collected in a [`Tar`] builder, serialized to
//! a UStar tar stream, compressed with the crate's own DEFLATE encoder and
//! framed as a single gzip member. The result, [`TarGzData`], can be taken as
//! raw bytes, as base64 text, as a shell command that recreates the archive,
//! or handed to an [`ArchiveSink`].
//!
//! ## Architecture
//!
//! - **`archive`**: entry model, 512-byte header encoding, tar serialization.
//! - **`compression`**: bit writer, Huffman codes, LZ77, DEFLATE blocks, gzip framing.
//! - **`builder`**: the ordered entry set and the `compress` pipeline.
//! - **`output`**: the compressed result and its export formats.
//! - **`core`**: error type and compression options.
//!
//! ## Examples
//!
//! ```rust
//! use targz::{Entry, Tar};
//!
//! let tar = Tar::with_entries([
//!     ("test.txt", Entry::file("Hello world")),
//!     ("hello.txt", Entry::symlink("test.txt")),
//! ]);
//! let data = tar.gz().unwrap();
//! assert_eq!(&data.to_bytes()[..2], &[0x1f, 0x8b]);
//! ```
//!
pub mod archive;
pub mod builder;
pub mod compression;
pub mod core;
pub mod output;

pub use archive::{Entry, EntryKind, EntrySpec};
pub use builder::Tar;
pub use core::error::{Result, TarGzError};
pub use core::options::{CompressOptions, CompressionLevel};
pub use output::{ArchiveSink, TarGzData, MIME_TYPE};
