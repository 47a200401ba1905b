//! # Tar Archive Module (`archive`)
//!
//! File: lib/src/archive/mod.rs
//!
//! ## Overview
//!
//! Everything needed to produce the uncompressed tar container:
//!
//! - **`entry`**: the `Entry` / `EntryKind` data model and the manifest-facing `EntrySpec`.
//! - **`header`**: encodes one entry into a 512-byte UStar header with checksum.
//! - **`tar`**: concatenates headers and padded content and appends the end-of-archive marker.
//!
//! Compression of the resulting bytes lives in the sibling `compression` module.
//!
pub mod entry;
pub mod header;
pub mod tar;

pub use entry::{Entry, EntryKind, EntrySpec};
pub use header::{EntryType, Header, BLOCK_SIZE};
