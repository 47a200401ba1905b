//! # targz Archive Glue (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! The CLI side of archive building. The codec lives in the `targz`
//! library; this module connects it to the filesystem.
//!
//! - **`collect`**: walks input paths and produces `(name, Entry)` pairs.
//! - **`sink`**: `FileSink`, the `ArchiveSink` that writes `.tar.gz` files.
//!
//! ```rust
//! use crate::common::archive::{collect, sink::FileSink};
//! use targz::Tar;
//!
//! # fn run() -> anyhow::Result<()> {
//! let tar: Tar = collect::collect_inputs(&["./site"])?.into_iter().collect();
//! let data = tar.gz()?;
//! data.save_as(FileSink::new("./dist"), Some("site"))?;
//! # Ok(())
//! # }
//! ```
//!

pub mod collect;
pub mod sink;
