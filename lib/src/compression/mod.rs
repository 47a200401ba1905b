//! # Compression Module (`compression`)
//!
//! File: lib/src/compression/mod.rs
//!
//! ## Overview
//!
//! A self-contained DEFLATE encoder and gzip framer. Nothing here depends on
//! tar; the builder feeds the serialized tar bytes through `gzip::compress`.
//!
//! ## Architecture
//!
//! - **`bits`**: LSB-first bit writer.
//! - **`huffman`**: length-limited code construction and canonical codes.
//! - **`lz77`**: hash-chain match finder with greedy and lazy parsing.
//! - **`deflate`**: block splitting, block type selection, block encoding.
//! - **`gzip`**: RFC 1952 header and CRC32/size trailer.
//!
//! ## Usage
//!
//! ```rust
//! use targz::compression::gzip;
//! use targz::CompressionLevel;
//!
//! let member = gzip::compress(b"Hello world", CompressionLevel::BEST, 0);
//! assert_eq!(&member[..2], &[0x1f, 0x8b]);
//! ```
//!
pub mod bits;
pub mod deflate;
pub mod gzip;
pub mod huffman;
pub mod lz77;
