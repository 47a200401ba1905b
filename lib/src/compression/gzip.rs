//! # Gzip Member Framing
//!
//! File: lib/src/compression/gzip.rs
//!
//! ## Overview
//!
//! Wraps a DEFLATE stream in a single gzip member (RFC 1952):
//!
//! ```text
//! +----+----+----+-----+-------------+-----+----+
//! | 1f | 8b | 08 | FLG | MTIME (LE)  | XFL | OS |   10 bytes
//! +----+----+----+-----+-------------+-----+----+
//! | DEFLATE stream ...                          |
//! +---------------------+-----------------------+
//! | CRC32 of input (LE) | input length mod 2^32 |   8 bytes
//! +---------------------+-----------------------+
//! ```
//!
//! No optional header fields are written (FLG is 0). XFL advertises the
//! compression effort (2 at level 9, 4 at level 1) and OS is 3 (Unix).
//!
use super::deflate;
use crate::core::options::CompressionLevel;

/// gzip magic bytes (ID1, ID2).
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
/// Compression method 8: DEFLATE.
pub const METHOD_DEFLATE: u8 = 8;
/// Operating system byte for Unix.
pub const OS_UNIX: u8 = 3;

const XFL_MAX_COMPRESSION: u8 = 2;
const XFL_FASTEST: u8 = 4;

pub const HEADER_LEN: usize = 10;
pub const TRAILER_LEN: usize = 8;

/// Header fields of one gzip member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GzipHeader {
    /// Seconds since the Unix epoch; 0 means "no timestamp".
    pub mtime: u32,
    pub extra_flags: u8,
    pub os: u8,
}

impl GzipHeader {
    /// Header for a member compressed at `level` with build time `timestamp`.
    ///
    /// Timestamps before the epoch or past `u32::MAX` are written as 0.
    pub fn new(timestamp: i64, level: CompressionLevel) -> Self {
        let extra_flags = match level.get() {
            9 => XFL_MAX_COMPRESSION,
            1 => XFL_FASTEST,
            _ => 0,
        };
        GzipHeader {
            mtime: u32::try_from(timestamp).unwrap_or(0),
            extra_flags,
            os: OS_UNIX,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..2].copy_from_slice(&GZIP_MAGIC);
        out[2] = METHOD_DEFLATE;
        out[3] = 0;
        out[4..8].copy_from_slice(&self.mtime.to_le_bytes());
        out[8] = self.extra_flags;
        out[9] = self.os;
        out
    }
}

/// Assembles a member from the uncompressed `raw` bytes and their DEFLATE stream.
pub fn frame(header: &GzipHeader, raw: &[u8], deflated: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + deflated.len() + TRAILER_LEN);
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(deflated);
    out.extend_from_slice(&crc32fast::hash(raw).to_le_bytes());
    out.extend_from_slice(&input_size(raw.len() as u64).to_le_bytes());
    out
}

/// ISIZE: the input length modulo 2^32.
fn input_size(len: u64) -> u32 {
    (len & 0xFFFF_FFFF) as u32
}

/// Deflates `raw` at `level` and frames it with build time `timestamp`.
pub fn compress(raw: &[u8], level: CompressionLevel, timestamp: i64) -> Vec<u8> {
    let deflated = deflate::compress(raw, level);
    frame(&GzipHeader::new(timestamp, level), raw, &deflated)
}
