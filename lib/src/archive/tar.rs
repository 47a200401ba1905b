//! # Tar Archive Serialization
//!
//! File: lib/src/archive/tar.rs
//!
//! ## Overview
//!
//! Turns an ordered sequence of named entries into the bytes of an
//! uncompressed tar archive:
//!
//! ```text
//! [header][content, zero padded to 512] ... [header] [512 zero bytes][512 zero bytes]
//! ```
//!
//! Symlinks contribute a header only. The output length is always a multiple
//! of `BLOCK_SIZE`, and the output is a pure function of entry order, entry
//! contents and the build timestamp handed in by the caller.
//!
//! ## Usage
//!
//! ```rust
//! use targz::archive::{tar, Entry};
//!
//! let entries = [("test.txt", Entry::file("Hello world"))];
//! let bytes = tar::serialize(entries.iter().map(|(n, e)| (*n, e)), 0).unwrap();
//! assert_eq!(bytes.len(), 512 * 4);
//! ```
//!
use crate::archive::entry::{Entry, EntryKind};
use crate::archive::header::{EntryType, Header, BLOCK_SIZE};
use crate::core::error::Result;
use tracing::trace;

/// Number of zero blocks marking the end of the archive.
const END_OF_ARCHIVE_BLOCKS: usize = 2;

/// Serializes `entries` in order.
///
/// `build_time` (seconds since the Unix epoch) is the mtime of every entry
/// whose own `modified` is unset.
pub fn serialize<'a, I>(entries: I, build_time: i64) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (&'a str, &'a Entry)>,
{
    let mut out = Vec::new();
    let mut count = 0usize;
    for (name, entry) in entries {
        append_entry(&mut out, name, entry, build_time)?;
        count += 1;
    }
    out.resize(out.len() + END_OF_ARCHIVE_BLOCKS * BLOCK_SIZE, 0);
    trace!("Serialized {} tar entries into {} bytes", count, out.len());
    Ok(out)
}

/// Appends one header and, for files, its padded content to `out`.
pub fn append_entry(out: &mut Vec<u8>, name: &str, entry: &Entry, build_time: i64) -> Result<()> {
    let mtime = entry.modified.map_or(build_time, |m| m.timestamp());
    match &entry.kind {
        EntryKind::File { contents } => {
            let header = Header::encode(
                name,
                EntryType::Regular,
                contents.len() as u64,
                None,
                mtime,
            )?;
            out.extend_from_slice(header.as_bytes());
            out.extend_from_slice(contents);
            out.resize(out.len() + padding_for(contents.len()), 0);
        }
        EntryKind::Symlink { target } => {
            let header = Header::encode(name, EntryType::Symlink, 0, Some(target.as_str()), mtime)?;
            out.extend_from_slice(header.as_bytes());
        }
    }
    Ok(())
}

/// Zero bytes needed after `len` content bytes to reach the next block boundary.
pub fn padding_for(len: usize) -> usize {
    (BLOCK_SIZE - len % BLOCK_SIZE) % BLOCK_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::header::compute_checksum;
    use crate::core::error::TarGzError;
    use chrono::{TimeZone, Utc};

    fn serialize_pairs(pairs: &[(&str, Entry)], build_time: i64) -> Result<Vec<u8>> {
        serialize(pairs.iter().map(|(n, e)| (*n, e)), build_time)
    }

    #[test]
    fn test_empty_archive_is_two_zero_blocks() {
        let bytes = serialize_pairs(&[], 0).unwrap();
        assert_eq!(bytes, vec![0u8; 1024]);
    }

    #[test]
    fn test_padding_for() {
        assert_eq!(padding_for(0), 0);
        assert_eq!(padding_for(1), 511);
        assert_eq!(padding_for(511), 1);
        assert_eq!(padding_for(512), 0);
        assert_eq!(padding_for(513), 511);
    }

    #[test]
    fn test_file_content_is_padded() {
        let bytes = serialize_pairs(&[("test.txt", Entry::file("Hello world"))], 0).unwrap();
        assert_eq!(bytes.len(), 512 * 4);
        assert_eq!(&bytes[512..523], b"Hello world");
        assert!(bytes[523..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_exact_block_content_has_no_extra_padding() {
        let contents = vec![b'x'; 1024];
        let bytes = serialize_pairs(&[("blocks", Entry::file(contents))], 0).unwrap();
        assert_eq!(bytes.len(), 512 + 1024 + 1024);
    }

    #[test]
    fn test_symlink_has_no_content_blocks() {
        let pairs = [
            ("hello.txt", Entry::symlink("test.txt")),
            ("test.txt", Entry::file("Hello world")),
        ];
        let bytes = serialize_pairs(&pairs, 0).unwrap();
        // link header, file header, file block, terminator
        assert_eq!(bytes.len(), 512 * 5);
        assert_eq!(bytes[156], b'2');
        assert_eq!(&bytes[512..520], b"test.txt");
        assert_eq!(bytes[512 + 156], b'0');
    }

    #[test]
    fn test_every_header_checksum_is_valid() {
        let pairs = [
            ("a.txt", Entry::file("apple")),
            ("b.txt", Entry::file(vec![7u8; 700])),
            ("c", Entry::symlink("a.txt")),
        ];
        let bytes = serialize_pairs(&pairs, 1_000).unwrap();
        for offset in [0usize, 1024, 2560] {
            let block: &[u8; BLOCK_SIZE] = bytes[offset..offset + BLOCK_SIZE].try_into().unwrap();
            let stored = std::str::from_utf8(&block[148..154]).unwrap();
            assert_eq!(u32::from_str_radix(stored, 8).unwrap(), compute_checksum(block));
        }
    }

    #[test]
    fn test_build_time_fills_missing_mtime_only() {
        let own = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let pairs = [
            ("own", Entry::file("x").modified(own)),
            ("default", Entry::file("y")),
        ];
        let bytes = serialize_pairs(&pairs, 0o777).unwrap();
        assert_eq!(&bytes[136..148], b"13602760400\0");
        assert_eq!(&bytes[1024 + 136..1024 + 148], b"00000000777\0");
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let pairs = [
            ("test.txt", Entry::file("Hello world")),
            ("hello.txt", Entry::symlink("test.txt")),
        ];
        assert_eq!(
            serialize_pairs(&pairs, 42).unwrap(),
            serialize_pairs(&pairs, 42).unwrap()
        );
    }

    #[test]
    fn test_bad_name_fails_whole_archive() {
        let long = "x".repeat(120);
        let pairs = [("ok", Entry::file("fine")), (long.as_str(), Entry::file("nope"))];
        let err = serialize_pairs(&pairs, 0).unwrap_err();
        assert!(matches!(err, TarGzError::NameTooLong { len: 120, .. }));
    }
}
