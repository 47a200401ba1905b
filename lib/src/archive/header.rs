//! # Tar Header Encoding
//!
//! File: lib/src/archive/header.rs
//!
//! ## Overview
//!
//! Encodes a single entry into the 512-byte UStar header block.
//!
//! | Offset | Size | Field     | Value written                              |
//! |--------|------|-----------|--------------------------------------------|
//! | 0      | 100  | name      | entry name, NUL padded                     |
//! | 100    | 8    | mode      | `0000644\0` (file) / `0000777\0` (symlink) |
//! | 108    | 8    | uid       | `0000000\0`                                |
//! | 116    | 8    | gid       | `0000000\0`                                |
//! | 124    | 12   | size      | content length, 11 octal digits + NUL      |
//! | 136    | 12   | mtime     | seconds since epoch, 11 octal digits + NUL |
//! | 148    | 8    | checksum  | 6 octal digits, NUL, space                 |
//! | 156    | 1    | typeflag  | `0` file, `2` symlink                      |
//! | 157    | 100  | linkname  | symlink target, NUL padded                 |
//! | 257    | 6    | magic     | `ustar\0`                                  |
//! | 263    | 2    | version   | `00`                                       |
//! | 265    | 32   | uname     | empty                                      |
//! | 297    | 32   | gname     | empty                                      |
//! | 329    | 8    | devmajor  | empty                                      |
//! | 337    | 8    | devminor  | empty                                      |
//! | 345    | 155  | prefix    | empty                                      |
//!
//! Names and link targets must fit their 100-byte fields; they are never
//! truncated and the prefix field is not used to split long paths.
//!
use crate::core::error::{Result, TarGzError};
use std::fmt;

/// Size of every tar block, header or content.
pub const BLOCK_SIZE: usize = 512;

/// Capacity of the `name` and `linkname` fields.
pub const NAME_FIELD_LEN: usize = 100;

/// Largest value an 11-digit octal field can hold (8 GiB - 1).
pub const MAX_OCTAL_11: u64 = 0o77777777777;

const NAME: (usize, usize) = (0, 100);
const MODE: (usize, usize) = (100, 8);
const UID: (usize, usize) = (108, 8);
const GID: (usize, usize) = (116, 8);
const SIZE: (usize, usize) = (124, 12);
const MTIME: (usize, usize) = (136, 12);
const CHECKSUM: (usize, usize) = (148, 8);
const TYPEFLAG: usize = 156;
const LINKNAME: (usize, usize) = (157, 100);
const MAGIC: (usize, usize) = (257, 6);
const VERSION: (usize, usize) = (263, 2);

const USTAR_MAGIC: &[u8; 6] = b"ustar\0";
const USTAR_VERSION: &[u8; 2] = b"00";

const FILE_MODE: u64 = 0o644;
const SYMLINK_MODE: u64 = 0o777;

/// Entry kinds this encoder knows how to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Regular,
    Symlink,
}

impl EntryType {
    pub fn typeflag(self) -> u8 {
        match self {
            EntryType::Regular => b'0',
            EntryType::Symlink => b'2',
        }
    }

    fn mode(self) -> u64 {
        match self {
            EntryType::Regular => FILE_MODE,
            EntryType::Symlink => SYMLINK_MODE,
        }
    }
}

/// One encoded 512-byte header block.
#[derive(Clone, PartialEq, Eq)]
pub struct Header {
    bytes: [u8; BLOCK_SIZE],
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("name", &String::from_utf8_lossy(trim_nul(field(&self.bytes, NAME))))
            .field("typeflag", &(self.bytes[TYPEFLAG] as char))
            .finish_non_exhaustive()
    }
}

impl Header {
    /// Encodes a header for `name`.
    ///
    /// `size` is the content length (ignored and written as 0 for symlinks),
    /// `link_target` is required for symlinks and ignored for regular files,
    /// and `mtime` is seconds since the Unix epoch, clamped into the range
    /// the 11-digit octal field can represent.
    pub fn encode(
        name: &str,
        entry_type: EntryType,
        size: u64,
        link_target: Option<&str>,
        mtime: i64,
    ) -> Result<Header> {
        if name.is_empty() {
            return Err(TarGzError::InvalidEntry {
                name: String::new(),
                reason: "entry name is empty".into(),
            });
        }
        if name.len() > NAME_FIELD_LEN {
            return Err(TarGzError::NameTooLong {
                name: name.to_string(),
                len: name.len(),
                max: NAME_FIELD_LEN,
            });
        }
        if name.contains('\0') {
            return Err(TarGzError::InvalidEntry {
                name: name.to_string(),
                reason: "name contains a NUL byte".into(),
            });
        }

        let (size, link) = match entry_type {
            EntryType::Regular => (size, ""),
            EntryType::Symlink => {
                let target = link_target.ok_or_else(|| TarGzError::InvalidEntry {
                    name: name.to_string(),
                    reason: "symlink without a target".into(),
                })?;
                (0, target)
            }
        };
        if size > MAX_OCTAL_11 {
            return Err(TarGzError::EntryTooLarge {
                name: name.to_string(),
                size,
            });
        }
        if link.len() > NAME_FIELD_LEN {
            return Err(TarGzError::LinkTargetTooLong {
                name: name.to_string(),
                len: link.len(),
                max: NAME_FIELD_LEN,
            });
        }
        if link.contains('\0') {
            return Err(TarGzError::InvalidEntry {
                name: name.to_string(),
                reason: "link target contains a NUL byte".into(),
            });
        }

        let mut bytes = [0u8; BLOCK_SIZE];
        field_mut(&mut bytes, NAME)[..name.len()].copy_from_slice(name.as_bytes());
        write_octal(field_mut(&mut bytes, MODE), entry_type.mode());
        write_octal(field_mut(&mut bytes, UID), 0);
        write_octal(field_mut(&mut bytes, GID), 0);
        write_octal(field_mut(&mut bytes, SIZE), size);
        write_octal(field_mut(&mut bytes, MTIME), clamp_mtime(mtime));
        bytes[TYPEFLAG] = entry_type.typeflag();
        field_mut(&mut bytes, LINKNAME)[..link.len()].copy_from_slice(link.as_bytes());
        field_mut(&mut bytes, MAGIC).copy_from_slice(USTAR_MAGIC);
        field_mut(&mut bytes, VERSION).copy_from_slice(USTAR_VERSION);

        let checksum = compute_checksum(&bytes);
        let formatted = format!("{:06o}\0 ", checksum);
        field_mut(&mut bytes, CHECKSUM).copy_from_slice(formatted.as_bytes());

        Ok(Header { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.bytes
    }

    /// Checksum as stored in the header's checksum field.
    pub fn stored_checksum(&self) -> Option<u32> {
        parse_octal(field(&self.bytes, CHECKSUM)).map(|v| v as u32)
    }

    /// Recomputes the checksum over the current bytes.
    pub fn computed_checksum(&self) -> u32 {
        compute_checksum(&self.bytes)
    }
}

/// Unsigned byte sum of `block`, with the checksum field counted as eight spaces.
pub fn compute_checksum(block: &[u8; BLOCK_SIZE]) -> u32 {
    let (start, len) = CHECKSUM;
    block
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            if (start..start + len).contains(&i) {
                u32::from(b' ')
            } else {
                u32::from(b)
            }
        })
        .sum()
}

fn clamp_mtime(mtime: i64) -> u64 {
    if mtime <= 0 {
        0
    } else {
        (mtime as u64).min(MAX_OCTAL_11)
    }
}

/// Writes `value` as zero-padded octal filling all but the last byte, which is NUL.
fn write_octal(dst: &mut [u8], value: u64) {
    let digits = dst.len() - 1;
    let text = format!("{:0width$o}", value, width = digits);
    debug_assert_eq!(text.len(), digits, "octal value overflows its field");
    dst[..digits].copy_from_slice(text.as_bytes());
    dst[digits] = 0;
}

fn parse_octal(src: &[u8]) -> Option<u64> {
    let digits: &[u8] = {
        let end = src
            .iter()
            .position(|&b| b == 0 || b == b' ')
            .unwrap_or(src.len());
        &src[..end]
    };
    if digits.is_empty() {
        return None;
    }
    let text = std::str::from_utf8(digits).ok()?;
    u64::from_str_radix(text, 8).ok()
}

fn field(bytes: &[u8; BLOCK_SIZE], (start, len): (usize, usize)) -> &[u8] {
    &bytes[start..start + len]
}

fn field_mut(bytes: &mut [u8; BLOCK_SIZE], (start, len): (usize, usize)) -> &mut [u8] {
    &mut bytes[start..start + len]
}

fn trim_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_file_layout() {
        let header = Header::encode("test.txt", EntryType::Regular, 11, None, 1_577_836_800)
            .unwrap();
        let b = header.as_bytes();
        assert_eq!(&b[0..8], b"test.txt");
        assert!(b[8..100].iter().all(|&x| x == 0));
        assert_eq!(&b[100..108], b"0000644\0");
        assert_eq!(&b[108..116], b"0000000\0");
        assert_eq!(&b[116..124], b"0000000\0");
        assert_eq!(&b[124..136], b"00000000013\0");
        assert_eq!(&b[136..148], b"13602760400\0");
        assert_eq!(b[156], b'0');
        assert!(b[157..257].iter().all(|&x| x == 0));
        assert_eq!(&b[257..263], b"ustar\0");
        assert_eq!(&b[263..265], b"00");
        assert!(b[265..512].iter().all(|&x| x == 0));
    }

    #[test]
    fn test_checksum_field_format_and_value() {
        let header = Header::encode("a.txt", EntryType::Regular, 5, None, 0).unwrap();
        let field = &header.as_bytes()[148..156];
        assert!(field[..6].iter().all(|b| (b'0'..=b'7').contains(b)));
        assert_eq!(field[6], 0);
        assert_eq!(field[7], b' ');
        assert_eq!(header.stored_checksum(), Some(header.computed_checksum()));
    }

    #[test]
    fn test_symlink_layout() {
        let header =
            Header::encode("hello.txt", EntryType::Symlink, 42, Some("test.txt"), 10).unwrap();
        let b = header.as_bytes();
        assert_eq!(&b[100..108], b"0000777\0");
        // Symlinks never carry content, whatever size was passed in.
        assert_eq!(&b[124..136], b"00000000000\0");
        assert_eq!(b[156], b'2');
        assert_eq!(&b[157..165], b"test.txt");
        assert_eq!(header.stored_checksum(), Some(header.computed_checksum()));
    }

    #[test]
    fn test_name_limits() {
        let exact = "n".repeat(NAME_FIELD_LEN);
        let header = Header::encode(&exact, EntryType::Regular, 0, None, 0).unwrap();
        assert_eq!(&header.as_bytes()[..100], exact.as_bytes());
        assert_eq!(&header.as_bytes()[100..108], b"0000644\0");

        let long = "n".repeat(NAME_FIELD_LEN + 1);
        let err = Header::encode(&long, EntryType::Regular, 0, None, 0).unwrap_err();
        assert!(matches!(err, TarGzError::NameTooLong { len: 101, max: 100, .. }));

        let err = Header::encode("", EntryType::Regular, 0, None, 0).unwrap_err();
        assert!(matches!(err, TarGzError::InvalidEntry { .. }));
    }

    #[test]
    fn test_link_target_limit() {
        let long = "t".repeat(NAME_FIELD_LEN + 1);
        let err = Header::encode("link", EntryType::Symlink, 0, Some(&long), 0).unwrap_err();
        assert!(matches!(err, TarGzError::LinkTargetTooLong { len: 101, .. }));
    }

    #[test]
    fn test_size_limit() {
        let err =
            Header::encode("big", EntryType::Regular, MAX_OCTAL_11 + 1, None, 0).unwrap_err();
        assert!(matches!(err, TarGzError::EntryTooLarge { .. }));
        assert!(Header::encode("big", EntryType::Regular, MAX_OCTAL_11, None, 0).is_ok());
    }

    #[test]
    fn test_mtime_is_clamped() {
        let before_epoch = Header::encode("old", EntryType::Regular, 0, None, -5).unwrap();
        assert_eq!(&before_epoch.as_bytes()[136..148], b"00000000000\0");

        let far_future = Header::encode("new", EntryType::Regular, 0, None, i64::MAX).unwrap();
        assert_eq!(&far_future.as_bytes()[136..148], b"77777777777\0");
    }

    #[test]
    fn test_multibyte_name_is_counted_in_bytes() {
        // 34 three-byte characters = 102 bytes.
        let name = "€".repeat(34);
        let err = Header::encode(&name, EntryType::Regular, 0, None, 0).unwrap_err();
        assert!(matches!(err, TarGzError::NameTooLong { len: 102, .. }));
    }

    #[test]
    fn test_nul_in_name_or_target_is_rejected() {
        let err = Header::encode("a\0b.txt", EntryType::Regular, 1, None, 0).unwrap_err();
        match err {
            TarGzError::InvalidEntry { name, reason } => {
                assert_eq!(name, "a\0b.txt");
                assert_eq!(reason, "name contains a NUL byte");
            }
            other => panic!("unexpected error {:?}", other),
        }

        let err =
            Header::encode("link", EntryType::Symlink, 0, Some("t\0arget"), 0).unwrap_err();
        assert!(matches!(err, TarGzError::InvalidEntry { .. }));
    }
}
