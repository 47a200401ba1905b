//! # DEFLATE Encoder
//!
//! File: lib/src/compression/deflate.rs
//!
//! ## Overview
//!
//! Produces an RFC 1951 bitstream from raw bytes at a given
//! `CompressionLevel`. Any conforming inflater decodes the result back to the
//! exact input; the level only trades speed for size.
//!
//! ## Architecture
//!
//! 1. Level 0 skips match finding and writes stored blocks of at most
//!    65535 bytes.
//! 2. Levels 1-9 run the `lz77` tokenizer over the whole input, then cut the
//!    token stream into blocks of at most `TOKENS_PER_BLOCK` symbols.
//! 3. For every block the exact bit cost of the three block types is
//!    computed (stored, fixed Huffman, dynamic Huffman) and the cheapest one
//!    is written. Only the last block carries BFINAL.
//!
//! A dynamic block header carries HLIT/HDIST/HCLEN, the code-length code in
//! the permuted RFC order, and the run-length encoded literal/length and
//! distance code lengths (symbols 16, 17, 18).
//!
//! ## Usage
//!
//! ```rust
//! use targz::compression::deflate;
//! use targz::CompressionLevel;
//!
//! let stream = deflate::compress(b"hello hello hello", CompressionLevel::BEST);
//! assert!(!stream.is_empty());
//! ```
//!
use super::bits::BitWriter;
use super::huffman::{HuffmanCode, MAX_CODE_BITS, MAX_CODE_LENGTH_BITS};
use super::lz77::{self, LevelParams, Token};
use crate::core::options::CompressionLevel;
use tracing::trace;

/// Maximum payload of one stored block.
pub const MAX_STORED_BLOCK: usize = 65_535;

/// Symbols per compressed block before a new block (and new trees) start.
const TOKENS_PER_BLOCK: usize = 16_384;

const END_OF_BLOCK: usize = 256;
const LITERAL_ALPHABET: usize = 286;
const DISTANCE_ALPHABET: usize = 30;
const CODE_LENGTH_ALPHABET: usize = 19;

const BTYPE_STORED: u32 = 0b00;
const BTYPE_FIXED: u32 = 0b01;
const BTYPE_DYNAMIC: u32 = 0b10;

const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];
const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];
const DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];
const DIST_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Transmission order of the code-length code lengths.
const CODE_LENGTH_ORDER: [usize; CODE_LENGTH_ALPHABET] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Compresses `data` into a raw DEFLATE stream.
pub fn compress(data: &[u8], level: CompressionLevel) -> Vec<u8> {
    let mut w = BitWriter::with_capacity(data.len() / 2 + 64);
    if level.get() == 0 {
        write_stored_blocks(&mut w, data, true);
    } else {
        let tokens = lz77::tokenize(data, LevelParams::for_level(level.get()));
        write_token_blocks(&mut w, data, &tokens);
    }
    let out = w.finish();
    trace!(
        "DEFLATE level {}: {} bytes in, {} bytes out",
        level,
        data.len(),
        out.len()
    );
    out
}

fn write_token_blocks(w: &mut BitWriter, data: &[u8], tokens: &[Token]) {
    if tokens.is_empty() {
        // Empty input: a single final fixed block holding only end-of-block.
        write_block_header(w, true, BTYPE_FIXED);
        HuffmanCode::fixed_literal().write(w, END_OF_BLOCK);
        return;
    }

    let mut start = 0;
    let chunks = tokens.chunks(TOKENS_PER_BLOCK);
    let last = chunks.len() - 1;
    for (i, block) in chunks.enumerate() {
        let len: usize = block.iter().map(Token::input_len).sum();
        write_block(w, &data[start..start + len], block, i == last);
        start += len;
    }
    debug_assert_eq!(start, data.len());
}

/// Symbol frequencies of one block.
struct BlockStats {
    literal: [u32; LITERAL_ALPHABET],
    distance: [u32; DISTANCE_ALPHABET],
}

impl BlockStats {
    fn collect(tokens: &[Token]) -> Self {
        let mut stats = BlockStats {
            literal: [0; LITERAL_ALPHABET],
            distance: [0; DISTANCE_ALPHABET],
        };
        for token in tokens {
            match *token {
                Token::Literal(b) => stats.literal[b as usize] += 1,
                Token::Match { length, distance } => {
                    stats.literal[257 + length_code(length)] += 1;
                    stats.distance[distance_code(distance)] += 1;
                }
            }
        }
        stats.literal[END_OF_BLOCK] = 1;
        stats
    }
}

/// Trees and header symbols for a dynamic block.
struct DynamicTrees {
    literal: HuffmanCode,
    distance: HuffmanCode,
    code_length: HuffmanCode,
    hlit: usize,
    hdist: usize,
    hclen: usize,
    /// Run-length encoded code lengths as (symbol, extra bits value).
    rle: Vec<(u8, u8)>,
}

impl DynamicTrees {
    fn build(stats: &BlockStats) -> Self {
        let literal = HuffmanCode::from_frequencies(&stats.literal, MAX_CODE_BITS);
        let distance = HuffmanCode::from_frequencies(&stats.distance, MAX_CODE_BITS);

        let hlit = used_len(literal.lengths()).max(257);
        let hdist = used_len(distance.lengths()).max(1);

        let mut lengths = Vec::with_capacity(hlit + hdist);
        lengths.extend_from_slice(&literal.lengths()[..hlit]);
        lengths.extend_from_slice(&distance.lengths()[..hdist]);
        let rle = run_length_encode(&lengths);

        let mut cl_freqs = [0u32; CODE_LENGTH_ALPHABET];
        for &(sym, _) in &rle {
            cl_freqs[sym as usize] += 1;
        }
        let code_length = HuffmanCode::from_frequencies(&cl_freqs, MAX_CODE_LENGTH_BITS);

        let hclen = CODE_LENGTH_ORDER
            .iter()
            .rposition(|&sym| code_length.length(sym) != 0)
            .map_or(0, |i| i + 1)
            .max(4);

        DynamicTrees {
            literal,
            distance,
            code_length,
            hlit,
            hdist,
            hclen,
            rle,
        }
    }

    /// Bits needed for the dynamic block header, excluding the 3-bit block header.
    fn header_bits(&self) -> u64 {
        let mut bits = 5 + 5 + 4 + 3 * self.hclen as u64;
        for &(sym, _) in &self.rle {
            bits += u64::from(self.code_length.length(sym as usize)) + u64::from(rle_extra_bits(sym));
        }
        bits
    }

    fn write_header(&self, w: &mut BitWriter) {
        w.write_bits((self.hlit - 257) as u32, 5);
        w.write_bits((self.hdist - 1) as u32, 5);
        w.write_bits((self.hclen - 4) as u32, 4);
        for &sym in &CODE_LENGTH_ORDER[..self.hclen] {
            w.write_bits(u32::from(self.code_length.length(sym)), 3);
        }
        for &(sym, extra) in &self.rle {
            self.code_length.write(w, sym as usize);
            w.write_bits(u32::from(extra), rle_extra_bits(sym));
        }
    }
}

fn write_block(w: &mut BitWriter, raw: &[u8], tokens: &[Token], is_final: bool) {
    let stats = BlockStats::collect(tokens);
    let fixed_lit = HuffmanCode::fixed_literal();
    let fixed_dist = HuffmanCode::fixed_distance();
    let dynamic = DynamicTrees::build(&stats);

    let fixed_cost = 3 + data_bits(&stats, &fixed_lit, &fixed_dist);
    let dynamic_cost = 3 + dynamic.header_bits() + data_bits(&stats, &dynamic.literal, &dynamic.distance);
    let stored_cost = stored_bits(w.bit_len(), raw.len());

    trace!(
        "Block of {} tokens / {} bytes: stored={} fixed={} dynamic={} bits",
        tokens.len(),
        raw.len(),
        stored_cost,
        fixed_cost,
        dynamic_cost
    );

    if stored_cost <= fixed_cost && stored_cost <= dynamic_cost {
        write_stored_blocks(w, raw, is_final);
    } else if fixed_cost <= dynamic_cost {
        write_block_header(w, is_final, BTYPE_FIXED);
        write_tokens(w, tokens, &fixed_lit, &fixed_dist);
    } else {
        write_block_header(w, is_final, BTYPE_DYNAMIC);
        dynamic.write_header(w);
        write_tokens(w, tokens, &dynamic.literal, &dynamic.distance);
    }
}

fn write_block_header(w: &mut BitWriter, is_final: bool, btype: u32) {
    w.write_bits(u32::from(is_final), 1);
    w.write_bits(btype, 2);
}

/// Writes `data` as one or more stored blocks; BFINAL goes on the last one
/// only when `is_final`.
fn write_stored_blocks(w: &mut BitWriter, data: &[u8], is_final: bool) {
    if data.is_empty() {
        write_stored_block(w, &[], is_final);
        return;
    }
    let mut chunks = data.chunks(MAX_STORED_BLOCK).peekable();
    while let Some(chunk) = chunks.next() {
        let last = chunks.peek().is_none();
        write_stored_block(w, chunk, is_final && last);
    }
}

fn write_stored_block(w: &mut BitWriter, chunk: &[u8], is_final: bool) {
    debug_assert!(chunk.len() <= MAX_STORED_BLOCK);
    write_block_header(w, is_final, BTYPE_STORED);
    w.align_to_byte();
    let len = chunk.len() as u16;
    w.write_bits(u32::from(len), 16);
    w.write_bits(u32::from(!len), 16);
    w.write_bytes(chunk);
}

/// Exact cost of storing `len` bytes starting at bit position `at`.
fn stored_bits(at: u64, len: usize) -> u64 {
    let blocks = len.div_ceil(MAX_STORED_BLOCK).max(1) as u64;
    let mut bits = 0u64;
    let mut pos = at;
    for _ in 0..blocks {
        pos += 3;
        let pad = (8 - pos % 8) % 8;
        bits += 3 + pad + 32;
        pos += pad + 32;
    }
    bits + len as u64 * 8
}

fn write_tokens(w: &mut BitWriter, tokens: &[Token], lit: &HuffmanCode, dist: &HuffmanCode) {
    for token in tokens {
        match *token {
            Token::Literal(b) => lit.write(w, b as usize),
            Token::Match { length, distance } => {
                let lc = length_code(length);
                lit.write(w, 257 + lc);
                w.write_bits(
                    u32::from(length - LENGTH_BASE[lc]),
                    u32::from(LENGTH_EXTRA[lc]),
                );
                let dc = distance_code(distance);
                dist.write(w, dc);
                w.write_bits(
                    u32::from(distance - DIST_BASE[dc]),
                    u32::from(DIST_EXTRA[dc]),
                );
            }
        }
    }
    lit.write(w, END_OF_BLOCK);
}

/// Bits for the block's symbols (including end-of-block) under the given codes.
fn data_bits(stats: &BlockStats, lit: &HuffmanCode, dist: &HuffmanCode) -> u64 {
    let mut bits = 0u64;
    for (sym, &freq) in stats.literal.iter().enumerate() {
        if freq == 0 {
            continue;
        }
        let mut per = u64::from(lit.length(sym));
        if sym > END_OF_BLOCK {
            per += u64::from(LENGTH_EXTRA[sym - 257]);
        }
        bits += per * u64::from(freq);
    }
    for (sym, &freq) in stats.distance.iter().enumerate() {
        bits += (u64::from(dist.length(sym)) + u64::from(DIST_EXTRA[sym])) * u64::from(freq);
    }
    bits
}

/// Index into `LENGTH_BASE` for a match length in 3..=258.
fn length_code(length: u16) -> usize {
    LENGTH_BASE.partition_point(|&base| base <= length) - 1
}

/// Index into `DIST_BASE` for a distance in 1..=32768.
fn distance_code(distance: u16) -> usize {
    DIST_BASE.partition_point(|&base| base <= distance) - 1
}

/// Number of leading symbols up to and including the last one with a code.
fn used_len(lengths: &[u8]) -> usize {
    lengths.iter().rposition(|&l| l != 0).map_or(0, |i| i + 1)
}

fn rle_extra_bits(sym: u8) -> u32 {
    match sym {
        16 => 2,
        17 => 3,
        18 => 7,
        _ => 0,
    }
}

/// Run-length encodes code lengths with the code-length alphabet:
/// 0-15 literal lengths, 16 repeats the previous length 3-6 times,
/// 17 repeats zero 3-10 times, 18 repeats zero 11-138 times.
fn run_length_encode(lengths: &[u8]) -> Vec<(u8, u8)> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < lengths.len() {
        let len = lengths[i];
        let run = lengths[i..].iter().take_while(|&&l| l == len).count();
        let mut left = run;
        if len == 0 {
            while left >= 11 {
                let take = left.min(138);
                out.push((18, (take - 11) as u8));
                left -= take;
            }
            if left >= 3 {
                out.push((17, (left - 3) as u8));
                left = 0;
            }
        } else {
            out.push((len, 0));
            left -= 1;
            while left >= 3 {
                let take = left.min(6);
                out.push((16, (take - 3) as u8));
                left -= take;
            }
        }
        out.extend(std::iter::repeat((len, 0)).take(left));
        i += run;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::DeflateDecoder;
    use std::io::Read;

    fn inflate(stream: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        DeflateDecoder::new(stream)
            .read_to_end(&mut out)
            .expect("stream must inflate");
        out
    }

    fn level(l: u8) -> CompressionLevel {
        CompressionLevel::new(l).unwrap()
    }

    /// Deterministic pseudo-random bytes (xorshift).
    fn noise(len: usize, seed: u64) -> Vec<u8> {
        let mut x = seed | 1;
        (0..len)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 7;
                x ^= x << 17;
                x as u8
            })
            .collect()
    }

    fn text(len: usize) -> Vec<u8> {
        let words = ["tar", "gzip", "header", "block", "deflate", "huffman", "window", "\n"];
        let mut out = Vec::with_capacity(len);
        let mut i = 0usize;
        while out.len() < len {
            out.extend_from_slice(words[(i * 7 + i / 3) % words.len()].as_bytes());
            out.push(b' ');
            i += 1;
        }
        out.truncate(len);
        out
    }

    #[test]
    fn test_empty_input_every_level() {
        for l in 0..=9 {
            let stream = compress(&[], level(l));
            assert!(!stream.is_empty());
            assert!(inflate(&stream).is_empty(), "level {}", l);
        }
        // Final fixed block with only end-of-block.
        assert_eq!(compress(&[], level(6)), vec![0x03, 0x00]);
    }

    #[test]
    fn test_tiny_inputs_round_trip() {
        for data in [&b"a"[..], b"ab", b"abc", b"aaaa"] {
            for l in 0..=9 {
                assert_eq!(inflate(&compress(data, level(l))), data, "level {}", l);
            }
        }
    }

    #[test]
    fn test_all_levels_round_trip_mixed_data() {
        let mut data = text(70_000);
        data.extend(noise(20_000, 7));
        data.extend(vec![0u8; 5_000]);
        data.extend(text(30_000));
        for l in 0..=9 {
            let stream = compress(&data, level(l));
            assert_eq!(inflate(&stream), data, "level {}", l);
        }
    }

    #[test]
    fn test_level_zero_is_stored() {
        let data = noise(MAX_STORED_BLOCK + 10, 3);
        let stream = compress(&data, level(0));
        // Two stored blocks: 5 header bytes each plus the payload.
        assert_eq!(stream.len(), data.len() + 10);
        assert_eq!(stream[0], 0b000);
        assert_eq!(inflate(&stream), data);
    }

    #[test]
    fn test_repetitive_data_compresses() {
        let data = text(100_000);
        let fast = compress(&data, level(1));
        let best = compress(&data, level(9));
        assert!(best.len() < data.len() / 10);
        assert!(fast.len() < data.len() / 10);
        assert_eq!(inflate(&fast), data);
        assert_eq!(inflate(&best), data);
    }

    #[test]
    fn test_incompressible_data_falls_back_to_stored() {
        let data = noise(10_000, 99);
        let stream = compress(&data, level(9));
        // Never much larger than storing.
        assert!(stream.len() <= data.len() + 5 * 2);
        assert_eq!(inflate(&stream), data);
    }

    #[test]
    fn test_long_run_of_one_byte() {
        let data = vec![b'x'; 300_000];
        let stream = compress(&data, level(6));
        assert!(stream.len() < 2_000);
        assert_eq!(inflate(&stream), data);
    }

    #[test]
    fn test_length_and_distance_codes() {
        assert_eq!(length_code(3), 0);
        assert_eq!(length_code(10), 7);
        assert_eq!(length_code(11), 8);
        assert_eq!(length_code(12), 8);
        assert_eq!(length_code(257), 27);
        assert_eq!(length_code(258), 28);
        assert_eq!(distance_code(1), 0);
        assert_eq!(distance_code(4), 3);
        assert_eq!(distance_code(5), 4);
        assert_eq!(distance_code(6), 4);
        assert_eq!(distance_code(24577), 29);
        assert_eq!(distance_code(32768), 29);
    }

    #[test]
    fn test_run_length_encoding() {
        let mut lengths = vec![8u8; 10];
        lengths.extend(vec![0u8; 150]);
        lengths.extend([5, 5, 0, 0]);
        let rle = run_length_encode(&lengths);
        assert_eq!(
            rle,
            vec![
                (8, 0),
                (16, 3),
                (16, 0),
                (18, 127),
                (18, 1),
                (5, 0),
                (5, 0),
                (0, 0),
                (0, 0),
            ]
        );
        // Expanding gives the original sequence back.
        let mut expanded = Vec::new();
        for &(sym, extra) in &rle {
            match sym {
                16 => {
                    let prev = *expanded.last().unwrap();
                    expanded.extend(std::iter::repeat(prev).take(3 + extra as usize));
                }
                17 => expanded.extend(std::iter::repeat(0).take(3 + extra as usize)),
                18 => expanded.extend(std::iter::repeat(0).take(11 + extra as usize)),
                l => expanded.push(l),
            }
        }
        assert_eq!(expanded, lengths);
    }

    #[test]
    fn test_stored_bits_accounts_for_alignment() {
        // At bit 0: 3 header bits, 5 padding bits, LEN/NLEN, payload.
        assert_eq!(stored_bits(0, 10), 3 + 5 + 32 + 80);
        // At bit 5: header ends on a byte boundary.
        assert_eq!(stored_bits(5, 0), 3 + 32);
    }
}
