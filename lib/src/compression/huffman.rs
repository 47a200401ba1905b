//! # Huffman Codes
//!
//! File: lib/src/compression/huffman.rs
//!
//! ## Overview
//!
//! Builds the prefix codes DEFLATE needs (RFC 1951, section 3.2.2):
//!
//! - **Code lengths** from symbol frequencies, limited to a maximum bit
//!   length (15 for literal/length and distance trees, 7 for the code-length
//!   tree).
//! - **Canonical codes** from code lengths, stored bit-reversed so they can
//!   be written LSB first by the `BitWriter`.
//! - The **fixed** literal/length and distance codes of block type 1.
//!
//! ## Length limiting
//!
//! Lengths come from a regular Huffman construction (two-queue merge over
//! frequency-sorted leaves). When the deepest leaf exceeds the limit, the
//! per-length counts are folded back under the limit and rebalanced until the
//! Kraft sum is exactly one again, then handed out so that rarer symbols get
//! the longer codes.
//!
//! Every tree built from frequencies has at least two coded symbols. A
//! one-symbol tree would be incomplete, which some inflaters reject, so a
//! second (unused) symbol is given a code as well.
//!
use super::bits::BitWriter;

/// Longest code allowed for literal/length and distance trees.
pub const MAX_CODE_BITS: u8 = 15;

/// Longest code allowed for the code-length tree.
pub const MAX_CODE_LENGTH_BITS: u8 = 7;

/// A canonical Huffman code over `lengths.len()` symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanCode {
    lengths: Vec<u8>,
    codes: Vec<u16>,
}

impl HuffmanCode {
    /// Builds a length-limited code for the given frequencies.
    pub fn from_frequencies(freqs: &[u32], max_bits: u8) -> HuffmanCode {
        HuffmanCode::from_lengths(build_lengths(freqs, max_bits))
    }

    /// Assigns canonical codes to the given lengths.
    pub fn from_lengths(lengths: Vec<u8>) -> HuffmanCode {
        let max = lengths.iter().copied().max().unwrap_or(0) as usize;
        let mut bl_count = vec![0u16; max + 1];
        for &len in &lengths {
            if len > 0 {
                bl_count[len as usize] += 1;
            }
        }

        // bl_count[0] stays zero, so the first code of the shortest length is 0.
        let mut next_code = vec![0u16; max + 1];
        let mut code = 0u16;
        for bits in 1..=max {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code;
        }

        let codes = lengths
            .iter()
            .map(|&len| {
                if len == 0 {
                    return 0;
                }
                let c = next_code[len as usize];
                next_code[len as usize] += 1;
                reverse_bits(c, len)
            })
            .collect();

        HuffmanCode { lengths, codes }
    }

    /// Block type 1 literal/length code: 0-143 → 8 bits, 144-255 → 9,
    /// 256-279 → 7, 280-287 → 8.
    pub fn fixed_literal() -> HuffmanCode {
        let mut lengths = vec![0u8; 288];
        for (sym, len) in lengths.iter_mut().enumerate() {
            *len = match sym {
                0..=143 => 8,
                144..=255 => 9,
                256..=279 => 7,
                _ => 8,
            };
        }
        HuffmanCode::from_lengths(lengths)
    }

    /// Block type 1 distance code: 30 symbols (plus two unused), 5 bits each.
    pub fn fixed_distance() -> HuffmanCode {
        HuffmanCode::from_lengths(vec![5u8; 32])
    }

    pub fn lengths(&self) -> &[u8] {
        &self.lengths
    }

    pub fn length(&self, symbol: usize) -> u8 {
        self.lengths[symbol]
    }

    /// Writes the code for `symbol`.
    pub fn write(&self, w: &mut BitWriter, symbol: usize) {
        let len = self.lengths[symbol];
        debug_assert!(len > 0, "symbol {} has no code", symbol);
        w.write_bits(u32::from(self.codes[symbol]), u32::from(len));
    }
}

fn reverse_bits(code: u16, len: u8) -> u16 {
    code.reverse_bits() >> (16 - u32::from(len))
}

/// Computes code lengths for `freqs`, no longer than `max_bits`.
pub fn build_lengths(freqs: &[u32], max_bits: u8) -> Vec<u8> {
    let mut lengths = vec![0u8; freqs.len()];

    // Leaves sorted by (frequency, symbol) ascending.
    let mut leaves: Vec<(u32, usize)> = freqs
        .iter()
        .enumerate()
        .filter(|(_, &f)| f > 0)
        .map(|(sym, &f)| (f, sym))
        .collect();

    // Guarantee two coded symbols so the tree is complete.
    let mut filler = 0;
    while leaves.len() < 2 && filler < freqs.len() {
        if !leaves.iter().any(|&(_, sym)| sym == filler) {
            leaves.push((0, filler));
        }
        filler += 1;
    }
    if leaves.len() < 2 {
        // Alphabets of fewer than two symbols never occur in DEFLATE.
        for (_, sym) in leaves {
            lengths[sym] = 1;
        }
        return lengths;
    }
    leaves.sort_unstable();

    let depths = tree_depths(&leaves);
    let counts = limit_counts(&depths, max_bits);

    // Hand out lengths: the rarest symbols (front of `leaves`) take the longest codes.
    let mut next = 0;
    for len in (1..=max_bits as usize).rev() {
        for _ in 0..counts[len] {
            lengths[leaves[next].1] = len as u8;
            next += 1;
        }
    }
    debug_assert_eq!(next, leaves.len());
    lengths
}

/// Depth of each leaf in a Huffman tree over `leaves` (sorted ascending).
fn tree_depths(leaves: &[(u32, usize)]) -> Vec<u32> {
    let n = leaves.len();
    let total = 2 * n - 1;
    let mut weight: Vec<u64> = Vec::with_capacity(total);
    weight.extend(leaves.iter().map(|&(f, _)| u64::from(f)));
    let mut parent = vec![0usize; total];

    // Two queues: unconsumed leaves [leaf..n) and internal nodes [internal..weight.len()).
    let mut leaf = 0;
    let mut internal = n;
    for node in n..total {
        let mut pick = || {
            let take_leaf = leaf < n && (internal >= node || weight[leaf] <= weight[internal]);
            if take_leaf {
                leaf += 1;
                leaf - 1
            } else {
                internal += 1;
                internal - 1
            }
        };
        let a = pick();
        let b = pick();
        weight.push(weight[a] + weight[b]);
        parent[a] = node;
        parent[b] = node;
    }

    let mut depth = vec![0u32; total];
    for node in (0..total - 1).rev() {
        depth[node] = depth[parent[node]] + 1;
    }
    depth.truncate(n);
    depth
}

/// Per-length leaf counts, rebalanced so no code exceeds `max_bits`.
fn limit_counts(depths: &[u32], max_bits: u8) -> Vec<u32> {
    let max = max_bits as usize;
    let mut counts = vec![0u32; max + 1];
    for &d in depths {
        counts[(d as usize).min(max)] += 1;
    }

    // Kraft sum scaled by 2^max; a complete code sums to exactly 2^max.
    let target = 1u64 << max;
    let mut total: u64 = (1..=max).map(|len| u64::from(counts[len]) << (max - len)).sum();
    while total > target {
        // Move one leaf from the deepest level up next to a shallower leaf,
        // which lengthens that leaf by one and frees a slot.
        counts[max] -= 1;
        for len in (1..max).rev() {
            if counts[len] != 0 {
                counts[len] -= 1;
                counts[len + 1] += 2;
                break;
            }
        }
        total -= 1;
    }
    debug_assert_eq!(total, target);
    counts
}
