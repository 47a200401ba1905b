//! # LZ77 Match Finding
//!
//! File: lib/src/compression/lz77.rs
//!
//! ## Overview
//!
//! Turns input bytes into a sequence of `Token`s: literals and
//! (length, distance) back-references into the previous 32 KiB.
//!
//! ## Architecture
//!
//! Candidate positions are kept in hash chains keyed on the next three
//! bytes: `head` holds the most recent position for each hash, `prev`
//! links each position to the previous one with the same hash inside the
//! window. Two parsers sit on top of the chains:
//!
//! - **greedy** (levels 1-3): take the longest match at the current position.
//! - **lazy** (levels 4-9): before committing to a match, look one byte
//!   ahead and emit a literal instead if the next position matches longer.
//!
//! How hard the search tries is controlled per level by `LevelParams`
//! (the same good/lazy/nice/chain knobs zlib exposes). The parameters change
//! the token stream, never the bytes it decodes to.
//!
use tracing::trace;

pub const MIN_MATCH: usize = 3;
pub const MAX_MATCH: usize = 258;
pub const WINDOW_SIZE: usize = 32 * 1024;

const WINDOW_MASK: usize = WINDOW_SIZE - 1;
const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const HASH_MASK: usize = HASH_SIZE - 1;
const NIL: usize = usize::MAX;

/// Length-3 matches further back than this rarely pay for themselves.
const TOO_FAR: usize = 4096;

/// One LZ77 output symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    Match { length: u16, distance: u16 },
}

impl Token {
    /// Number of input bytes this token stands for.
    pub fn input_len(&self) -> usize {
        match *self {
            Token::Literal(_) => 1,
            Token::Match { length, .. } => length as usize,
        }
    }
}

/// Search parameters for one compression level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelParams {
    /// Once the previous match is at least this long, search a quarter of the chain.
    pub good_length: usize,
    /// Skip the lazy look-ahead once the current match is at least this long.
    pub max_lazy: usize,
    /// Stop searching once a match is at least this long.
    pub nice_length: usize,
    /// Maximum number of chain links followed per search.
    pub max_chain: usize,
    pub lazy: bool,
}

impl LevelParams {
    /// Parameters for levels 1-9. Level 0 never reaches the match finder.
    pub fn for_level(level: u8) -> LevelParams {
        let (good_length, max_lazy, nice_length, max_chain, lazy) = match level {
            0 | 1 => (4, 4, 8, 4, false),
            2 => (4, 5, 16, 8, false),
            3 => (4, 6, 32, 32, false),
            4 => (4, 4, 16, 16, true),
            5 => (8, 16, 32, 32, true),
            6 => (8, 16, 128, 128, true),
            7 => (8, 32, 128, 256, true),
            8 => (32, 128, 258, 1024, true),
            _ => (32, 258, 258, 4096, true),
        };
        LevelParams {
            good_length,
            max_lazy,
            nice_length,
            max_chain,
            lazy,
        }
    }
}

/// Hash chains over a fully materialized input.
struct MatchFinder<'a> {
    data: &'a [u8],
    head: Vec<usize>,
    prev: Vec<usize>,
    params: LevelParams,
}

impl<'a> MatchFinder<'a> {
    fn new(data: &'a [u8], params: LevelParams) -> Self {
        MatchFinder {
            data,
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; WINDOW_SIZE],
            params,
        }
    }

    fn hash(&self, pos: usize) -> usize {
        let d = self.data;
        ((usize::from(d[pos]) << 10) ^ (usize::from(d[pos + 1]) << 5) ^ usize::from(d[pos + 2]))
            & HASH_MASK
    }

    /// Records `pos` as the newest candidate for its hash.
    fn insert(&mut self, pos: usize) {
        if pos + MIN_MATCH > self.data.len() {
            return;
        }
        let h = self.hash(pos);
        self.prev[pos & WINDOW_MASK] = self.head[h];
        self.head[h] = pos;
    }

    /// Longest match for `pos` that beats `prev_length`, as (length, distance).
    ///
    /// Must be called before `insert(pos)`.
    fn longest_match(&self, pos: usize, prev_length: usize) -> Option<(usize, usize)> {
        let data = self.data;
        let max_len = MAX_MATCH.min(data.len() - pos);
        if max_len < MIN_MATCH {
            return None;
        }

        let mut chain = self.params.max_chain;
        if prev_length >= self.params.good_length {
            chain >>= 2;
        }
        let nice = self.params.nice_length.min(max_len);

        let mut best_len = prev_length.max(MIN_MATCH - 1);
        if best_len >= max_len {
            return None;
        }
        let mut best_dist = 0;
        let mut candidate = self.head[self.hash(pos)];

        while candidate != NIL && chain > 0 {
            debug_assert!(candidate < pos);
            let dist = pos - candidate;
            if dist > WINDOW_SIZE {
                break;
            }

            // Cheap rejection: the byte that would extend the best match must agree.
            if data[candidate + best_len] == data[pos + best_len] && data[candidate] == data[pos] {
                let len = common_prefix(&data[candidate..], &data[pos..pos + max_len]);
                if len > best_len {
                    best_len = len;
                    best_dist = dist;
                    if len >= nice {
                        break;
                    }
                }
            }

            let next = self.prev[candidate & WINDOW_MASK];
            if next == NIL || next >= candidate {
                break;
            }
            candidate = next;
            chain -= 1;
        }

        if best_dist == 0 {
            return None;
        }
        if best_len == MIN_MATCH && best_dist > TOO_FAR {
            return None;
        }
        Some((best_len, best_dist))
    }
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Tokenizes `data` with the search effort of `params`.
pub fn tokenize(data: &[u8], params: LevelParams) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(data.len() / 2 + 1);
    if params.lazy {
        tokenize_lazy(data, params, &mut tokens);
    } else {
        tokenize_greedy(data, params, &mut tokens);
    }
    trace!(
        "LZ77 produced {} tokens for {} input bytes (lazy: {})",
        tokens.len(),
        data.len(),
        params.lazy
    );
    tokens
}

fn push_match(tokens: &mut Vec<Token>, length: usize, distance: usize) {
    debug_assert!((MIN_MATCH..=MAX_MATCH).contains(&length));
    debug_assert!((1..=WINDOW_SIZE).contains(&distance));
    tokens.push(Token::Match {
        length: length as u16,
        distance: distance as u16,
    });
}

fn tokenize_greedy(data: &[u8], params: LevelParams, tokens: &mut Vec<Token>) {
    let mut finder = MatchFinder::new(data, params);
    let mut pos = 0;
    while pos < data.len() {
        let found = finder.longest_match(pos, 0);
        finder.insert(pos);
        match found {
            Some((length, distance)) => {
                push_match(tokens, length, distance);
                for p in pos + 1..pos + length {
                    finder.insert(p);
                }
                pos += length;
            }
            None => {
                tokens.push(Token::Literal(data[pos]));
                pos += 1;
            }
        }
    }
}

fn tokenize_lazy(data: &[u8], params: LevelParams, tokens: &mut Vec<Token>) {
    let mut finder = MatchFinder::new(data, params);
    // Match found at `pos - 1`, waiting to see whether `pos` does better.
    let mut pending: Option<(usize, usize)> = None;
    // Whether `data[pos - 1]` has not been emitted yet.
    let mut literal_pending = false;
    let mut pos = 0;

    while pos < data.len() {
        let prev_len = pending.map_or(0, |(len, _)| len);
        let current = if prev_len < params.max_lazy {
            finder.longest_match(pos, prev_len)
        } else {
            None
        };
        finder.insert(pos);

        match (pending, current) {
            (Some((len, dist)), cur) if cur.map_or(true, |(c, _)| c <= len) => {
                // The match starting at pos - 1 wins.
                push_match(tokens, len, dist);
                let end = pos - 1 + len;
                for p in pos + 1..end {
                    finder.insert(p);
                }
                pos = end;
                pending = None;
                literal_pending = false;
            }
            (_, cur) => {
                if literal_pending {
                    tokens.push(Token::Literal(data[pos - 1]));
                }
                pending = cur;
                literal_pending = true;
                pos += 1;
            }
        }
    }

    if literal_pending {
        tokens.push(Token::Literal(data[data.len() - 1]));
    }
}
