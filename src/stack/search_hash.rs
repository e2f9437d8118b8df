//! Per-card search hashes.
//!
//! Every card reference in a page block carries a small bit array. Trigrams
//! of the words of the card are hashed into it, so a search can skip cards
//! whose hash does not have the bits of the searched word.

use serde::{Deserialize, Serialize};

use crate::common::binary::ByteRange;
use crate::common::error::Result;

/// Codes of the digits 0 to 9 in the hash alphabet
const DIGIT_CODES: [u32; 10] = [27, 28, 29, 30, 31, 32, 17, 22, 24, 26];

/// Number of leading bits of the hash not used for values
const RESERVED_BITS: usize = 9;

/// A bit array summarizing the words of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHash {
    pub ints: Vec<u32>,
    pub value_count: usize,
    size: usize,
}

impl SearchHash {
    pub fn new(ints: Vec<u32>, value_count: usize) -> Self {
        let bit_count = (ints.len() * 32).saturating_sub(RESERVED_BITS);
        let size = greatest_prime_up_to(bit_count);
        Self {
            ints,
            value_count,
            size,
        }
    }

    /// Read the hash stored at `offset` over `length` bytes.
    pub fn read(data: &ByteRange, offset: usize, length: usize, value_count: usize) -> Result<Self> {
        let ints = (0..length / 4)
            .map(|i| data.read_u32(offset + i * 4))
            .collect::<Result<Vec<_>>>()?;
        Ok(SearchHash::new(ints, value_count))
    }

    /// Encode a word in the hash alphabet, `None` if a character has no code.
    pub fn encode_word(word: &str) -> Option<Vec<u32>> {
        word.chars().map(encode_character).collect()
    }

    /// Whether the words of a card may contain `word`.
    ///
    /// Returns `None` when the word cannot be encoded, and `Some(true)` for
    /// words the hash never indexes: the card must then be searched.
    pub fn may_contain(&self, word: &str) -> Option<bool> {
        if !is_word_indexed(word) {
            return Some(true);
        }
        let code = SearchHash::encode_word(word)?;
        Some(self.may_contain_encoded(&code))
    }

    /// Same as [`may_contain`](Self::may_contain) for a pre-encoded word of
    /// at least 3 characters.
    pub fn may_contain_encoded(&self, code: &[u32]) -> bool {
        if code.len() < 3 || self.size == 0 {
            return true;
        }
        let c: Vec<i64> = code.iter().map(|&v| i64::from(v)).collect();
        let first = [
            c[0] * 4096 - (c[0] / 16) * 65535 + c[1] * 128 + c[2] * 4,
            c[0] * 16384 - (c[0] / 4) * 65535 + c[1] * 512 + c[2] * 16,
            c[0] + c[1] * 2048 + c[2] * 64,
        ];
        if !first.iter().all(|&value| self.is_value_present(value)) {
            return false;
        }
        if self.value_count >= 4
            && !self.is_value_present(c[0] * 4 + c[1] * 8192 - (c[1] / 8) * 65535 + c[2] * 256)
        {
            return false;
        }
        (3..c.len()).all(|i| {
            self.is_value_present(c[i] + c[i - 1] * 32 + c[i - 2] * 1024 + c[i - 3] * 32768)
        })
    }

    fn is_value_present(&self, value: i64) -> bool {
        let size = self.size as i64;
        let bit = RESERVED_BITS + value.rem_euclid(size) as usize;
        match self.ints.get(bit / 32) {
            Some(int) => int & (1u32 << (31 - bit % 32)) != 0,
            None => false,
        }
    }
}

/// Whether a word is stored in search hashes at all.
///
/// Words shorter than 3 characters, `the`, and numbers are left out.
pub fn is_word_indexed(word: &str) -> bool {
    if word.chars().count() < 3 {
        return false;
    }
    if word.eq_ignore_ascii_case("the") {
        return false;
    }
    !word.chars().all(|c| c.is_ascii_digit())
}

fn encode_character(c: char) -> Option<u32> {
    match c {
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 1),
        'a'..='z' => Some(c as u32 - 'a' as u32 + 1),
        '0'..='9' => Some(DIGIT_CODES[(c as u32 - '0' as u32) as usize]),
        _ => None,
    }
}

fn greatest_prime_up_to(n: usize) -> usize {
    if n < 3 {
        return n;
    }
    (2..=n).rev().find(|&k| is_prime(k)).unwrap_or(1)
}

fn is_prime(n: usize) -> bool {
    if n < 4 {
        return n >= 2;
    }
    let mut k = 2;
    while k * k <= n {
        if n % k == 0 {
            return false;
        }
        k += 1;
    }
    true
}
