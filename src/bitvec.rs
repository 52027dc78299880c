//! Append-only bitstream shared by every encoded sequence.
//!
//! Many sequences are packed back-to-back into one stream; each encoding only
//! ever appends to a [`BitVectorBuilder`] and later reads from a frozen
//! [`BitVector`] at the offset the caller recorded before writing.
//!
//! # Layout
//!
//! Bits are packed least-significant-first into `u64` words: bit `i` lives in
//! word `i / 64` at bit `i % 64`. Multi-bit fields written with
//! [`BitVectorBuilder::set_bits`] may straddle two words. Bits past `len` are
//! always zero.

use crate::error::{Error, Result};

#[inline]
fn mask(width: usize) -> u64 {
    if width >= 64 {
        !0u64
    } else {
        (1u64 << width) - 1
    }
}

/// Index of the most significant set bit; `x` must be nonzero.
#[inline]
pub(crate) fn msb(x: u64) -> u32 {
    debug_assert!(x != 0);
    63 - x.leading_zeros()
}

/// Smallest `b` with `2^b >= x`.
#[inline]
pub(crate) fn ceil_log2(x: u64) -> u32 {
    if x <= 1 {
        0
    } else {
        64 - (x - 1).leading_zeros()
    }
}

/// Position of the `k`-th (0-indexed) set bit of `word`.
///
/// `k` must be smaller than `word.count_ones()`.
#[cfg(all(target_arch = "x86_64", target_feature = "bmi2"))]
#[inline]
pub(crate) fn select_in_word(word: u64, k: usize) -> usize {
    debug_assert!(k < word.count_ones() as usize);
    // SAFETY: the `bmi2` target feature is enabled at compile time.
    let res = unsafe { core::arch::x86_64::_pdep_u64(1u64 << k, word) };
    res.trailing_zeros() as usize
}

/// Position of the `k`-th (0-indexed) set bit of `word`.
///
/// `k` must be smaller than `word.count_ones()`.
#[cfg(not(all(target_arch = "x86_64", target_feature = "bmi2")))]
#[inline]
pub(crate) fn select_in_word(word: u64, k: usize) -> usize {
    debug_assert!(k < word.count_ones() as usize);
    let mut w = word;
    for _ in 0..k {
        w &= w - 1;
    }
    w.trailing_zeros() as usize
}

/// Growable bitstream that sequences are written into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitVectorBuilder {
    words: Vec<u64>,
    len: u64,
}

impl BitVectorBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder with room for `bits` bits.
    pub fn with_capacity(bits: u64) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(64) as usize),
            len: 0,
        }
    }

    /// Number of bits written so far. This is the offset the next write lands at.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Return true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a single bit.
    pub fn push(&mut self, bit: bool) {
        self.append_bits(bit as u64, 1);
    }

    /// Append the low `width` bits of `value` (`width <= 64`).
    pub fn append_bits(&mut self, value: u64, width: usize) {
        debug_assert!(width <= 64);
        let pos = self.len;
        self.zero_extend(width as u64);
        self.set_bits(pos, value, width);
    }

    /// Append `bits` zero bits.
    pub fn zero_extend(&mut self, bits: u64) {
        self.len += bits;
        self.words.resize(self.len.div_ceil(64) as usize, 0);
    }

    /// Overwrite the bit at `pos`, which must already be inside the stream.
    pub fn set(&mut self, pos: u64, bit: bool) {
        debug_assert!(pos < self.len);
        let word = &mut self.words[(pos / 64) as usize];
        let bit_mask = 1u64 << (pos % 64);
        if bit {
            *word |= bit_mask;
        } else {
            *word &= !bit_mask;
        }
    }

    /// Overwrite `width` bits starting at `pos` with the low bits of `value`.
    pub fn set_bits(&mut self, pos: u64, value: u64, width: usize) {
        debug_assert!(width <= 64);
        debug_assert!(pos + width as u64 <= self.len);
        if width == 0 {
            return;
        }
        let value = value & mask(width);
        let word = (pos / 64) as usize;
        let shift = (pos % 64) as usize;

        self.words[word] &= !(mask(width) << shift);
        self.words[word] |= value << shift;

        let stored = 64 - shift;
        if stored < width {
            self.words[word + 1] &= !mask(width - stored);
            self.words[word + 1] |= value >> stored;
        }
    }

    /// Drop every bit at or after `len`.
    pub fn truncate(&mut self, len: u64) {
        if len >= self.len {
            return;
        }
        self.len = len;
        self.words.truncate(len.div_ceil(64) as usize);
        let tail = (len % 64) as usize;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= mask(tail);
            }
        }
    }

    /// Append the Elias gamma code of `value + 1`, so zero is encodable.
    pub fn append_gamma(&mut self, value: u64) {
        debug_assert!(value < u64::MAX);
        let v = value + 1;
        let k = 63 - v.leading_zeros() as usize;
        // k zeros then a one, then the k bits below the leading one
        self.append_bits(1u64 << k, k + 1);
        self.append_bits(v & mask(k), k);
    }

    /// Freeze the stream.
    pub fn build(self) -> BitVector {
        BitVector {
            words: self.words,
            len: self.len,
        }
    }
}

/// Immutable bitstream read by the sequence enumerators.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BitVector {
    words: Vec<u64>,
    len: u64,
}

impl std::fmt::Debug for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitVector")
            .field("len", &self.len)
            .field("ones", &self.count_ones(0, self.len))
            .finish()
    }
}

impl BitVector {
    /// Rebuild a bit vector from words previously obtained through [`BitVector::as_words`].
    pub fn from_words(words: Vec<u64>, len: u64) -> Result<Self> {
        if (words.len() as u64) < len.div_ceil(64) {
            return Err(Error::InvalidEncoding(format!(
                "{} words cannot hold {len} bits",
                words.len()
            )));
        }
        Ok(Self { words, len })
    }

    /// The backing words, least-significant bit first.
    pub fn as_words(&self) -> &[u64] {
        &self.words
    }

    /// Return the total number of bits.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Return true if the bit vector has length 0.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Approximate heap memory usage in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.words.capacity() * 8
    }

    /// Return true if the bit at `pos` is set.
    pub fn get(&self, pos: u64) -> bool {
        if pos >= self.len {
            return false;
        }
        (self.words[(pos / 64) as usize] >> (pos % 64)) & 1 == 1
    }

    /// Read `width` bits (`width <= 64`) starting at `pos`.
    #[inline]
    pub fn get_bits(&self, pos: u64, width: usize) -> u64 {
        debug_assert!(width <= 64);
        if width == 0 {
            return 0;
        }
        let word = (pos / 64) as usize;
        let shift = (pos % 64) as usize;
        let mut value = self.words[word] >> shift;
        if shift + width > 64 {
            value |= self.words[word + 1] << (64 - shift);
        }
        value & mask(width)
    }

    /// Position of the first set bit at or after `pos`.
    pub fn successor1(&self, pos: u64) -> Option<u64> {
        if pos >= self.len {
            return None;
        }
        let mut idx = (pos / 64) as usize;
        let mut word = self.words[idx] & (!0u64 << (pos % 64));
        loop {
            if word != 0 {
                let found = idx as u64 * 64 + word.trailing_zeros() as u64;
                return (found < self.len).then_some(found);
            }
            idx += 1;
            if idx >= self.words.len() {
                return None;
            }
            word = self.words[idx];
        }
    }

    /// Number of set bits in `[begin, end)`.
    pub fn count_ones(&self, begin: u64, end: u64) -> u64 {
        debug_assert!(begin <= end && end <= self.len);
        let mut count = 0u64;
        let mut pos = begin;
        while pos < end {
            let width = (end - pos).min(64);
            count += self.get_bits(pos, width as usize).count_ones() as u64;
            pos += width;
        }
        count
    }

    /// Decode a code written by [`BitVectorBuilder::append_gamma`].
    ///
    /// Returns the value and the position just past the code.
    pub fn read_gamma(&self, pos: u64) -> Result<(u64, u64)> {
        let one = self.successor1(pos).ok_or_else(|| {
            Error::InvalidEncoding(format!("no gamma terminator at or after bit {pos}"))
        })?;
        let k = one - pos;
        if k > 63 || one + 1 + k > self.len {
            return Err(Error::InvalidEncoding(format!(
                "gamma code at bit {pos} overruns the bit vector"
            )));
        }
        let low = self.get_bits(one + 1, k as usize);
        let value = (1u64 << k) | low;
        Ok((value - 1, one + 1 + k))
    }
}

/// Cursor over the set bits of a [`BitVector`], read a word at a time.
///
/// Unary codes (a run of zeros closed by a one) are how both the Elias-Fano
/// upper bits and the ranked bitvector store their elements, so walking ones
/// and zeros is the decode hot path.
#[derive(Debug, Clone)]
pub struct UnaryEnumerator<'a> {
    data: &'a [u64],
    position: u64,
    buf: u64,
}

impl<'a> UnaryEnumerator<'a> {
    /// Start at bit `pos`; bits before it are ignored.
    pub fn new(bv: &'a BitVector, pos: u64) -> Self {
        let data = bv.as_words();
        let word = data.get((pos / 64) as usize).copied().unwrap_or(0);
        Self {
            data,
            position: pos,
            buf: word & (!0u64 << (pos % 64)),
        }
    }

    /// Current bit position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Consume the next set bit and return its position.
    ///
    /// A set bit must exist before the end of the data.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        let mut buf = self.buf;
        while buf == 0 {
            self.position += 64;
            buf = self.data[(self.position / 64) as usize];
        }
        let pos_in_word = buf.trailing_zeros() as u64;
        self.buf = buf & (buf - 1);
        self.position = (self.position & !63) + pos_in_word;
        self.position
    }

    /// Skip `k` set bits; the following [`next`](Self::next) returns the one after them.
    #[inline]
    pub fn skip(&mut self, k: u64) {
        let mut skipped = 0u64;
        let mut buf = self.buf;
        loop {
            let w = buf.count_ones() as u64;
            if skipped + w > k {
                break;
            }
            skipped += w;
            self.position += 64;
            buf = self.data[(self.position / 64) as usize];
        }
        let pos_in_word = select_in_word(buf, (k - skipped) as usize) as u64;
        self.buf = buf & (!0u64 << pos_in_word);
        self.position = (self.position & !63) + pos_in_word;
    }

    /// Skip `k` clear bits and stop on the next clear bit.
    ///
    /// Ones already consumed by [`next`](Self::next) in the current word count
    /// as zeros, so callers should only use this on a cursor that has not
    /// consumed anything since it was created or last skipped.
    #[inline]
    pub fn skip0(&mut self, k: u64) {
        let mut skipped = 0u64;
        let pos_in_word = self.position % 64;
        let mut buf = !self.buf & (!0u64 << pos_in_word);
        loop {
            let w = buf.count_ones() as u64;
            if skipped + w > k {
                break;
            }
            skipped += w;
            self.position += 64;
            buf = !self.data[(self.position / 64) as usize];
        }
        let pos_in_word = select_in_word(buf, (k - skipped) as usize) as u64;
        self.buf = !buf & (!0u64 << pos_in_word);
        self.position = (self.position & !63) + pos_in_word;
    }
}
