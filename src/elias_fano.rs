//! Elias-Fano encoding for monotone sequences, laid out in a shared bitstream.
//!
//! Provides near-optimal space for sorted integers with sampled pointers for
//! fast positional access and `next_geq`.
//!
//! # Theory
//!
//! For $n$ sorted integers in range $[0, U)$, Elias-Fano uses:
//! - $L = \lfloor \log_2(U/n) \rfloor$ bits for each "lower" part.
//! - A bit vector of length $n + \lfloor U/2^L \rfloor + 2$ for the "upper"
//!   parts, stored in unary: element $i$ sets bit $(v_i \gg L) + i + 1$.
//!
//! Total space is about $n (2 + \log_2(U/n))$ bits, within a small constant of
//! $\log_2 \binom{U}{n}$.
//!
//! # Layout
//!
//! ```text
//! [zero pointers][one pointers][upper bits][lower bits]
//! ```
//!
//! - Zero pointer `k - 1` holds the upper-bits position of zero number
//!   `k << ef_log_sampling0`; `next_geq` starts from it.
//! - One pointer `k - 1` holds the upper-bits position of the one for element
//!   `k << ef_log_sampling1`; `move_to` starts from it.
//!
//! The upper bits start and end with a zero, so every element's unary code is
//! preceded by at least one zero.

use crate::bitvec::{ceil_log2, msb, BitVector, BitVectorBuilder, UnaryEnumerator};
use crate::error::{Error, Result};
use crate::params::GlobalParameters;
use crate::sequence::{Posting, SequenceEncoding, SequenceEnumerator};

/// Upper-bit distance below which `next_geq` decodes element by element.
const LINEAR_SCAN_THRESHOLD: u64 = 8;

#[derive(Debug, Clone, Copy)]
struct Offsets {
    universe: u64,
    n: u64,
    log_sampling0: u32,
    log_sampling1: u32,

    lower_bits: usize,
    mask: u64,
    upper_bits_len: u64,
    pointer_size: usize,

    pointers0_offset: u64,
    pointers1_offset: u64,
    upper_bits_offset: u64,
    lower_bits_offset: u64,
    end: u64,
}

impl Offsets {
    /// Offsets saturate at `u64::MAX`, which marks a layout that cannot be written.
    fn new(base: u64, universe: u64, n: u64, params: &GlobalParameters) -> Self {
        debug_assert!(params.validate().is_ok());
        let log_sampling0 = params.ef_log_sampling0 as u32;
        let log_sampling1 = params.ef_log_sampling1 as u32;

        let lower_bits = if universe > n {
            msb(universe / n.max(1)) as usize
        } else {
            0
        };
        let upper_bits_len = n
            .saturating_add(universe >> lower_bits)
            .saturating_add(2);
        let pointer_size = ceil_log2(upper_bits_len) as usize;
        let pointers0 = upper_bits_len.saturating_sub(n) >> log_sampling0;
        let pointers1 = n >> log_sampling1;

        let pointers0_offset = base;
        let pointers1_offset =
            pointers0_offset.saturating_add(pointers0.saturating_mul(pointer_size as u64));
        let upper_bits_offset =
            pointers1_offset.saturating_add(pointers1.saturating_mul(pointer_size as u64));
        let lower_bits_offset = upper_bits_offset.saturating_add(upper_bits_len);
        let end = lower_bits_offset.saturating_add(n.saturating_mul(lower_bits as u64));

        Self {
            universe,
            n,
            log_sampling0,
            log_sampling1,
            lower_bits,
            mask: (1u64 << lower_bits) - 1,
            upper_bits_len,
            pointer_size,
            pointers0_offset,
            pointers1_offset,
            upper_bits_offset,
            lower_bits_offset,
            end,
        }
    }

    /// Fill the zero pointers for the zeros at upper positions `[begin, end)`,
    /// all of which have `rank` ones before them.
    fn set_zero_pointers(&self, builder: &mut BitVectorBuilder, begin: u64, end: u64, rank: u64) {
        let begin_zeros = begin - rank;
        let end_zeros = end - rank;
        let mut ptr0 = begin_zeros.div_ceil(1u64 << self.log_sampling0);
        while (ptr0 << self.log_sampling0) < end_zeros {
            if ptr0 > 0 {
                let offset = self.pointers0_offset + (ptr0 - 1) * self.pointer_size as u64;
                debug_assert!(offset + self.pointer_size as u64 <= self.pointers1_offset);
                builder.set_bits(
                    offset,
                    (ptr0 << self.log_sampling0) + rank,
                    self.pointer_size,
                );
            }
            ptr0 += 1;
        }
    }
}

/// Elias-Fano with sampled zero and one pointers.
///
/// Accepts non-decreasing input.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactEliasFano;

impl CompactEliasFano {
    fn write_at<I>(
        builder: &mut BitVectorBuilder,
        base: u64,
        values: I,
        universe: u64,
        n: u64,
        params: &GlobalParameters,
    ) -> Result<()>
    where
        I: IntoIterator<Item = u64>,
    {
        params.validate()?;
        let of = Offsets::new(base, universe, n, params);
        if of.end == u64::MAX {
            return Err(Error::SequenceTooLarge { universe, n });
        }
        builder.zero_extend(of.end - base);

        let sample1_mask = (1u64 << of.log_sampling1) - 1;
        let mut last = 0u64;
        let mut last_high = 0u64;
        let mut count = 0u64;

        for v in values.into_iter().take(n as usize) {
            let i = count;
            if i > 0 && v < last {
                return Err(Error::NotSorted {
                    index: i,
                    prev: last,
                    next: v,
                });
            }
            if v >= universe {
                return Err(Error::ValueOutOfUniverse {
                    index: i,
                    value: v,
                    universe,
                });
            }

            let high = (v >> of.lower_bits) + i + 1;
            builder.set(of.upper_bits_offset + high, true);
            builder.set_bits(
                of.lower_bits_offset + i * of.lower_bits as u64,
                v & of.mask,
                of.lower_bits,
            );

            if i > 0 && (i & sample1_mask) == 0 {
                let ptr1 = i >> of.log_sampling1;
                let offset = of.pointers1_offset + (ptr1 - 1) * of.pointer_size as u64;
                debug_assert!(offset + of.pointer_size as u64 <= of.upper_bits_offset);
                builder.set_bits(offset, high, of.pointer_size);
            }

            // zeros between the previous one and this one
            of.set_zero_pointers(builder, last_high + 1, high, i);
            last_high = high;
            last = v;
            count += 1;
        }

        if count < n {
            return Err(Error::LengthMismatch {
                expected: n,
                actual: count,
            });
        }

        // zeros after the last one
        of.set_zero_pointers(builder, last_high + 1, of.upper_bits_len, n);
        Ok(())
    }
}

impl SequenceEncoding for CompactEliasFano {
    type Enumerator<'a> = Enumerator<'a>;

    fn bitsize(params: &GlobalParameters, universe: u64, n: u64) -> u64 {
        Offsets::new(0, universe, n, params).end
    }

    fn write<I>(
        builder: &mut BitVectorBuilder,
        values: I,
        universe: u64,
        n: u64,
        params: &GlobalParameters,
    ) -> Result<()>
    where
        I: IntoIterator<Item = u64>,
    {
        let base = builder.len();
        let result = Self::write_at(builder, base, values, universe, n, params);
        if result.is_err() {
            builder.truncate(base);
        }
        result
    }

    fn enumerator<'a>(
        bits: &'a BitVector,
        offset: u64,
        universe: u64,
        n: u64,
        params: &GlobalParameters,
    ) -> Enumerator<'a> {
        Enumerator::new(bits, offset, universe, n, params)
    }
}

/// Cursor over a [`CompactEliasFano`] sequence.
#[derive(Debug, Clone)]
pub struct Enumerator<'a> {
    bv: &'a BitVector,
    of: Offsets,
    // Sits just past the one of the element at `position` once started.
    high: UnaryEnumerator<'a>,
    position: u64,
    value: u64,
    started: bool,
}

impl<'a> Enumerator<'a> {
    /// Bind to the sequence written at `offset`.
    pub fn new(
        bv: &'a BitVector,
        offset: u64,
        universe: u64,
        n: u64,
        params: &GlobalParameters,
    ) -> Self {
        let of = Offsets::new(offset, universe, n, params);
        Self {
            bv,
            high: UnaryEnumerator::new(bv, of.upper_bits_offset),
            of,
            position: 0,
            value: 0,
            started: false,
        }
    }

    #[inline]
    fn read_low(&self, position: u64) -> u64 {
        self.bv.get_bits(
            self.of.lower_bits_offset + position * self.of.lower_bits as u64,
            self.of.lower_bits,
        )
    }

    /// Consume the one of the element at `self.position` and decode it.
    #[inline]
    fn read_next(&mut self) -> u64 {
        let high_pos = self.high.next();
        let high = high_pos - self.of.upper_bits_offset - self.position - 1;
        (high << self.of.lower_bits) | self.read_low(self.position)
    }

    fn pointer(&self, offset: u64, i: u64) -> u64 {
        if i == 0 {
            0
        } else {
            self.bv.get_bits(
                offset + (i - 1) * self.of.pointer_size as u64,
                self.of.pointer_size,
            )
        }
    }

    fn pointer0(&self, i: u64) -> u64 {
        self.pointer(self.of.pointers0_offset, i)
    }

    fn pointer1(&self, i: u64) -> u64 {
        self.pointer(self.of.pointers1_offset, i)
    }

    fn set_end(&mut self) -> Posting {
        self.started = true;
        self.position = self.of.n;
        self.value = self.of.universe;
        (self.position, self.value)
    }

    /// Decode forward from `self.position` until a value reaches `lower_bound`.
    fn scan(&mut self, lower_bound: u64) -> Posting {
        loop {
            if self.position >= self.of.n {
                return self.set_end();
            }
            let v = self.read_next();
            if v >= lower_bound {
                self.value = v;
                return (self.position, self.value);
            }
            self.position += 1;
        }
    }

    /// `self.high` sits on zero number `high_lower_bound`; every element after
    /// it has an upper part of at least `high_lower_bound`.
    fn scan_from_zero(&mut self, high_lower_bound: u64, lower_bound: u64) -> Posting {
        self.started = true;
        self.position = self.high.position() - self.of.upper_bits_offset - high_lower_bound;
        self.scan(lower_bound)
    }
}

impl SequenceEnumerator for Enumerator<'_> {
    fn move_to(&mut self, position: u64) -> Result<Posting> {
        if position >= self.of.n {
            return Err(Error::PositionOutOfRange {
                position,
                size: self.of.n,
            });
        }
        if self.started && position == self.position {
            return Ok((self.position, self.value));
        }

        let skip = position.wrapping_sub(self.position);
        if self.started && position > self.position && (skip >> self.of.log_sampling1) == 0 {
            self.high.skip(skip - 1);
        } else {
            let ptr = position >> self.of.log_sampling1;
            let high_pos = self.pointer1(ptr);
            let high_rank = ptr << self.of.log_sampling1;
            self.high = UnaryEnumerator::new(self.bv, self.of.upper_bits_offset + high_pos);
            self.high.skip(position - high_rank);
        }

        self.started = true;
        self.position = position;
        self.value = self.read_next();
        Ok((self.position, self.value))
    }

    fn next_geq(&mut self, lower_bound: u64) -> Posting {
        if lower_bound >= self.of.universe {
            return self.set_end();
        }

        let high_lower_bound = lower_bound >> self.of.lower_bits;

        if self.started && self.position < self.of.n && lower_bound > self.value {
            let cur_high = self.value >> self.of.lower_bits;
            let high_diff = high_lower_bound - cur_high;

            if high_diff <= LINEAR_SCAN_THRESHOLD {
                self.position += 1;
                return self.scan(lower_bound);
            }

            if (high_diff >> self.of.log_sampling0) == 0 {
                // The first zero after the current one is zero number cur_high + 1.
                let one_pos = self.of.upper_bits_offset + cur_high + self.position + 1;
                self.high = UnaryEnumerator::new(self.bv, one_pos + 1);
                self.high.skip0(high_diff - 1);
                return self.scan_from_zero(high_lower_bound, lower_bound);
            }
        }

        let ptr = high_lower_bound >> self.of.log_sampling0;
        let high_pos = self.pointer0(ptr);
        let high_rank0 = ptr << self.of.log_sampling0;
        self.high = UnaryEnumerator::new(self.bv, self.of.upper_bits_offset + high_pos);
        self.high.skip0(high_lower_bound - high_rank0);
        self.scan_from_zero(high_lower_bound, lower_bound)
    }

    fn next(&mut self) -> Posting {
        if self.started {
            if self.position >= self.of.n {
                return (self.of.n, self.of.universe);
            }
            self.position += 1;
        } else {
            self.started = true;
            self.position = 0;
        }

        self.value = if self.position < self.of.n {
            self.read_next()
        } else {
            self.of.universe
        };
        (self.position, self.value)
    }

    fn size(&self) -> u64 {
        self.of.n
    }

    fn prev_value(&self) -> Result<u64> {
        if self.started {
            Ok(self.value)
        } else {
            Err(Error::NoCurrentValue)
        }
    }
}
