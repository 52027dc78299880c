//! Plain bitmap over the universe with sampled ranks and positions.
//!
//! Costs about `universe` bits regardless of `n`, so it wins over Elias-Fano
//! once the sequence covers a large fraction of its universe.
//!
//! # Layout
//!
//! ```text
//! [rank samples][position pointers][universe bits]
//! ```
//!
//! - Rank sample `k - 1` holds the number of elements below
//!   `k << rb_log_rank1_sampling`, in `ceil_log2(n + 1)` bits.
//! - Position pointer `k - 1` holds the value of element
//!   `k << rb_log_sampling1`, in `ceil_log2(universe)` bits.

use crate::bitvec::{ceil_log2, BitVector, BitVectorBuilder, UnaryEnumerator};
use crate::error::{Error, Result};
use crate::params::GlobalParameters;
use crate::sequence::{Posting, SequenceEncoding, SequenceEnumerator};

/// Value distance below which `next_geq` walks the set bits one by one.
const LINEAR_SCAN_THRESHOLD: u64 = 8;

#[derive(Debug, Clone, Copy)]
struct Offsets {
    universe: u64,
    n: u64,
    log_rank1_sampling: u32,
    log_sampling1: u32,

    rank1_sample_size: usize,
    pointer_size: usize,
    rank1_samples: u64,

    rank1_samples_offset: u64,
    pointers1_offset: u64,
    bits_offset: u64,
    end: u64,
}

impl Offsets {
    /// Offsets saturate at `u64::MAX`, which marks a layout that cannot be written.
    fn new(base: u64, universe: u64, n: u64, params: &GlobalParameters) -> Self {
        debug_assert!(params.validate().is_ok());
        let log_rank1_sampling = params.rb_log_rank1_sampling as u32;
        let log_sampling1 = params.rb_log_sampling1 as u32;

        let rank1_sample_size = ceil_log2(n.saturating_add(1)) as usize;
        let pointer_size = ceil_log2(universe) as usize;
        let rank1_samples = universe >> log_rank1_sampling;
        let pointers1 = n >> log_sampling1;

        let rank1_samples_offset = base;
        let pointers1_offset = rank1_samples_offset
            .saturating_add(rank1_samples.saturating_mul(rank1_sample_size as u64));
        let bits_offset =
            pointers1_offset.saturating_add(pointers1.saturating_mul(pointer_size as u64));
        let end = bits_offset.saturating_add(universe);

        Self {
            universe,
            n,
            log_rank1_sampling,
            log_sampling1,
            rank1_sample_size,
            pointer_size,
            rank1_samples,
            rank1_samples_offset,
            pointers1_offset,
            bits_offset,
            end,
        }
    }

    fn rank1_sample_offset(&self, k: u64) -> u64 {
        debug_assert!(k >= 1 && k <= self.rank1_samples);
        self.rank1_samples_offset + (k - 1) * self.rank1_sample_size as u64
    }

    fn pointer1_offset(&self, k: u64) -> u64 {
        debug_assert!(k >= 1);
        self.pointers1_offset + (k - 1) * self.pointer_size as u64
    }
}

/// Bitmap with one set bit per element. Requires strictly increasing input.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactRankedBitvector;

impl CompactRankedBitvector {
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
        let mut next_rank1_sample = 1u64;
        let mut last = 0u64;
        let mut count = 0u64;

        for v in values.into_iter().take(n as usize) {
            let i = count;
            if i > 0 && v == last {
                return Err(Error::DuplicateElement { index: i, value: v });
            }
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

            builder.set(of.bits_offset + v, true);

            if i > 0 && (i & sample1_mask) == 0 {
                let ptr1 = i >> of.log_sampling1;
                builder.set_bits(of.pointer1_offset(ptr1), v, of.pointer_size);
            }

            // every sample boundary in (last, v] sees exactly i elements below it
            while next_rank1_sample <= of.rank1_samples
                && (next_rank1_sample << of.log_rank1_sampling) <= v
            {
                builder.set_bits(
                    of.rank1_sample_offset(next_rank1_sample),
                    i,
                    of.rank1_sample_size,
                );
                next_rank1_sample += 1;
            }

            last = v;
            count += 1;
        }

        if count < n {
            return Err(Error::LengthMismatch {
                expected: n,
                actual: count,
            });
        }

        while next_rank1_sample <= of.rank1_samples {
            builder.set_bits(
                of.rank1_sample_offset(next_rank1_sample),
                n,
                of.rank1_sample_size,
            );
            next_rank1_sample += 1;
        }
        Ok(())
    }
}

impl SequenceEncoding for CompactRankedBitvector {
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

/// Cursor over a [`CompactRankedBitvector`] sequence.
#[derive(Debug, Clone)]
pub struct Enumerator<'a> {
    bv: &'a BitVector,
    of: Offsets,
    // Sits just past the bit of the element at `position` once started.
    bits: UnaryEnumerator<'a>,
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
            bits: UnaryEnumerator::new(bv, of.bits_offset),
            of,
            position: 0,
            value: 0,
            started: false,
        }
    }

    #[inline]
    fn read_next(&mut self) -> u64 {
        self.bits.next() - self.of.bits_offset
    }

    fn pointer1(&self, k: u64) -> u64 {
        if k == 0 {
            0
        } else {
            self.bv
                .get_bits(self.of.pointer1_offset(k), self.of.pointer_size)
        }
    }

    /// Number of elements below `value`.
    fn rank1(&self, value: u64) -> u64 {
        let k = value >> self.of.log_rank1_sampling;
        let sampled = if k == 0 {
            0
        } else {
            self.bv
                .get_bits(self.of.rank1_sample_offset(k), self.of.rank1_sample_size)
        };
        let from = self.of.bits_offset + (k << self.of.log_rank1_sampling);
        sampled + self.bv.count_ones(from, self.of.bits_offset + value)
    }

    fn set_end(&mut self) -> Posting {
        self.started = true;
        self.position = self.of.n;
        self.value = self.of.universe;
        (self.position, self.value)
    }

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
            self.bits.skip(skip - 1);
        } else {
            let ptr = position >> self.of.log_sampling1;
            let start = self.of.bits_offset + self.pointer1(ptr);
            self.bits = UnaryEnumerator::new(self.bv, start);
            self.bits.skip(position - (ptr << self.of.log_sampling1));
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

        if self.started
            && self.position < self.of.n
            && lower_bound > self.value
            && lower_bound - self.value <= LINEAR_SCAN_THRESHOLD
        {
            self.position += 1;
            return self.scan(lower_bound);
        }

        let rank = self.rank1(lower_bound);
        if rank >= self.of.n {
            return self.set_end();
        }
        self.started = true;
        self.position = rank;
        self.bits = UnaryEnumerator::new(self.bv, self.of.bits_offset + lower_bound);
        self.value = self.read_next();
        (self.position, self.value)
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
