//! Per-sequence choice between the three encodings.
//!
//! The chosen encoding is not written anywhere. Writer and reader both call
//! [`best_encoding`] on the same `(params, universe, n)` and get the same answer,
//! so data written with one set of parameters must be read with the same set.

use std::fmt;

use crate::all_ones::{self, AllOnesSequence};
use crate::bitvec::{BitVector, BitVectorBuilder};
use crate::elias_fano::{self, CompactEliasFano};
use crate::error::Result;
use crate::params::GlobalParameters;
use crate::ranked_bitvector::{self, CompactRankedBitvector};
use crate::sequence::{Posting, SequenceEncoding, SequenceEnumerator};

/// The encodings a sequence can be stored with, in tie-breaking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Encoding {
    /// [`CompactEliasFano`].
    EliasFano,
    /// [`CompactRankedBitvector`].
    RankedBitvector,
    /// [`AllOnesSequence`].
    AllOnes,
}

impl Encoding {
    /// Every encoding, in the order ties are broken.
    pub const ALL: [Encoding; 3] = [
        Encoding::EliasFano,
        Encoding::RankedBitvector,
        Encoding::AllOnes,
    ];

    /// Bits this encoding needs for `n` values below `universe`.
    pub fn bitsize(self, params: &GlobalParameters, universe: u64, n: u64) -> u64 {
        match self {
            Encoding::EliasFano => CompactEliasFano::bitsize(params, universe, n),
            Encoding::RankedBitvector => CompactRankedBitvector::bitsize(params, universe, n),
            Encoding::AllOnes => AllOnesSequence::bitsize(params, universe, n),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::EliasFano => "elias_fano",
            Encoding::RankedBitvector => "ranked_bitvector",
            Encoding::AllOnes => "all_ones",
        };
        f.write_str(name)
    }
}

/// Cheapest encoding for `n` values below `universe`, with its cost in bits.
///
/// Only the shape of the sequence matters, never its values. On equal cost the
/// earlier entry of [`Encoding::ALL`] wins.
///
/// # Examples
///
/// ```
/// use indexed_seq::{best_encoding, Encoding, GlobalParameters};
///
/// let params = GlobalParameters::default();
/// assert_eq!(best_encoding(&params, 1000, 1000), (Encoding::AllOnes, 0));
/// assert_eq!(best_encoding(&params, 1_000_000, 10).0, Encoding::EliasFano);
/// ```
pub fn best_encoding(params: &GlobalParameters, universe: u64, n: u64) -> (Encoding, u64) {
    let mut best = Encoding::EliasFano;
    let mut best_cost = best.bitsize(params, universe, n);
    for encoding in [Encoding::RankedBitvector, Encoding::AllOnes] {
        let cost = encoding.bitsize(params, universe, n);
        if cost < best_cost {
            best = encoding;
            best_cost = cost;
        }
    }
    (best, best_cost)
}

/// Encoding that stores each sequence with whichever of the three is cheapest.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexedSequence;

impl SequenceEncoding for IndexedSequence {
    type Enumerator<'a> = IndexedSequenceEnumerator<'a>;

    fn bitsize(params: &GlobalParameters, universe: u64, n: u64) -> u64 {
        best_encoding(params, universe, n).1
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
        params.validate()?;
        let (encoding, bits) = best_encoding(params, universe, n);
        log::trace!(
            "writing sequence: encoding={encoding} bits={bits} universe={universe} n={n} offset={}",
            builder.len()
        );
        match encoding {
            Encoding::EliasFano => CompactEliasFano::write(builder, values, universe, n, params),
            Encoding::RankedBitvector => {
                CompactRankedBitvector::write(builder, values, universe, n, params)
            }
            Encoding::AllOnes => AllOnesSequence::write(builder, values, universe, n, params),
        }
    }

    fn enumerator<'a>(
        bits: &'a BitVector,
        offset: u64,
        universe: u64,
        n: u64,
        params: &GlobalParameters,
    ) -> IndexedSequenceEnumerator<'a> {
        IndexedSequenceEnumerator::new(bits, offset, universe, n, params)
    }
}

/// Cursor over a sequence written by [`IndexedSequence`].
///
/// Holds exactly one concrete cursor, picked at construction and kept for the
/// cursor's lifetime. To read another sequence, build a new enumerator.
#[derive(Debug, Clone)]
pub enum IndexedSequenceEnumerator<'a> {
    /// Elias-Fano cursor.
    EliasFano(elias_fano::Enumerator<'a>),
    /// Ranked bitvector cursor.
    RankedBitvector(ranked_bitvector::Enumerator<'a>),
    /// All-ones cursor.
    AllOnes(all_ones::Enumerator),
}

macro_rules! dispatch {
    ($self:expr, $e:ident => $body:expr) => {
        match $self {
            IndexedSequenceEnumerator::EliasFano($e) => $body,
            IndexedSequenceEnumerator::RankedBitvector($e) => $body,
            IndexedSequenceEnumerator::AllOnes($e) => $body,
        }
    };
}

impl<'a> IndexedSequenceEnumerator<'a> {
    /// Bind to the sequence written at `offset`.
    ///
    /// `universe`, `n` and `params` must match the ones given to the writer.
    pub fn new(
        bits: &'a BitVector,
        offset: u64,
        universe: u64,
        n: u64,
        params: &GlobalParameters,
    ) -> Self {
        match best_encoding(params, universe, n).0 {
            Encoding::EliasFano => Self::EliasFano(CompactEliasFano::enumerator(
                bits, offset, universe, n, params,
            )),
            Encoding::RankedBitvector => Self::RankedBitvector(
                CompactRankedBitvector::enumerator(bits, offset, universe, n, params),
            ),
            Encoding::AllOnes => Self::AllOnes(AllOnesSequence::enumerator(
                bits, offset, universe, n, params,
            )),
        }
    }

    /// The encoding this cursor reads.
    pub fn encoding(&self) -> Encoding {
        match self {
            Self::EliasFano(_) => Encoding::EliasFano,
            Self::RankedBitvector(_) => Encoding::RankedBitvector,
            Self::AllOnes(_) => Encoding::AllOnes,
        }
    }
}

impl SequenceEnumerator for IndexedSequenceEnumerator<'_> {
    #[inline]
    fn move_to(&mut self, position: u64) -> Result<Posting> {
        dispatch!(self, e => e.move_to(position))
    }

    #[inline]
    fn next_geq(&mut self, lower_bound: u64) -> Posting {
        dispatch!(self, e => e.next_geq(lower_bound))
    }

    #[inline]
    fn next(&mut self) -> Posting {
        dispatch!(self, e => e.next())
    }

    #[inline]
    fn size(&self) -> u64 {
        dispatch!(self, e => e.size())
    }

    #[inline]
    fn prev_value(&self) -> Result<u64> {
        dispatch!(self, e => e.prev_value())
    }
}
