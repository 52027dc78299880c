//! # Indexed Monotone Sequences
//!
//! *Each posting list stored with whichever succinct encoding is smallest.*
//!
//! ## Intuition First
//!
//! An inverted index holds millions of sorted lists of document ids. Some are
//! tiny and spread across the whole collection ("zygote" appears in 3 documents),
//! some cover most of it ("the" appears almost everywhere), and a few cover all
//! of it. No single encoding is best for all three shapes:
//!
//! - sparse lists want Elias-Fano, which pays about $2 + \log_2(U/n)$ bits per element;
//! - dense lists want a plain bitmap, which pays about one bit per *possible* value;
//! - a list containing every value needs no bits at all.
//!
//! Because the cost of each encoding depends only on the universe $U$ and the
//! length $n$, the choice can be recomputed at read time instead of stored.
//!
//! ## Historical Context
//!
//! ```text
//! 1974  Elias       Static file storage: monotone sequences in n(2 + log U/n) bits
//! 1989  Jacobson    Rank/select on plain bitmaps with o(n) extra space
//! 2013  Vigna       Quasi-succinct indices: Elias-Fano for posting lists
//! 2014  Ottaviano   Partitioned Elias-Fano: per-chunk choice between EF,
//!                   bitmap and implicit encodings
//! ```
//!
//! ## Mathematical Formulation
//!
//! For a sequence of $n$ values in $[0, U)$ the information-theoretic minimum is
//! $\log_2 \binom{U}{n}$ bits. The three encodings cost roughly:
//!
//! | Encoding | Bits |
//! |----------|------|
//! | [`CompactEliasFano`] | $n \lfloor \log_2(U/n) \rfloor + n + U/2^{\lfloor \log_2(U/n) \rfloor}$ + pointers |
//! | [`CompactRankedBitvector`] | $U$ + rank samples + pointers |
//! | [`AllOnesSequence`] | $0$ if $n = U$, unrepresentable otherwise |
//!
//! [`best_encoding`] picks the minimum, breaking ties in that order.
//!
//! ## What Could Go Wrong
//!
//! 1. **Parameter drift**: nothing in the bitstream says which encoding was used.
//!    Reading with different [`GlobalParameters`] than were used for writing
//!    silently decodes garbage.
//! 2. **Caller-owned metadata**: `universe`, `n` and the bit offset of each
//!    sequence must be stored by the caller. [`SequenceCollection`] does this for
//!    the common case of many lists over one universe.
//!
//! ## Example
//!
//! ```
//! use indexed_seq::{
//!     BitVectorBuilder, GlobalParameters, IndexedSequence, IndexedSequenceEnumerator,
//!     SequenceEncoding, SequenceEnumerator,
//! };
//!
//! let params = GlobalParameters::default();
//! let values = [2u64, 3, 5, 7, 11, 13];
//!
//! let mut builder = BitVectorBuilder::new();
//! let offset = builder.len();
//! IndexedSequence::write(&mut builder, values.iter().copied(), 20, 6, &params)?;
//! let bits = builder.build();
//!
//! let mut e = IndexedSequenceEnumerator::new(&bits, offset, 20, 6, &params);
//! assert_eq!(e.next_geq(6), (3, 7));
//! assert_eq!(e.move_to(5)?, (5, 13));
//! assert_eq!(e.next(), (6, 20));
//! # Ok::<(), indexed_seq::Error>(())
//! ```
//!
//! ## References
//!
//! - Elias, P. (1974). "Efficient storage and retrieval by content and address of static files."
//! - Vigna, S. (2013). "Quasi-succinct indices."
//! - Ottaviano, G., & Venturini, R. (2014). "Partitioned Elias-Fano indexes."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod all_ones;
pub mod bitvec;
pub mod collection;
pub mod elias_fano;
pub mod error;
pub mod indexed_sequence;
pub mod params;
pub mod ranked_bitvector;
pub mod sequence;

pub use all_ones::AllOnesSequence;
pub use bitvec::{BitVector, BitVectorBuilder};
pub use collection::{SequenceCollection, SequenceCollectionBuilder};
pub use elias_fano::CompactEliasFano;
pub use error::{Error, Result};
pub use indexed_sequence::{best_encoding, Encoding, IndexedSequence, IndexedSequenceEnumerator};
pub use params::GlobalParameters;
pub use ranked_bitvector::CompactRankedBitvector;
pub use sequence::{Posting, Postings, SequenceEncoding, SequenceEnumerator};
