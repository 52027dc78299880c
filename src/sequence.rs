//! The contract shared by every sequence encoding.
//!
//! An encoding knows three things about an ascending sequence of `n` values
//! in `[0, universe)`: how many bits it would take (without looking at the
//! values), how to append it to a bitstream, and how to navigate it again from
//! the offset it was written at. The cursor conventions are identical across
//! encodings so the selecting encoding can swap one for another:
//!
//! - a fresh cursor sits before the first element, so `next()` yields position 0;
//! - the end of the sequence is the sentinel `(n, universe)`, and `next()` keeps
//!   returning it once reached;
//! - `next_geq(lb)` returns the first element of the sequence with
//!   `value >= lb`, or the sentinel;
//! - `move_to(p)` with `p >= n` is an error and leaves the cursor untouched.

use crate::bitvec::{BitVector, BitVectorBuilder};
use crate::error::Result;
use crate::params::GlobalParameters;

/// A `(position, value)` pair produced by an enumerator.
pub type Posting = (u64, u64);

/// A bit-level encoding for monotone sequences.
///
/// Every method expects parameters that pass [`GlobalParameters::validate`].
/// Writers check this and return [`Error::InvalidParameters`](crate::Error::InvalidParameters);
/// cost functions and enumerators only assert it in debug builds.
pub trait SequenceEncoding {
    /// Cursor type reading a sequence written by this encoding.
    type Enumerator<'a>: SequenceEnumerator;

    /// Bits needed to store any ascending sequence of `n` values below `universe`.
    ///
    /// Saturates at `u64::MAX` for shapes that cannot be laid out.
    fn bitsize(params: &GlobalParameters, universe: u64, n: u64) -> u64;

    /// Append the first `n` values of `values` to `builder`.
    ///
    /// On error the builder is left exactly as it was.
    fn write<I>(
        builder: &mut BitVectorBuilder,
        values: I,
        universe: u64,
        n: u64,
        params: &GlobalParameters,
    ) -> Result<()>
    where
        I: IntoIterator<Item = u64>;

    /// Bind a cursor to a sequence written at `offset`.
    ///
    /// `universe`, `n` and `params` must be the ones the sequence was written with.
    fn enumerator<'a>(
        bits: &'a BitVector,
        offset: u64,
        universe: u64,
        n: u64,
        params: &GlobalParameters,
    ) -> Self::Enumerator<'a>;
}

/// Navigation over an encoded sequence.
pub trait SequenceEnumerator {
    /// Jump to the element at `position`.
    fn move_to(&mut self, position: u64) -> Result<Posting>;

    /// First element with `value >= lower_bound`, or `(size, universe)` if none.
    fn next_geq(&mut self, lower_bound: u64) -> Posting;

    /// Advance one element, or stay on `(size, universe)` at the end.
    fn next(&mut self) -> Posting;

    /// Number of elements.
    fn size(&self) -> u64;

    /// The value last returned by `move_to`, `next_geq` or `next`.
    fn prev_value(&self) -> Result<u64>;

    /// Iterate over the remaining postings, stopping before the sentinel.
    fn postings(self) -> Postings<Self>
    where
        Self: Sized,
    {
        Postings {
            inner: self,
            done: false,
        }
    }
}

/// Iterator adapter returned by [`SequenceEnumerator::postings`].
#[derive(Debug, Clone)]
pub struct Postings<E> {
    inner: E,
    done: bool,
}

impl<E> Postings<E> {
    /// Recover the underlying enumerator.
    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: SequenceEnumerator> Iterator for Postings<E> {
    type Item = Posting;

    fn next(&mut self) -> Option<Posting> {
        if self.done {
            return None;
        }
        let (position, value) = SequenceEnumerator::next(&mut self.inner);
        if position >= self.inner.size() {
            self.done = true;
            return None;
        }
        Some((position, value))
    }
}
