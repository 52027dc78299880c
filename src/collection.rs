//! Many sequences over one universe, packed back-to-back in a single bit vector.
//!
//! Each sequence is stored as the gamma code of its length followed by its
//! [`IndexedSequence`] encoding. The start offsets are themselves a monotone
//! sequence and are kept in a separate [`CompactEliasFano`] stream, so finding
//! sequence `i` is one `move_to` plus one gamma decode.

use crate::bitvec::{BitVector, BitVectorBuilder};
use crate::elias_fano::{self, CompactEliasFano};
use crate::error::{Error, Result};
use crate::indexed_sequence::{IndexedSequence, IndexedSequenceEnumerator};
use crate::params::GlobalParameters;
use crate::sequence::{SequenceEncoding, SequenceEnumerator};

/// Builder for a [`SequenceCollection`].
#[derive(Debug, Clone)]
pub struct SequenceCollectionBuilder {
    universe: u64,
    params: GlobalParameters,
    bits: BitVectorBuilder,
    starts: Vec<u64>,
}

impl SequenceCollectionBuilder {
    /// Start an empty collection whose sequences all take values below `universe`.
    pub fn new(universe: u64, params: GlobalParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            universe,
            params,
            bits: BitVectorBuilder::new(),
            starts: Vec::new(),
        })
    }

    /// Append a sequence of `n` ascending values.
    ///
    /// A rejected sequence leaves the builder as it was.
    pub fn add_sequence<I>(&mut self, values: I, n: u64) -> Result<()>
    where
        I: IntoIterator<Item = u64>,
    {
        let start = self.bits.len();
        self.bits.append_gamma(n);
        if let Err(e) =
            IndexedSequence::write(&mut self.bits, values, self.universe, n, &self.params)
        {
            self.bits.truncate(start);
            return Err(e);
        }
        self.starts.push(start);
        Ok(())
    }

    /// Number of sequences added so far.
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// Return true if no sequence has been added.
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Freeze the collection.
    pub fn build(self) -> Result<SequenceCollection> {
        let total_bits = self.bits.len();
        let count = self.starts.len() as u64;

        let mut endpoints = BitVectorBuilder::new();
        CompactEliasFano::write(
            &mut endpoints,
            self.starts.iter().copied(),
            total_bits,
            count,
            &self.params,
        )?;

        log::debug!(
            "built sequence collection: sequences={count} universe={} bits={total_bits} endpoint_bits={}",
            self.universe,
            endpoints.len()
        );

        Ok(SequenceCollection {
            universe: self.universe,
            params: self.params,
            bits: self.bits.build(),
            endpoints: endpoints.build(),
            total_bits,
            len: self.starts.len(),
        })
    }
}

/// Read-only set of sequences sharing one universe.
///
/// # Examples
///
/// ```
/// use indexed_seq::{GlobalParameters, SequenceCollectionBuilder, SequenceEnumerator};
///
/// let mut builder = SequenceCollectionBuilder::new(100, GlobalParameters::default())?;
/// builder.add_sequence([3u64, 17, 42], 3)?;
/// builder.add_sequence(0..100u64, 100)?;
/// let collection = builder.build()?;
///
/// let mut e = collection.get(0)?;
/// assert_eq!(e.next_geq(10), (1, 17));
/// assert_eq!(collection.get(1)?.size(), 100);
/// # Ok::<(), indexed_seq::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SequenceCollection {
    universe: u64,
    params: GlobalParameters,
    bits: BitVector,
    endpoints: BitVector,
    total_bits: u64,
    len: usize,
}

impl SequenceCollection {
    /// Number of sequences.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if the collection holds no sequence.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Exclusive upper bound shared by every sequence.
    pub fn universe(&self) -> u64 {
        self.universe
    }

    /// Parameters every sequence was written with.
    pub fn params(&self) -> &GlobalParameters {
        &self.params
    }

    /// The bit vector holding the sequences.
    pub fn bits(&self) -> &BitVector {
        &self.bits
    }

    /// Approximate heap memory usage in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.bits.heap_bytes() + self.endpoints.heap_bytes()
    }

    /// Cursor over sequence `i`.
    pub fn get(&self, i: usize) -> Result<IndexedSequenceEnumerator<'_>> {
        if i >= self.len {
            return Err(Error::IndexOutOfBounds(i));
        }
        let mut starts = elias_fano::Enumerator::new(
            &self.endpoints,
            0,
            self.total_bits,
            self.len as u64,
            &self.params,
        );
        let (_, start) = starts.move_to(i as u64)?;
        let (n, offset) = self.bits.read_gamma(start)?;
        if n > self.universe {
            return Err(Error::InvalidEncoding(format!(
                "sequence {i} claims {n} elements in universe {}",
                self.universe
            )));
        }
        Ok(IndexedSequenceEnumerator::new(
            &self.bits,
            offset,
            self.universe,
            n,
            &self.params,
        ))
    }
}
