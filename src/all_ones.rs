//! The sequence `0, 1, ..., n - 1` with `n == universe`, stored in zero bits.
//!
//! Every element equals its own position, so the enumerator is plain
//! arithmetic and never touches the bitstream. Any other shape is
//! unrepresentable and costs `u64::MAX`, which keeps it out of the selection.

use crate::bitvec::{BitVector, BitVectorBuilder};
use crate::error::{Error, Result};
use crate::params::GlobalParameters;
use crate::sequence::{Posting, SequenceEncoding, SequenceEnumerator};

/// Encoding for sequences that contain every value of their universe.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllOnesSequence;

impl SequenceEncoding for AllOnesSequence {
    type Enumerator<'a> = Enumerator;

    fn bitsize(_params: &GlobalParameters, universe: u64, n: u64) -> u64 {
        if universe == n {
            0
        } else {
            u64::MAX
        }
    }

    fn write<I>(
        _builder: &mut BitVectorBuilder,
        values: I,
        universe: u64,
        n: u64,
        _params: &GlobalParameters,
    ) -> Result<()>
    where
        I: IntoIterator<Item = u64>,
    {
        if n != universe {
            return Err(Error::LengthMismatch {
                expected: universe,
                actual: n,
            });
        }
        let mut count = 0u64;
        for v in values.into_iter().take(n as usize) {
            if v != count {
                return Err(Error::NotAllOnes {
                    index: count,
                    value: v,
                });
            }
            count += 1;
        }
        if count < n {
            return Err(Error::LengthMismatch {
                expected: n,
                actual: count,
            });
        }
        Ok(())
    }

    fn enumerator<'a>(
        _bits: &'a BitVector,
        _offset: u64,
        universe: u64,
        n: u64,
        _params: &GlobalParameters,
    ) -> Enumerator {
        debug_assert_eq!(universe, n);
        Enumerator::new(universe)
    }
}

/// Cursor over an [`AllOnesSequence`]. Holds no reference to the bitstream.
#[derive(Debug, Clone, Copy)]
pub struct Enumerator {
    universe: u64,
    position: u64,
    started: bool,
}

impl Enumerator {
    /// Cursor over `0..universe`.
    pub fn new(universe: u64) -> Self {
        Self {
            universe,
            position: 0,
            started: false,
        }
    }

    fn land(&mut self, position: u64) -> Posting {
        self.started = true;
        self.position = position.min(self.universe);
        (self.position, self.position)
    }
}

impl SequenceEnumerator for Enumerator {
    fn move_to(&mut self, position: u64) -> Result<Posting> {
        if position >= self.universe {
            return Err(Error::PositionOutOfRange {
                position,
                size: self.universe,
            });
        }
        Ok(self.land(position))
    }

    fn next_geq(&mut self, lower_bound: u64) -> Posting {
        self.land(lower_bound)
    }

    fn next(&mut self) -> Posting {
        if self.started {
            let next = self.position.saturating_add(1);
            self.land(next)
        } else {
            self.land(0)
        }
    }

    fn size(&self) -> u64 {
        self.universe
    }

    fn prev_value(&self) -> Result<u64> {
        if self.started {
            Ok(self.position)
        } else {
            Err(Error::NoCurrentValue)
        }
    }
}
