//! Error types for indexed sequence encoding and navigation.

use thiserror::Error;

/// Error variants for sequence writers, enumerators and collections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// `move_to` was asked for a position at or past the end of the sequence.
    #[error("position {position} out of range for sequence of size {size}")]
    PositionOutOfRange {
        /// Requested position.
        position: u64,
        /// Number of elements in the sequence.
        size: u64,
    },

    /// `prev_value` was called on an enumerator that has not produced a value yet.
    #[error("enumerator has not been advanced")]
    NoCurrentValue,

    /// Writer input was not ascending.
    #[error("sequence is not sorted at index {index}: prev={prev}, next={next}")]
    NotSorted {
        /// Index of the offending value.
        index: u64,
        /// Value preceding it.
        prev: u64,
        /// Offending value (smaller than `prev`).
        next: u64,
    },

    /// Writer input repeated a value where the encoding needs strictly increasing input.
    #[error("duplicate element {value} at index {index}")]
    DuplicateElement {
        /// Index of the repeated value.
        index: u64,
        /// The repeated value.
        value: u64,
    },

    /// Writer input contained a value outside `[0, universe)`.
    #[error("value {value} at index {index} is outside universe {universe}")]
    ValueOutOfUniverse {
        /// Index of the offending value.
        index: u64,
        /// Offending value.
        value: u64,
        /// Exclusive upper bound of the sequence.
        universe: u64,
    },

    /// The value iterator ran out before producing `n` values.
    #[error("expected {expected} values, got {actual}")]
    LengthMismatch {
        /// Declared cardinality.
        expected: u64,
        /// Number of values actually produced.
        actual: u64,
    },

    /// The all-ones encoding only stores the identity sequence `0..universe`.
    #[error("all-ones sequence expects value {index} at index {index}, found {value}")]
    NotAllOnes {
        /// Index of the offending value.
        index: u64,
        /// Offending value.
        value: u64,
    },

    /// The layout for this shape does not fit in a 64-bit bit offset.
    #[error("sequence of {n} values in universe {universe} is too large to encode")]
    SequenceTooLarge {
        /// Exclusive upper bound of the sequence.
        universe: u64,
        /// Declared cardinality.
        n: u64,
    },

    /// A collection lookup was past its last sequence.
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Global parameters failed validation.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Bits that should hold a framing code could not be decoded.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
}

/// A specialized Result type for sequence operations.
pub type Result<T> = std::result::Result<T, Error>;
