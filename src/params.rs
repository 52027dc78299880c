//! Sampling parameters shared by every encoding of an index.
//!
//! The parameters take part in the cost model, so the exact same values must be
//! used to write a sequence and to read it back: the chosen encoding is never
//! stored, it is recomputed from `(params, universe, n)`.

use crate::error::{Error, Result};

/// Largest accepted log2 sampling rate.
pub const MAX_LOG_SAMPLING: u8 = 30;

/// Sampling densities for the rank/select side structures of each encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalParameters {
    /// Elias-Fano: one pointer every `2^ef_log_sampling0` zeros of the upper bits.
    pub ef_log_sampling0: u8,
    /// Elias-Fano: one pointer every `2^ef_log_sampling1` ones of the upper bits.
    pub ef_log_sampling1: u8,
    /// Ranked bitvector: one rank sample every `2^rb_log_rank1_sampling` bits.
    pub rb_log_rank1_sampling: u8,
    /// Ranked bitvector: one position pointer every `2^rb_log_sampling1` elements.
    pub rb_log_sampling1: u8,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            ef_log_sampling0: 9,
            ef_log_sampling1: 8,
            rb_log_rank1_sampling: 9,
            rb_log_sampling1: 8,
        }
    }
}

impl GlobalParameters {
    /// Default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the Elias-Fano pointer sampling rates.
    #[must_use]
    pub fn with_ef_sampling(mut self, log_sampling0: u8, log_sampling1: u8) -> Self {
        self.ef_log_sampling0 = log_sampling0;
        self.ef_log_sampling1 = log_sampling1;
        self
    }

    /// Override the ranked bitvector sampling rates.
    #[must_use]
    pub fn with_rb_sampling(mut self, log_rank1_sampling: u8, log_sampling1: u8) -> Self {
        self.rb_log_rank1_sampling = log_rank1_sampling;
        self.rb_log_sampling1 = log_sampling1;
        self
    }

    /// Check that every sampling rate is in `1..=MAX_LOG_SAMPLING`.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("ef_log_sampling0", self.ef_log_sampling0),
            ("ef_log_sampling1", self.ef_log_sampling1),
            ("rb_log_rank1_sampling", self.rb_log_rank1_sampling),
            ("rb_log_sampling1", self.rb_log_sampling1),
        ];
        for (name, value) in fields {
            if value == 0 || value > MAX_LOG_SAMPLING {
                return Err(Error::InvalidParameters(format!(
                    "{name} must be in 1..={MAX_LOG_SAMPLING}, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let params = GlobalParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.ef_log_sampling0, 9);
        assert_eq!(params.rb_log_sampling1, 8);
    }

    #[test]
    fn builder_overrides() {
        let params = GlobalParameters::new()
            .with_ef_sampling(4, 3)
            .with_rb_sampling(5, 2);
        assert_eq!(params.ef_log_sampling0, 4);
        assert_eq!(params.ef_log_sampling1, 3);
        assert_eq!(params.rb_log_rank1_sampling, 5);
        assert_eq!(params.rb_log_sampling1, 2);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_sampling() {
        let zero = GlobalParameters::new().with_ef_sampling(0, 8);
        assert!(matches!(zero.validate(), Err(Error::InvalidParameters(_))));

        let huge = GlobalParameters::new().with_rb_sampling(9, 40);
        assert!(matches!(huge.validate(), Err(Error::InvalidParameters(_))));
    }
}
