use crate::error::{BloomError, Result};
use crate::hash::{MAX_BIT_ARRAY_LEN, optimal_bit_array_len};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Construction parameters for a filter.
#[derive(Clone, Debug, PartialEq, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned")]
pub struct FilterConfig {
    /// Confidence that a positive answer is real, as a percentage in
    /// `(0, 100)`. `99` means a 1% false positive rate.
    #[builder(default = "95.0")]
    pub target_probability: f64,

    /// Number of items the filter is sized for
    #[builder(default = "1_000")]
    pub expected_items: u64,
}

impl FilterConfig {
    pub fn new(target_probability: f64, expected_items: u64) -> Self {
        Self {
            target_probability,
            expected_items,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let p = self.target_probability;
        if !p.is_finite() || p <= 0.0 || p >= 100.0 {
            return Err(BloomError::InvalidProbability { value: p });
        }
        Ok(())
    }

    /// False positive rate implied by the target probability.
    pub fn false_positive_rate(&self) -> f64 {
        (100.0 - self.target_probability) / 100.0
    }

    /// Validates the config and computes the bit array length.
    pub fn bit_array_len(&self) -> Result<u64> {
        self.validate()?;

        let bits =
            optimal_bit_array_len(self.expected_items, self.false_positive_rate());
        if bits == 0 {
            return Err(BloomError::EmptyBitArray {
                expected_items: self.expected_items,
            });
        }
        if bits > MAX_BIT_ARRAY_LEN {
            return Err(BloomError::BitArrayTooLarge { bits });
        }
        Ok(bits)
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::new(95.0, 1_000)
    }
}
