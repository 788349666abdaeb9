//! Tuning knobs of a segment write, resolved before the first field is encoded.

use docvalues_bits::bitset::{MAX_RANK_POWER, MIN_RANK_POWER};
use docvalues_common::{Result, verify_arg};
use docvalues_encodings::{numeric::NumericPolicy, terms_dict::TermsDictPolicy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocValuesConfig {
    /// Minimum number of documents in a skip index leaf before it may be
    /// closed on a change of values.
    pub skip_index_interval_size: u32,

    /// Rank table granularity of dense presence blocks, `None` to write no
    /// rank tables.
    pub dense_rank_power: Option<u8>,

    /// Values per block of the multi-block numeric encoding, as a power of two.
    pub numeric_block_shift: u8,

    /// Values per block of monotonic address tables, as a power of two.
    pub monotonic_block_shift: u8,

    /// Terms per compressed term dictionary block, as a power of two.
    pub terms_dict_block_shift: u8,

    /// One term out of `1 << terms_dict_reverse_index_shift` is sampled into
    /// the reverse term index.
    pub terms_dict_reverse_index_shift: u8,

    /// The multi-block numeric encoding is chosen when its bit cost is at most
    /// this fraction of the single-width cost.
    pub multi_block_max_cost_ratio: f64,

    /// zstd level of the term dictionary blocks.
    pub terms_compression_level: i32,
}

impl DocValuesConfig {
    pub fn with_skip_index_interval_size(&self, size: u32) -> Self {
        let mut config = self.clone();
        config.skip_index_interval_size = size;
        config
    }

    pub fn with_dense_rank_power(&self, power: Option<u8>) -> Self {
        let mut config = self.clone();
        config.dense_rank_power = power;
        config
    }

    pub fn with_numeric_block_shift(&self, shift: u8) -> Self {
        let mut config = self.clone();
        config.numeric_block_shift = shift;
        config
    }

    pub fn with_monotonic_block_shift(&self, shift: u8) -> Self {
        let mut config = self.clone();
        config.monotonic_block_shift = shift;
        config
    }

    pub fn with_terms_dict_block_shift(&self, shift: u8) -> Self {
        let mut config = self.clone();
        config.terms_dict_block_shift = shift;
        config
    }

    pub fn with_terms_dict_reverse_index_shift(&self, shift: u8) -> Self {
        let mut config = self.clone();
        config.terms_dict_reverse_index_shift = shift;
        config
    }

    pub fn with_multi_block_max_cost_ratio(&self, ratio: f64) -> Self {
        let mut config = self.clone();
        config.multi_block_max_cost_ratio = ratio;
        config
    }

    pub fn with_terms_compression_level(&self, level: i32) -> Self {
        let mut config = self.clone();
        config.terms_compression_level = level;
        config
    }

    pub fn validate(&self) -> Result<()> {
        verify_arg!(skip_index_interval_size, self.skip_index_interval_size > 0);
        verify_arg!(
            dense_rank_power,
            self.dense_rank_power
                .is_none_or(|p| (MIN_RANK_POWER..=MAX_RANK_POWER).contains(&p))
        );
        verify_arg!(
            numeric_block_shift,
            (2..=30).contains(&self.numeric_block_shift)
        );
        verify_arg!(
            monotonic_block_shift,
            (2..=22).contains(&self.monotonic_block_shift)
        );
        verify_arg!(
            terms_dict_block_shift,
            (1..=12).contains(&self.terms_dict_block_shift)
        );
        verify_arg!(
            terms_dict_reverse_index_shift,
            (1..=20).contains(&self.terms_dict_reverse_index_shift)
        );
        verify_arg!(
            multi_block_max_cost_ratio,
            self.multi_block_max_cost_ratio.is_finite() && self.multi_block_max_cost_ratio >= 0.0
        );
        verify_arg!(
            terms_compression_level,
            zstd::compression_level_range().contains(&self.terms_compression_level)
        );
        Ok(())
    }

    pub fn numeric_policy(&self) -> NumericPolicy {
        NumericPolicy {
            block_shift: self.numeric_block_shift,
            max_block_cost_ratio: self.multi_block_max_cost_ratio,
        }
    }

    pub fn terms_dict_policy(&self) -> TermsDictPolicy {
        TermsDictPolicy {
            block_shift: self.terms_dict_block_shift,
            reverse_shift: self.terms_dict_reverse_index_shift,
            monotonic_block_shift: self.monotonic_block_shift,
            compression_level: self.terms_compression_level,
        }
    }
}

impl Default for DocValuesConfig {
    fn default() -> Self {
        Self {
            skip_index_interval_size: 4096,
            dense_rank_power: Some(9),
            numeric_block_shift: 14,
            monotonic_block_shift: 16,
            terms_dict_block_shift: 6,
            terms_dict_reverse_index_shift: 10,
            multi_block_max_cost_ratio: 0.9,
            terms_compression_level: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = DocValuesConfig::default();
        config.validate().unwrap();
        assert_eq!(config.numeric_policy().block_shift, 14);
        assert_eq!(config.terms_dict_policy(), TermsDictPolicy::default());
    }

    #[test]
    fn test_out_of_range_values() {
        let config = DocValuesConfig::default();
        for bad in [
            config.with_dense_rank_power(Some(6)),
            config.with_dense_rank_power(Some(16)),
            config.with_skip_index_interval_size(0),
            config.with_terms_dict_reverse_index_shift(0),
            config.with_terms_dict_block_shift(13),
            config.with_monotonic_block_shift(1),
            config.with_multi_block_max_cost_ratio(f64::NAN),
        ] {
            let err = bad.validate().unwrap_err();
            assert!(err.is_fatal(), "{bad:?}");
        }
        config.with_dense_rank_power(None).validate().unwrap();
    }

    #[test]
    fn test_partial_json() {
        let config: DocValuesConfig =
            serde_json::from_str(r#"{ "numeric_block_shift": 10, "dense_rank_power": null }"#)
                .unwrap();
        assert_eq!(config.numeric_block_shift, 10);
        assert_eq!(config.dense_rank_power, None);
        assert_eq!(config.terms_dict_block_shift, 6);
    }
}
