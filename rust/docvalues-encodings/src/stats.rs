//! Single-pass statistics over the values of a field, driving the numeric
//! encoding decision.

use ahash::AHashSet;
use docvalues_bits::packed::bits_per_value_for;
use docvalues_common::{Result, verify_contract};

use crate::values::SortedNumericProducer;

/// Distinct values are tracked only while their number stays at or below this
/// limit.
pub const MAX_UNIQUE_VALUES: usize = 256;

/// Min/max/count summary of a run of values, together with the bit cost of all
/// finished runs.
///
/// `MinMax` is an immutable snapshot: every update returns a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinMax {
    pub min: i64,
    pub max: i64,
    pub count: u64,
    /// Sum of `bits(max - min) * count` over the finished runs with `max > min`.
    pub space_in_bits: u64,
}

impl MinMax {
    pub const EMPTY: MinMax = MinMax {
        min: i64::MAX,
        max: i64::MIN,
        count: 0,
        space_in_bits: 0,
    };

    pub fn with_value(self, value: i64) -> MinMax {
        MinMax {
            min: self.min.min(value),
            max: self.max.max(value),
            count: self.count + 1,
            ..self
        }
    }

    /// Accounts the bit cost of the current run.
    pub fn finish(self) -> MinMax {
        if self.max > self.min {
            let bits = bits_per_value_for((self.max as u64).wrapping_sub(self.min as u64)) as u64;
            MinMax {
                space_in_bits: self.space_in_bits + bits * self.count,
                ..self
            }
        } else {
            self
        }
    }

    /// Finishes the current run and starts an empty one, keeping the cost.
    pub fn next_block(self) -> MinMax {
        MinMax {
            space_in_bits: self.finish().space_in_bits,
            ..MinMax::EMPTY
        }
    }
}

impl Default for MinMax {
    fn default() -> Self {
        MinMax::EMPTY
    }
}

/// Statistics of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericStats {
    pub num_docs_with_value: u64,
    pub num_values: u64,
    /// Minimum value; `i64::MAX` when the field has no values.
    pub min: i64,
    /// Maximum value; `i64::MIN` when the field has no values.
    pub max: i64,
    /// Greatest common divisor of `value - first_value` over all values. It is
    /// 1 when every value is equal or when a value is too extreme for the
    /// subtraction to be safe.
    pub gcd: i64,
    /// Sorted distinct values, when there are at most [`MAX_UNIQUE_VALUES`].
    pub unique_values: Option<Vec<i64>>,
    /// Bit cost of packing all values at one global width.
    pub space_in_bits: u64,
    /// Bit cost of packing every block at its own width.
    pub block_space_in_bits: u64,
}

impl NumericStats {
    pub fn is_empty(&self) -> bool {
        self.num_values == 0
    }
}

/// Running state of the statistics pass.
pub struct StatsCollector {
    max_doc: u32,
    block_size: u64,
    global: MinMax,
    block: MinMax,
    first_value: Option<i64>,
    gcd: i64,
    unique_values: Option<AHashSet<i64>>,
    num_docs_with_value: u64,
    last_doc: Option<u32>,
}

impl StatsCollector {
    pub fn new(max_doc: u32, block_shift: u8) -> StatsCollector {
        StatsCollector {
            max_doc,
            block_size: 1 << block_shift,
            global: MinMax::EMPTY,
            block: MinMax::EMPTY,
            first_value: None,
            gcd: 0,
            unique_values: Some(AHashSet::new()),
            num_docs_with_value: 0,
            last_doc: None,
        }
    }

    pub fn add_doc(&mut self, doc: u32) -> Result<()> {
        verify_contract!(doc_id, doc < self.max_doc);
        verify_contract!(
            doc_order,
            self.last_doc.is_none_or(|last| doc > last)
        );
        self.last_doc = Some(doc);
        self.num_docs_with_value += 1;
        Ok(())
    }

    pub fn add_value(&mut self, value: i64) {
        if self.gcd != 1 {
            if !(i64::MIN / 2..=i64::MAX / 2).contains(&value) {
                self.gcd = 1;
            } else if let Some(first) = self.first_value {
                self.gcd = gcd(self.gcd, value - first);
            }
        }
        self.first_value.get_or_insert(value);

        self.global = self.global.with_value(value);
        self.block = self.block.with_value(value);
        if self.global.count % self.block_size == 0 {
            self.block = self.block.next_block();
        }

        if let Some(unique) = self.unique_values.as_mut() {
            if unique.insert(value) && unique.len() > MAX_UNIQUE_VALUES {
                self.unique_values = None;
            }
        }
    }

    pub fn finish(self) -> NumericStats {
        let global = self.global.finish();
        let block = self.block.finish();
        let unique_values = self.unique_values.map(|set| {
            let mut values: Vec<i64> = set.into_iter().collect();
            values.sort_unstable();
            values
        });
        NumericStats {
            num_docs_with_value: self.num_docs_with_value,
            num_values: global.count,
            min: global.min,
            max: global.max,
            gcd: if self.gcd == 0 { 1 } else { self.gcd },
            unique_values,
            space_in_bits: global.space_in_bits,
            block_space_in_bits: block.space_in_bits,
        }
    }
}

/// Runs the statistics pass over a fresh cursor of `producer`.
pub fn collect(
    producer: &dyn SortedNumericProducer,
    max_doc: u32,
    block_shift: u8,
) -> Result<NumericStats> {
    let mut collector = StatsCollector::new(max_doc, block_shift);
    let mut cursor = producer.cursor()?;
    while let Some(doc) = cursor.next_doc()? {
        collector.add_doc(doc)?;
        let count = cursor.value_count();
        verify_contract!(value_count, count > 0);
        for _ in 0..count {
            collector.add_value(cursor.next_value()?);
        }
    }
    Ok(collector.finish())
}

/// Greatest common divisor of two values whose difference-based inputs are known
/// not to overflow; the result is non-negative.
pub fn gcd(a: i64, b: i64) -> i64 {
    let mut a = a.unsigned_abs();
    let mut b = b.unsigned_abs();
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_of(values: &[i64]) -> NumericStats {
        let mut collector = StatsCollector::new(values.len() as u32, 14);
        for (doc, &v) in values.iter().enumerate() {
            collector.add_doc(doc as u32).unwrap();
            collector.add_value(v);
        }
        collector.finish()
    }

    #[test]
    fn test_min_max_snapshot() {
        let run = MinMax::EMPTY.with_value(3).with_value(-1).with_value(7);
        assert_eq!((run.min, run.max, run.count), (-1, 7, 3));
        assert_eq!(run.space_in_bits, 0);
        assert_eq!(run.finish().space_in_bits, 4 * 3);

        let next = run.next_block();
        assert_eq!(next.count, 0);
        assert_eq!(next.space_in_bits, 12);
        assert_eq!(next.with_value(5).finish().space_in_bits, 12);
    }

    #[test]
    fn test_gcd() {
        let stats = stats_of(&[10, 20, 40, 100]);
        assert_eq!(stats.gcd, 10);
        assert_eq!(stats.min, 10);
        assert_eq!(stats.max, 100);

        let stats = stats_of(&[10, 20, i64::MAX - 10]);
        assert_eq!(stats.gcd, 1);

        let stats = stats_of(&[7, 7, 7]);
        assert_eq!(stats.gcd, 1);

        assert_eq!(gcd(0, -12), 12);
        assert_eq!(gcd(18, 12), 6);
    }

    #[test]
    fn test_unique_values_limit() {
        let values: Vec<i64> = (0..256).map(|i| i * 1_000_000_007).rev().collect();
        let stats = stats_of(&values);
        let unique = stats.unique_values.unwrap();
        assert_eq!(unique.len(), 256);
        assert!(unique.windows(2).all(|w| w[0] < w[1]));

        let values: Vec<i64> = (0..257).collect();
        assert!(stats_of(&values).unique_values.is_none());
    }

    #[test]
    fn test_block_space() {
        let mut values = vec![0i64; 1 << 14];
        values.extend(std::iter::repeat_n(1_000_000, 1 << 14));
        values[1] = 1;
        let stats = stats_of(&values);
        assert_eq!(stats.block_space_in_bits, 1 << 14);
        assert_eq!(stats.space_in_bits, 20 * (1 << 15));
    }

    #[test]
    fn test_doc_contract() {
        let mut collector = StatsCollector::new(10, 14);
        collector.add_doc(3).unwrap();
        assert!(collector.add_doc(3).unwrap_err().is_fatal());
        assert!(collector.add_doc(10).unwrap_err().is_fatal());
    }
}
