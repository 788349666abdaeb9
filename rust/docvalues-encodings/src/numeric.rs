//! Adaptive encoding of integer values.
//!
//! Exactly one scheme is chosen per field from its statistics, in this order:
//!
//! 1. constant: all values equal, nothing is written to the data stream;
//! 2. table: at most 256 distinct values whose table index needs fewer bits
//!    than the value range;
//! 3. multi-block: every block of `1 << block_shift` values packed at its own
//!    width, when that saves enough bits over one global width;
//! 4. single block: `(value - min) / gcd` packed at one global width.
//!
//! Meta record:
//!
//! ```text
//! i64 num_values
//! i32 mode            table size (>= 0), -1 single width, -2 - block_shift multi-block
//! i64 table[size]     table mode only
//! u8  bits_per_value  0xFF for multi-block
//! i64 min
//! i64 gcd
//! i64 values_offset
//! i64 values_length
//! i64 jump_table_offset   multi-block only, -1 otherwise
//! ```
//!
//! Multi-block data: per block either `u8 0, i64 value` (all values equal) or
//! `u8 bits_per_value, i64 min, u32 packed_len, packed bytes`; then one `i64`
//! absolute data offset per block, then the offset of that table.

use ahash::AHashMap;
use byteorder::{LE, WriteBytesExt};
use docvalues_bits::{
    PackedReader, PackedWriter,
    packed::{SUPPORTED_BITS_PER_VALUE, bits_per_value_for, packed_len},
};
use docvalues_common::{Result, verify_contract, verify_data};
use docvalues_io::{ArtifactWriter, DataInput};

use crate::{stats::NumericStats, values::SortedNumericProducer};

const SINGLE_WIDTH_MODE: i32 = -1;
const MULTI_BLOCK_BITS_PER_VALUE: u8 = 0xFF;

/// Tuning knobs of the scheme selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericPolicy {
    pub block_shift: u8,
    /// Multi-block is chosen when its bit cost is at most this fraction of the
    /// single-width cost.
    pub max_block_cost_ratio: f64,
}

impl Default for NumericPolicy {
    fn default() -> Self {
        NumericPolicy {
            block_shift: 14,
            max_block_cost_ratio: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericEncoding {
    Constant {
        value: i64,
    },
    Table {
        values: Vec<i64>,
        bits_per_value: u8,
    },
    MultiBlock {
        block_shift: u8,
        gcd: i64,
    },
    SingleBlock {
        min: i64,
        gcd: i64,
        bits_per_value: u8,
    },
}

impl NumericEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            NumericEncoding::Constant { .. } => "constant",
            NumericEncoding::Table { .. } => "table",
            NumericEncoding::MultiBlock { .. } => "multi-block",
            NumericEncoding::SingleBlock { .. } => "single-block",
        }
    }

    pub fn bits_per_value(&self) -> u8 {
        match self {
            NumericEncoding::Constant { .. } => 0,
            NumericEncoding::Table { bits_per_value, .. }
            | NumericEncoding::SingleBlock { bits_per_value, .. } => *bits_per_value,
            NumericEncoding::MultiBlock { .. } => MULTI_BLOCK_BITS_PER_VALUE,
        }
    }

    /// Divisor applied to deltas; 1 for the table and constant schemes.
    pub fn gcd(&self) -> i64 {
        match self {
            NumericEncoding::MultiBlock { gcd, .. } | NumericEncoding::SingleBlock { gcd, .. } => {
                *gcd
            }
            _ => 1,
        }
    }
}

/// Picks the encoding for a field with the given statistics.
///
/// Ordinal fields must have a minimum of 0 and a gcd of 1; they never use the
/// table scheme.
pub fn choose_encoding(
    stats: &NumericStats,
    ordinals: bool,
    policy: &NumericPolicy,
) -> Result<NumericEncoding> {
    if stats.is_empty() {
        return Ok(NumericEncoding::Constant { value: 0 });
    }
    let (min, max, gcd) = (stats.min, stats.max, stats.gcd);
    if ordinals {
        verify_contract!(ordinal_min, min == 0);
        if max != 0 {
            verify_contract!(ordinal_gcd, gcd == 1);
        }
    }
    if min >= max {
        return Ok(NumericEncoding::Constant { value: min });
    }

    let range = (max as u64).wrapping_sub(min as u64) / gcd as u64;
    let range_bits = bits_per_value_for(range);
    if !ordinals {
        if let Some(unique) = stats.unique_values.as_ref() {
            let table_bits = bits_per_value_for(unique.len() as u64 - 1);
            if unique.len() > 1 && table_bits < range_bits {
                return Ok(NumericEncoding::Table {
                    values: unique.clone(),
                    bits_per_value: table_bits,
                });
            }
        }
    }

    if stats.space_in_bits > 0
        && stats.block_space_in_bits as f64 / stats.space_in_bits as f64
            <= policy.max_block_cost_ratio
    {
        return Ok(NumericEncoding::MultiBlock {
            block_shift: policy.block_shift,
            gcd,
        });
    }

    let min = if gcd == 1
        && min > 0
        && bits_per_value_for(max as u64) == bits_per_value_for((max - min) as u64)
    {
        0
    } else {
        min
    };
    Ok(NumericEncoding::SingleBlock {
        min,
        gcd,
        bits_per_value: range_bits,
    })
}

/// Writes the numeric meta record and the encoded values of `producer`.
pub fn write_values(
    producer: &dyn SortedNumericProducer,
    stats: &NumericStats,
    encoding: &NumericEncoding,
    data: &mut ArtifactWriter,
    meta: &mut ArtifactWriter,
) -> Result<()> {
    meta.write_i64::<LE>(stats.num_values as i64)?;
    let min = match encoding {
        NumericEncoding::Constant { value } => {
            meta.write_i32::<LE>(SINGLE_WIDTH_MODE)?;
            *value
        }
        NumericEncoding::Table { values, .. } => {
            meta.write_i32::<LE>(values.len() as i32)?;
            for &v in values {
                meta.write_i64::<LE>(v)?;
            }
            0
        }
        NumericEncoding::MultiBlock { block_shift, .. } => {
            meta.write_i32::<LE>(-2 - *block_shift as i32)?;
            stats.min
        }
        NumericEncoding::SingleBlock { min, .. } => {
            meta.write_i32::<LE>(SINGLE_WIDTH_MODE)?;
            *min
        }
    };
    meta.write_u8(encoding.bits_per_value())?;
    meta.write_i64::<LE>(min)?;
    meta.write_i64::<LE>(encoding.gcd())?;

    let start = data.position();
    meta.write_i64::<LE>(start as i64)?;
    let jump_table_offset = match encoding {
        NumericEncoding::Constant { .. } => -1,
        NumericEncoding::Table {
            values,
            bits_per_value,
        } => {
            let index: AHashMap<i64, u64> = values
                .iter()
                .enumerate()
                .map(|(i, &v)| (v, i as u64))
                .collect();
            let mut packed = PackedWriter::new(&mut *data, stats.num_values, *bits_per_value);
            for_each_value(producer, |v| {
                let i = index.get(&v).copied();
                verify_contract!(table_value, i.is_some());
                packed.add(i.unwrap_or_default())?;
                Ok(())
            })?;
            packed.finish()?;
            -1
        }
        NumericEncoding::SingleBlock {
            min,
            gcd,
            bits_per_value,
        } => {
            let mut packed = PackedWriter::new(&mut *data, stats.num_values, *bits_per_value);
            for_each_value(producer, |v| {
                packed.add(delta(v, *min, *gcd))?;
                Ok(())
            })?;
            packed.finish()?;
            -1
        }
        NumericEncoding::MultiBlock { block_shift, gcd } => {
            write_multiple_blocks(producer, stats.num_values, *block_shift, *gcd, data)? as i64
        }
    };
    meta.write_i64::<LE>((data.position() - start) as i64)?;
    meta.write_i64::<LE>(jump_table_offset)?;

    log::debug!(
        "numeric values: {} values, {} docs, {} encoding, {} bits per value, {} data bytes",
        stats.num_values,
        stats.num_docs_with_value,
        encoding.name(),
        encoding.bits_per_value(),
        data.position() - start
    );
    Ok(())
}

fn write_multiple_blocks(
    producer: &dyn SortedNumericProducer,
    num_values: u64,
    block_shift: u8,
    gcd: i64,
    data: &mut ArtifactWriter,
) -> Result<u64> {
    let block_size = 1usize << block_shift;
    let mut block = Vec::with_capacity(block_size.min(num_values as usize));
    let mut offsets = Vec::new();
    for_each_value(producer, |v| {
        block.push(v);
        if block.len() == block_size {
            offsets.push(data.position());
            write_block(&block, gcd, data)?;
            block.clear();
        }
        Ok(())
    })?;
    if !block.is_empty() {
        offsets.push(data.position());
        write_block(&block, gcd, data)?;
    }

    let jump_table_offset = data.position();
    for &offset in &offsets {
        data.write_i64::<LE>(offset as i64)?;
    }
    data.write_i64::<LE>(jump_table_offset as i64)?;
    log::trace!("multi-block values: {} blocks", offsets.len());
    Ok(jump_table_offset)
}

fn write_block(values: &[i64], gcd: i64, data: &mut ArtifactWriter) -> Result<()> {
    let min = values.iter().copied().min().unwrap_or_default();
    let max = values.iter().copied().max().unwrap_or_default();
    if min == max {
        data.write_u8(0)?;
        data.write_i64::<LE>(min)?;
        return Ok(());
    }
    let bits_per_value = bits_per_value_for(delta(max, min, gcd));
    let mut buffer = Vec::with_capacity(packed_len(values.len() as u64, bits_per_value) as usize);
    let mut packed = PackedWriter::new(&mut buffer, values.len() as u64, bits_per_value);
    for &v in values {
        packed.add(delta(v, min, gcd))?;
    }
    packed.finish()?;
    data.write_u8(bits_per_value)?;
    data.write_i64::<LE>(min)?;
    data.write_u32::<LE>(buffer.len() as u32)?;
    data.write_all(&buffer)?;
    Ok(())
}

fn for_each_value(
    producer: &dyn SortedNumericProducer,
    mut f: impl FnMut(i64) -> Result<()>,
) -> Result<()> {
    let mut cursor = producer.cursor()?;
    while cursor.next_doc()?.is_some() {
        for _ in 0..cursor.value_count() {
            f(cursor.next_value()?)?;
        }
    }
    Ok(())
}

fn delta(value: i64, min: i64, gcd: i64) -> u64 {
    (value as u64).wrapping_sub(min as u64) / gcd as u64
}

/// Decoded numeric meta record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericEntry {
    pub num_values: u64,
    pub table: Option<Vec<i64>>,
    pub block_shift: Option<u8>,
    pub bits_per_value: u8,
    pub min: i64,
    pub gcd: i64,
    pub values_offset: u64,
    pub values_length: u64,
    pub jump_table_offset: Option<u64>,
}

impl NumericEntry {
    pub fn read(meta: &mut DataInput) -> Result<NumericEntry> {
        let num_values = meta.read_i64()?;
        verify_data!(num_values, num_values >= 0);
        let mode = meta.read_i32()?;
        let (table, block_shift) = if mode >= 0 {
            verify_data!(table_size, mode as usize <= crate::stats::MAX_UNIQUE_VALUES);
            let table = (0..mode)
                .map(|_| meta.read_i64())
                .collect::<std::io::Result<Vec<_>>>()?;
            (Some(table), None)
        } else if mode == SINGLE_WIDTH_MODE {
            (None, None)
        } else {
            let shift = -2 - mode;
            verify_data!(block_shift, (2..=30).contains(&shift));
            (None, Some(shift as u8))
        };
        let bits_per_value = meta.read_u8()?;
        let min = meta.read_i64()?;
        let gcd = meta.read_i64()?;
        verify_data!(gcd, gcd >= 1);
        let values_offset = meta.read_i64()?;
        let values_length = meta.read_i64()?;
        let jump_table_offset = meta.read_i64()?;
        verify_data!(values_range, values_offset >= 0 && values_length >= 0);
        if block_shift.is_some() {
            verify_data!(jump_table_offset, jump_table_offset >= 0);
        } else {
            verify_data!(
                bits_per_value,
                bits_per_value == 0 || SUPPORTED_BITS_PER_VALUE.contains(&bits_per_value)
            );
        }
        Ok(NumericEntry {
            num_values: num_values as u64,
            table,
            block_shift,
            bits_per_value,
            min,
            gcd,
            values_offset: values_offset as u64,
            values_length: values_length as u64,
            jump_table_offset: (jump_table_offset >= 0).then_some(jump_table_offset as u64),
        })
    }

    /// The encoding the record describes.
    pub fn encoding(&self) -> NumericEncoding {
        if let Some(values) = &self.table {
            NumericEncoding::Table {
                values: values.clone(),
                bits_per_value: self.bits_per_value,
            }
        } else if let Some(block_shift) = self.block_shift {
            NumericEncoding::MultiBlock {
                block_shift,
                gcd: self.gcd,
            }
        } else if self.bits_per_value == 0 {
            NumericEncoding::Constant { value: self.min }
        } else {
            NumericEncoding::SingleBlock {
                min: self.min,
                gcd: self.gcd,
                bits_per_value: self.bits_per_value,
            }
        }
    }

    pub fn values<'a>(&'a self, data: &'a [u8]) -> Result<NumericValues<'a>> {
        let end = self.values_offset.checked_add(self.values_length);
        verify_data!(values_range, end.is_some_and(|end| end <= data.len() as u64));
        Ok(NumericValues {
            entry: self,
            data,
            values: &data[self.values_offset as usize
                ..(self.values_offset + self.values_length) as usize],
        })
    }
}

/// Random access to the values of a numeric record, by value index.
pub struct NumericValues<'a> {
    entry: &'a NumericEntry,
    data: &'a [u8],
    values: &'a [u8],
}

impl NumericValues<'_> {
    pub fn len(&self) -> u64 {
        self.entry.num_values
    }

    pub fn is_empty(&self) -> bool {
        self.entry.num_values == 0
    }

    pub fn get(&self, index: u64) -> Result<i64> {
        verify_data!(value_index, index < self.entry.num_values);
        let entry = self.entry;
        if let Some(table) = &entry.table {
            let i = PackedReader::new(self.values, entry.bits_per_value).get(index) as usize;
            verify_data!(table_index, i < table.len());
            return Ok(table[i]);
        }
        if let Some(block_shift) = entry.block_shift {
            return self.get_from_block(index, block_shift);
        }
        if entry.bits_per_value == 0 {
            return Ok(entry.min);
        }
        let delta = PackedReader::new(self.values, entry.bits_per_value).get(index);
        Ok(undelta(delta, entry.min, entry.gcd))
    }

    fn get_from_block(&self, index: u64, block_shift: u8) -> Result<i64> {
        let jump_table_offset = self.entry.jump_table_offset.unwrap_or_default();
        let block = index >> block_shift;
        let mut jump = DataInput::at(self.data, jump_table_offset + block * 8)?;
        let block_offset = jump.read_i64()?;
        verify_data!(block_offset, block_offset >= 0);
        let mut input = DataInput::at(self.data, block_offset as u64)?;
        let bits_per_value = input.read_u8()?;
        let min = input.read_i64()?;
        if bits_per_value == 0 {
            return Ok(min);
        }
        let len = input.read_u32()? as usize;
        let packed = PackedReader::new(input.read_bytes(len)?, bits_per_value);
        let delta = packed.get(index & ((1 << block_shift) - 1));
        Ok(undelta(delta, min, self.entry.gcd))
    }
}

fn undelta(delta: u64, min: i64, gcd: i64) -> i64 {
    (min as u64).wrapping_add(delta.wrapping_mul(gcd as u64)) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatsCollector;

    fn stats_of(values: &[i64]) -> NumericStats {
        let mut collector = StatsCollector::new(values.len() as u32, 14);
        for (doc, &v) in values.iter().enumerate() {
            collector.add_doc(doc as u32).unwrap();
            collector.add_value(v);
        }
        collector.finish()
    }

    fn choose(values: &[i64]) -> NumericEncoding {
        choose_encoding(&stats_of(values), false, &NumericPolicy::default()).unwrap()
    }

    #[test]
    fn test_constant() {
        assert_eq!(choose(&[0; 1000]), NumericEncoding::Constant { value: 0 });
        assert_eq!(choose(&[-9; 3]), NumericEncoding::Constant { value: -9 });
        assert_eq!(choose(&[]), NumericEncoding::Constant { value: 0 });
    }

    #[test]
    fn test_table_threshold() {
        let spread = |n: i64| -> Vec<i64> {
            (0..n).map(|i| i * 0x0123_4567_89ab + 17 * (i % 3)).collect()
        };
        let encoding = choose(&spread(200));
        assert!(
            matches!(
                encoding,
                NumericEncoding::Table { ref values, bits_per_value: 8 } if values.len() == 200
            ),
            "{encoding:?}"
        );
        assert!(!matches!(choose(&spread(300)), NumericEncoding::Table { .. }));
    }

    #[test]
    fn test_single_block_min_normalization() {
        let values: Vec<i64> = (1000..=1300).collect();
        assert_eq!(
            choose(&values),
            NumericEncoding::SingleBlock {
                min: 0,
                gcd: 1,
                bits_per_value: 12
            }
        );

        let values: Vec<i64> = (0..300).map(|i| -7 + 10 * i).collect();
        assert_eq!(
            choose(&values),
            NumericEncoding::SingleBlock {
                min: -7,
                gcd: 10,
                bits_per_value: 12
            }
        );
    }

    #[test]
    fn test_multi_block_choice() {
        let mut values: Vec<i64> = (0..1 << 14).map(|i| i % 2).collect();
        values.extend((0..1 << 14).map(|i| i * 1_000_003));
        values.extend((0..1 << 14).map(|i| i % 4));
        let encoding = choose(&values);
        assert_eq!(
            encoding,
            NumericEncoding::MultiBlock {
                block_shift: 14,
                gcd: 1
            }
        );

        let strict = NumericPolicy {
            max_block_cost_ratio: 0.1,
            ..NumericPolicy::default()
        };
        let encoding = choose_encoding(&stats_of(&values), false, &strict).unwrap();
        assert!(matches!(encoding, NumericEncoding::SingleBlock { .. }));
    }

    #[test]
    fn test_ordinal_contract() {
        let policy = NumericPolicy::default();
        let err = choose_encoding(&stats_of(&[1, 2, 3]), true, &policy).unwrap_err();
        assert!(err.is_fatal());
        let err = choose_encoding(&stats_of(&[0, 2, 4]), true, &policy).unwrap_err();
        assert!(err.is_fatal());

        let encoding = choose_encoding(&stats_of(&[0, 1, 1, 0, 2]), true, &policy).unwrap();
        assert_eq!(encoding.gcd(), 1);
        assert!(matches!(encoding, NumericEncoding::SingleBlock { min: 0, .. }));
    }
}
