//! Non-decreasing integer sequences (addresses, cumulative counts) split into
//! fixed-size blocks.
//!
//! Each block of `1 << block_shift` values keeps its first value as a base and
//! bit-packs `value - base` for every value of the block. Block headers go to
//! the meta stream (`i64` base, `i64` offset of the packed deltas relative to
//! the start of the sequence's data, `u8` bits per value); packed deltas go to
//! the data sink. A block whose values are all equal has zero bits per value
//! and no data bytes.

use std::io::Write;

use byteorder::{LE, WriteBytesExt};
use docvalues_bits::{
    PackedReader, PackedWriter,
    packed::{bits_per_value_for, packed_len},
};
use docvalues_common::{Result, verify_arg, verify_contract, verify_data};
use docvalues_io::DataInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub base: i64,
    pub offset: u64,
    pub bits_per_value: u8,
}

/// Streaming writer of one monotonic sequence of a known length.
pub struct MonotonicWriter<M: Write, D: Write> {
    meta: M,
    data: D,
    block_shift: u8,
    num_values: u64,
    count: u64,
    buffer: Vec<i64>,
    previous: Option<i64>,
    data_written: u64,
}

impl<M: Write, D: Write> MonotonicWriter<M, D> {
    pub fn new(meta: M, data: D, num_values: u64, block_shift: u8) -> Result<MonotonicWriter<M, D>> {
        verify_arg!(block_shift, (2..=22).contains(&block_shift));
        Ok(MonotonicWriter {
            meta,
            data,
            block_shift,
            num_values,
            count: 0,
            buffer: Vec::with_capacity(std::cmp::min(num_values, 1 << block_shift) as usize),
            previous: None,
            data_written: 0,
        })
    }

    pub fn add(&mut self, value: i64) -> Result<()> {
        verify_contract!(
            monotonic_value,
            self.previous.is_none_or(|previous| value >= previous)
        );
        verify_contract!(monotonic_count, self.count < self.num_values);
        self.previous = Some(value);
        self.count += 1;
        self.buffer.push(value);
        if self.buffer.len() == 1 << self.block_shift {
            self.flush_block()?;
        }
        Ok(())
    }

    /// Flushes the last block and returns the meta and data sinks together with
    /// the number of data bytes written.
    pub fn finish(mut self) -> Result<(M, D, u64)> {
        verify_contract!(monotonic_count, self.count == self.num_values);
        if !self.buffer.is_empty() {
            self.flush_block()?;
        }
        Ok((self.meta, self.data, self.data_written))
    }

    fn flush_block(&mut self) -> Result<()> {
        let base = self.buffer[0];
        let max_delta = self
            .buffer
            .iter()
            .map(|&v| (v as u64).wrapping_sub(base as u64))
            .max()
            .unwrap_or(0);
        let bits_per_value = if max_delta == 0 {
            0
        } else {
            bits_per_value_for(max_delta)
        };
        self.meta.write_i64::<LE>(base)?;
        self.meta.write_i64::<LE>(self.data_written as i64)?;
        self.meta.write_u8(bits_per_value)?;
        if bits_per_value != 0 {
            let mut packed =
                PackedWriter::new(&mut self.data, self.buffer.len() as u64, bits_per_value);
            for &v in &self.buffer {
                packed.add((v as u64).wrapping_sub(base as u64))?;
            }
            packed.finish()?;
            self.data_written += packed_len(self.buffer.len() as u64, bits_per_value);
        }
        self.buffer.clear();
        Ok(())
    }
}

/// Block headers of a monotonic sequence, loaded from the meta stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonotonicMeta {
    pub num_values: u64,
    pub block_shift: u8,
    pub blocks: Vec<BlockHeader>,
}

impl MonotonicMeta {
    pub fn read(meta: &mut DataInput, num_values: u64, block_shift: u8) -> Result<MonotonicMeta> {
        verify_data!(block_shift, (2..=22).contains(&block_shift));
        let num_blocks = num_values.div_ceil(1 << block_shift);
        verify_data!(num_blocks, num_blocks <= meta.remaining() as u64);
        let mut blocks = Vec::with_capacity(num_blocks as usize);
        for _ in 0..num_blocks {
            let base = meta.read_i64()?;
            let offset = meta.read_i64()?;
            let bits_per_value = meta.read_u8()?;
            verify_data!(block_offset, offset >= 0);
            verify_data!(bits_per_value, bits_per_value <= 64);
            blocks.push(BlockHeader {
                base,
                offset: offset as u64,
                bits_per_value,
            });
        }
        Ok(MonotonicMeta {
            num_values,
            block_shift,
            blocks,
        })
    }

    /// Returns the value at `index`; `data` starts at the sequence's first data
    /// byte.
    pub fn get(&self, data: &[u8], index: u64) -> Result<i64> {
        verify_arg!(index, index < self.num_values);
        let block = &self.blocks[(index >> self.block_shift) as usize];
        if block.bits_per_value == 0 {
            return Ok(block.base);
        }
        verify_data!(block_offset, block.offset <= data.len() as u64);
        let packed = PackedReader::new(&data[block.offset as usize..], block.bits_per_value);
        let delta = packed.get(index & ((1 << self.block_shift) - 1));
        Ok((block.base as u64).wrapping_add(delta) as i64)
    }
}
