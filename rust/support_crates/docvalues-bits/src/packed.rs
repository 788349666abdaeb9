//! Fixed-width bit packing.
//!
//! Values are laid out as one little-endian bit stream: value `i` occupies bits
//! `[i * bpv, (i + 1) * bpv)`, least significant bit first. The stream is padded
//! with zero bits to a whole number of bytes.

use std::io::Write;

/// Bit widths the packer emits. Widths are rounded up to the nearest supported
/// one so the decoder deals with a small set of layouts.
pub const SUPPORTED_BITS_PER_VALUE: [u8; 14] = [1, 2, 4, 8, 12, 16, 20, 24, 28, 32, 40, 48, 56, 64];

/// Number of bits required to represent `value` as an unsigned integer, at least 1.
pub fn unsigned_bits_required(value: u64) -> u8 {
    (64 - value.leading_zeros()).max(1) as u8
}

/// Rounds `bits` up to the nearest supported width.
pub fn supported_bits_per_value(bits: u8) -> u8 {
    SUPPORTED_BITS_PER_VALUE
        .iter()
        .copied()
        .find(|&width| width >= bits)
        .unwrap_or(64)
}

/// Smallest supported width able to hold `max_value`.
pub fn bits_per_value_for(max_value: u64) -> u8 {
    supported_bits_per_value(unsigned_bits_required(max_value))
}

/// Byte length of `num_values` values packed at `bits_per_value`.
pub fn packed_len(num_values: u64, bits_per_value: u8) -> u64 {
    (num_values * bits_per_value as u64).div_ceil(8)
}

/// Streaming bit packer.
///
/// The writer expects exactly `num_values` calls to [`add`](PackedWriter::add)
/// followed by [`finish`](PackedWriter::finish).
pub struct PackedWriter<W: Write> {
    out: W,
    bits_per_value: u8,
    mask: u64,
    num_values: u64,
    count: u64,
    acc: u128,
    acc_bits: u32,
    buf: Vec<u8>,
}

impl<W: Write> PackedWriter<W> {
    const FLUSH_THRESHOLD: usize = 8 * 1024;

    pub fn new(out: W, num_values: u64, bits_per_value: u8) -> PackedWriter<W> {
        assert!(SUPPORTED_BITS_PER_VALUE.contains(&bits_per_value));
        PackedWriter {
            out,
            bits_per_value,
            mask: value_mask(bits_per_value),
            num_values,
            count: 0,
            acc: 0,
            acc_bits: 0,
            buf: Vec::with_capacity(Self::FLUSH_THRESHOLD + 16),
        }
    }

    pub fn bits_per_value(&self) -> u8 {
        self.bits_per_value
    }

    /// Appends the next value. Bits above `bits_per_value` must be zero.
    pub fn add(&mut self, value: u64) -> std::io::Result<()> {
        debug_assert_eq!(value & !self.mask, 0, "value {value} exceeds width");
        if self.count == self.num_values {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "too many packed values",
            ));
        }
        self.count += 1;
        self.acc |= ((value & self.mask) as u128) << self.acc_bits;
        self.acc_bits += self.bits_per_value as u32;
        if self.acc_bits >= 64 {
            self.buf.extend_from_slice(&(self.acc as u64).to_le_bytes());
            self.acc >>= 64;
            self.acc_bits -= 64;
            if self.buf.len() >= Self::FLUSH_THRESHOLD {
                self.out.write_all(&self.buf)?;
                self.buf.clear();
            }
        }
        Ok(())
    }

    /// Flushes the trailing bits and returns the underlying writer.
    pub fn finish(mut self) -> std::io::Result<W> {
        if self.count != self.num_values {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "packed {} values, expected {}",
                    self.count, self.num_values
                ),
            ));
        }
        let tail_bytes = self.acc_bits.div_ceil(8) as usize;
        self.buf
            .extend_from_slice(&(self.acc as u64).to_le_bytes()[..tail_bytes]);
        self.out.write_all(&self.buf)?;
        Ok(self.out)
    }
}

/// Random-access reader over a packed bit stream.
#[derive(Clone, Copy)]
pub struct PackedReader<'a> {
    data: &'a [u8],
    bits_per_value: u8,
    mask: u64,
}

impl<'a> PackedReader<'a> {
    pub fn new(data: &'a [u8], bits_per_value: u8) -> PackedReader<'a> {
        PackedReader {
            data,
            bits_per_value,
            mask: value_mask(bits_per_value),
        }
    }

    pub fn bits_per_value(&self) -> u8 {
        self.bits_per_value
    }

    /// Returns the value at `index`. Reads past the end yield zero bits.
    pub fn get(&self, index: u64) -> u64 {
        if self.bits_per_value == 0 {
            return 0;
        }
        let bit = index * self.bits_per_value as u64;
        let start = (bit / 8) as usize;
        let shift = (bit % 8) as u32;
        let mut word = [0u8; 16];
        if start < self.data.len() {
            let end = std::cmp::min(start + 16, self.data.len());
            word[..end - start].copy_from_slice(&self.data[start..end]);
        }
        ((u128::from_le_bytes(word) >> shift) as u64) & self.mask
    }
}

fn value_mask(bits_per_value: u8) -> u64 {
    if bits_per_value >= 64 {
        u64::MAX
    } else {
        (1u64 << bits_per_value) - 1
    }
}
