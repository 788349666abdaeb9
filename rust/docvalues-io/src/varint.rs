//! Variable-length integer encoding: 7 bits per byte, low groups first, the high
//! bit of each byte flags a continuation.

use std::io::Write;

/// Maximum encoded length of a `u64`.
pub const MAX_VLONG_LEN: usize = 10;

pub trait VarIntWrite: Write {
    fn write_vint(&mut self, value: u32) -> std::io::Result<()> {
        self.write_vlong(value as u64)
    }

    fn write_vlong(&mut self, mut value: u64) -> std::io::Result<()> {
        let mut buf = [0u8; MAX_VLONG_LEN];
        let mut len = 0;
        while value >= 0x80 {
            buf[len] = (value as u8 & 0x7f) | 0x80;
            value >>= 7;
            len += 1;
        }
        buf[len] = value as u8;
        self.write_all(&buf[..len + 1])
    }
}

impl<W: Write + ?Sized> VarIntWrite for W {}

/// Number of bytes `write_vlong` produces for `value`.
pub fn vlong_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataInput;

    #[test]
    fn test_varint_lengths() {
        for (value, len) in [
            (0u64, 1),
            (127, 1),
            (128, 2),
            (16383, 2),
            (16384, 3),
            (u32::MAX as u64, 5),
            (u64::MAX, 10),
        ] {
            let mut buf = Vec::new();
            buf.write_vlong(value).unwrap();
            assert_eq!(buf.len(), len, "value {value}");
            assert_eq!(vlong_len(value), len);
            assert_eq!(DataInput::new(&buf).read_vlong().unwrap(), value);
        }
    }

    #[test]
    fn test_vint_layout() {
        let mut buf = Vec::new();
        buf.write_vint(300).unwrap();
        assert_eq!(buf, [0xac, 0x02]);
    }
}
