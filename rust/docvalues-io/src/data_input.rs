use byteorder::{ByteOrder, LE};

/// Forward cursor over an in-memory stream, decoding the little-endian and
/// varint primitives the encoders emit.
///
/// Reads past the end fail with `UnexpectedEof`, which callers surface as a
/// truncated-stream I/O error.
#[derive(Clone)]
pub struct DataInput<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> DataInput<'a> {
    pub fn new(buf: &'a [u8]) -> DataInput<'a> {
        DataInput { buf, pos: 0 }
    }

    /// Creates a cursor positioned at `pos`.
    pub fn at(buf: &'a [u8], pos: u64) -> std::io::Result<DataInput<'a>> {
        let mut input = DataInput::new(buf);
        input.seek(pos)?;
        Ok(input)
    }

    pub fn position(&self) -> u64 {
        self.pos as u64
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn seek(&mut self, pos: u64) -> std::io::Result<()> {
        if pos > self.buf.len() as u64 {
            return Err(eof());
        }
        self.pos = pos as usize;
        Ok(())
    }

    pub fn skip(&mut self, len: u64) -> std::io::Result<()> {
        self.seek(self.position() + len)
    }

    /// Returns the next `len` bytes and advances past them.
    pub fn read_bytes(&mut self, len: usize) -> std::io::Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or_else(eof)?;
        if end > self.buf.len() {
            return Err(eof());
        }
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> std::io::Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> std::io::Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_i16(&mut self) -> std::io::Result<i16> {
        Ok(LE::read_i16(self.read_bytes(2)?))
    }

    pub fn read_u16(&mut self) -> std::io::Result<u16> {
        Ok(LE::read_u16(self.read_bytes(2)?))
    }

    pub fn read_i32(&mut self) -> std::io::Result<i32> {
        Ok(LE::read_i32(self.read_bytes(4)?))
    }

    pub fn read_u32(&mut self) -> std::io::Result<u32> {
        Ok(LE::read_u32(self.read_bytes(4)?))
    }

    pub fn read_i64(&mut self) -> std::io::Result<i64> {
        Ok(LE::read_i64(self.read_bytes(8)?))
    }

    pub fn read_u64(&mut self) -> std::io::Result<u64> {
        Ok(LE::read_u64(self.read_bytes(8)?))
    }

    pub fn read_vint(&mut self) -> std::io::Result<u32> {
        let value = self.read_vlong()?;
        u32::try_from(value).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, "vint overflow")
        })
    }

    pub fn read_vlong(&mut self) -> std::io::Result<u64> {
        let mut value = 0u64;
        let mut shift = 0;
        loop {
            let b = self.read_u8()?;
            if shift == 63 && b > 1 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "vlong overflow",
                ));
            }
            value |= ((b & 0x7f) as u64) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 63 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "vlong too long",
                ));
            }
        }
    }
}

fn eof() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "read past end of stream")
}
