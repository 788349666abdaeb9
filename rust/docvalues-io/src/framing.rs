//! Stream framing: every data and meta stream starts with a versioned header
//! and ends with a checksum footer.
//!
//! Header layout:
//! * magic: `[u8; 4]`
//! * codec name: `u8` length followed by the name bytes
//! * format version: `u32`
//! * segment id: `[u8; 16]`
//!
//! Footer layout:
//! * footer magic: `[u8; 4]` (bitwise complement of the header magic)
//! * checksum algorithm: `u32` (`0` = xxh3-64)
//! * checksum: `u64` over every preceding byte of the stream

use std::io::Write;

use byteorder::{LE, WriteBytesExt};
use docvalues_common::{Result, error::Error, verify_arg, verify_data};

use crate::{DataInput, checksum};

pub const HEADER_MAGIC: [u8; 4] = [0x64, 0x76, 0x73, 0x67];
pub const FOOTER_MAGIC: [u8; 4] = [!0x64, !0x76, !0x73, !0x67];
pub const CHECKSUM_ALGORITHM_XXH3: u32 = 0;
pub const FOOTER_SIZE: usize = 16;
pub const SEGMENT_ID_LEN: usize = 16;

/// Identifies the producer and version of a stream and ties it to one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    pub codec: String,
    pub version: u32,
    pub segment_id: [u8; SEGMENT_ID_LEN],
}

impl StreamHeader {
    pub fn new(codec: impl Into<String>, version: u32, segment_id: [u8; SEGMENT_ID_LEN]) -> Self {
        StreamHeader {
            codec: codec.into(),
            version,
            segment_id,
        }
    }

    pub fn encoded_len(&self) -> usize {
        HEADER_MAGIC.len() + 1 + self.codec.len() + 4 + SEGMENT_ID_LEN
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        verify_arg!(codec, self.codec.len() <= u8::MAX as usize);
        writer.write_all(&HEADER_MAGIC)?;
        writer.write_u8(self.codec.len() as u8)?;
        writer.write_all(self.codec.as_bytes())?;
        writer.write_u32::<LE>(self.version)?;
        writer.write_all(&self.segment_id)?;
        Ok(())
    }

    pub fn read_from(input: &mut DataInput) -> Result<StreamHeader> {
        let magic = input.read_bytes(HEADER_MAGIC.len())?;
        verify_data!(header_magic, magic == HEADER_MAGIC);
        let codec_len = input.read_u8()? as usize;
        let codec = std::str::from_utf8(input.read_bytes(codec_len)?)
            .map_err(|_| Error::invalid_format("codec name"))?
            .to_string();
        let version = input.read_u32()?;
        let mut segment_id = [0u8; SEGMENT_ID_LEN];
        segment_id.copy_from_slice(input.read_bytes(SEGMENT_ID_LEN)?);
        Ok(StreamHeader {
            codec,
            version,
            segment_id,
        })
    }

    /// Reads the header and checks it against the expected codec, version range
    /// and segment id.
    pub fn check(
        input: &mut DataInput,
        codec: &str,
        min_version: u32,
        max_version: u32,
        segment_id: &[u8; SEGMENT_ID_LEN],
    ) -> Result<u32> {
        let header = Self::read_from(input)?;
        verify_data!(codec, header.codec == codec);
        verify_data!(
            version,
            header.version >= min_version && header.version <= max_version
        );
        verify_data!(segment_id, &header.segment_id == segment_id);
        Ok(header.version)
    }
}

/// First eight footer bytes (magic and algorithm id). They are covered by the
/// checksum that follows them.
pub fn footer_prefix() -> [u8; 8] {
    let mut prefix = [0u8; 8];
    prefix[..4].copy_from_slice(&FOOTER_MAGIC);
    prefix[4..].copy_from_slice(&CHECKSUM_ALGORITHM_XXH3.to_le_bytes());
    prefix
}

/// Validates the footer of a complete stream and returns the stream body
/// (everything before the footer).
pub fn verify_footer<'a>(stream: &'a [u8], name: &str) -> Result<&'a [u8]> {
    verify_data!(stream_len, stream.len() >= FOOTER_SIZE);
    let footer_start = stream.len() - FOOTER_SIZE;
    let mut input = DataInput::at(stream, footer_start as u64)?;
    verify_data!(footer_magic, input.read_bytes(4)? == FOOTER_MAGIC);
    verify_data!(
        checksum_algorithm,
        input.read_u32()? == CHECKSUM_ALGORITHM_XXH3
    );
    let expected = input.read_u64()?;
    checksum::validate_buffer(&stream[..stream.len() - 8], expected, Some(name))?;
    Ok(&stream[..footer_start])
}

#[cfg(test)]
mod tests {
    use docvalues_common::error::ErrorKind;

    use super::*;

    fn framed(body: &[u8]) -> Vec<u8> {
        let mut stream = Vec::new();
        StreamHeader::new("Test", 1, [7; 16])
            .write_to(&mut stream)
            .unwrap();
        stream.extend_from_slice(body);
        stream.extend_from_slice(&footer_prefix());
        let checksum = checksum::compute(&stream);
        stream.extend_from_slice(&checksum.to_le_bytes());
        stream
    }

    #[test]
    fn test_header_round_trip() {
        let stream = framed(b"payload");
        let body = verify_footer(&stream, "test").unwrap();
        let mut input = DataInput::new(body);
        let version = StreamHeader::check(&mut input, "Test", 0, 1, &[7; 16]).unwrap();
        assert_eq!(version, 1);
        assert_eq!(input.read_bytes(7).unwrap(), b"payload");
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn test_header_mismatch() {
        let stream = framed(b"");
        let body = verify_footer(&stream, "test").unwrap();
        assert!(StreamHeader::check(&mut DataInput::new(body), "Other", 0, 1, &[7; 16]).is_err());
        assert!(StreamHeader::check(&mut DataInput::new(body), "Test", 2, 3, &[7; 16]).is_err());
        assert!(StreamHeader::check(&mut DataInput::new(body), "Test", 0, 1, &[8; 16]).is_err());
    }

    #[test]
    fn test_corrupted_stream() {
        let mut stream = framed(b"payload");
        let pos = stream.len() - FOOTER_SIZE - 2;
        stream[pos] ^= 0x40;
        let err = verify_footer(&stream, "data").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ChecksumMismatch { .. }));

        assert!(verify_footer(b"short", "data").is_err());
    }
}
