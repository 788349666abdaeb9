use docvalues_common::error::ErrorKind;
use xxhash_rust::xxh3::Xxh3;

/// Computes a checksum for a given buffer using the xxHash (xxh3-64) algorithm.
pub fn compute(buf: &[u8]) -> u64 {
    xxhash_rust::xxh3::xxh3_64(buf)
}

/// Validates a buffer by comparing its computed checksum with the provided checksum.
///
/// # Errors
///
/// Returns `ChecksumMismatch` if the computed checksum does not match.
pub fn validate_buffer(buf: &[u8], checksum: u64, name: Option<&str>) -> docvalues_common::Result<()> {
    let actual = compute(buf);
    if actual == checksum {
        Ok(())
    } else {
        Err(ErrorKind::ChecksumMismatch {
            element: name.unwrap_or_default().to_string(),
        }
        .into())
    }
}

/// Incremental checksum over a byte stream, fed as the stream is appended.
///
/// `digest()` over the concatenation of all updates equals `compute()` over
/// the same bytes.
#[derive(Clone, Default)]
pub struct StreamChecksum {
    hasher: Xxh3,
}

impl StreamChecksum {
    pub fn new() -> StreamChecksum {
        StreamChecksum {
            hasher: Xxh3::new(),
        }
    }

    pub fn update(&mut self, buf: &[u8]) {
        self.hasher.update(buf);
    }

    pub fn digest(&self) -> u64 {
        self.hasher.digest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_checksum_matches_compute() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i * 31 % 251) as u8).collect();
        let mut checksum = StreamChecksum::new();
        for chunk in data.chunks(333) {
            checksum.update(chunk);
        }
        assert_eq!(checksum.digest(), compute(&data));
    }

    #[test]
    fn test_validate_buffer_invalid_checksum() {
        let buf = b"testdata";
        let checksum = compute(buf) ^ 0x1000;

        let result = validate_buffer(buf, checksum, Some("buffer"));
        if let Err(e) = result {
            assert!(matches!(
                e.kind(),
                ErrorKind::ChecksumMismatch { element } if element == "buffer"
            ));
        } else {
            panic!("expected checksum mismatch");
        }
        assert!(validate_buffer(buf, compute(buf), None).is_ok());
    }
}
