//! Byte-level plumbing for the two streams of a segment.
//!
//! Storage is reached through two small traits: [`ReadAt`] fetches byte ranges
//! of a finished stream, and [`SealingWrite`] appends to a stream that is
//! committed by a final `seal()`. Files and memory buffers implement both.
//! The framing of a stream (header, footer and checksum) lives in
//! [`framing`] and [`ArtifactWriter`]; [`DataInput`] and [`VarIntWrite`] hold
//! the little-endian and varint primitives.

use std::ops::Range;

pub mod artifact_writer;
pub mod checksum;
pub mod data_input;
pub mod file;
pub mod framing;
pub mod memory;
pub mod varint;

pub use artifact_writer::ArtifactWriter;
pub use data_input::DataInput;
pub use varint::VarIntWrite;

/// Fails the enclosing I/O function with `InvalidInput` unless the condition
/// holds.
#[macro_export]
macro_rules! verify {
    ($expr:expr) => {
        if !($expr) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                stringify!($expr),
            ));
        }
    };
}

/// Positional access to a finished stream.
pub trait ReadAt: Send + Sync + 'static {
    /// Length of the stream in bytes.
    fn size(&self) -> std::io::Result<u64>;

    /// Returns the bytes in `range`. Implementations decide whether a range
    /// past the end is clamped or rejected, but never return a short read
    /// inside the stream.
    fn read_at(&self, range: Range<u64>) -> std::io::Result<Vec<u8>>;

    fn read_all(&self) -> std::io::Result<Vec<u8>> {
        let size = self.size()?;
        self.read_at(0..size)
    }
}

/// Append-only sink for one stream. A stream is complete only after `seal()`
/// returns; writes after that fail.
pub trait SealingWrite: Send {
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()>;

    /// Flushes buffered bytes and commits the stream.
    fn seal(&mut self) -> std::io::Result<()>;
}

impl<T> ReadAt for std::sync::Arc<T>
where
    T: ReadAt + ?Sized,
{
    fn size(&self) -> std::io::Result<u64> {
        self.as_ref().size()
    }

    fn read_at(&self, range: Range<u64>) -> std::io::Result<Vec<u8>> {
        self.as_ref().read_at(range)
    }
}

impl<T> SealingWrite for Box<T>
where
    T: SealingWrite + ?Sized,
{
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.as_mut().write_all(buf)
    }

    fn seal(&mut self) -> std::io::Result<()> {
        self.as_mut().seal()
    }
}
