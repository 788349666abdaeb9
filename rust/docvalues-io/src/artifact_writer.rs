//! A writer for appending one framed stream (data or meta) of a segment.

use crate::{
    SealingWrite,
    checksum::StreamChecksum,
    framing::{StreamHeader, footer_prefix},
};

/// Appends one stream of a segment to a file or memory buffer.
///
/// The written bytes are framed with a [`StreamHeader`] and a checksum footer.
/// Every byte passing through the writer is fed into a running xxh3 checksum, so
/// sealing never has to re-read the artifact. The writer tracks the current
/// position, which encoders record as offsets into the stream.
///
/// `ArtifactWriter` implements [`std::io::Write`], so the `byteorder` and
/// [`crate::VarIntWrite`] extensions apply to it directly.
pub struct ArtifactWriter {
    inner: Box<dyn SealingWrite>,
    pos: u64,
    checksum: StreamChecksum,
    name: String,
}

impl ArtifactWriter {
    /// Wraps `writer` and emits `header` as the first bytes of the stream.
    /// `name` is the stream's file name, used in diagnostics.
    pub fn framed(
        writer: Box<dyn SealingWrite>,
        name: impl Into<String>,
        header: &StreamHeader,
    ) -> docvalues_common::Result<ArtifactWriter> {
        let mut artifact = ArtifactWriter {
            inner: writer,
            pos: 0,
            checksum: StreamChecksum::new(),
            name: name.into(),
        };
        header.write_to(&mut artifact)?;
        Ok(artifact)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Offset of the next byte, counted from the start of the header.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.inner.write_all(buf)?;
        self.checksum.update(buf);
        self.pos += buf.len() as u64;
        Ok(())
    }

    /// Writes the footer and seals the underlying writer.
    ///
    /// Returns the total length of the artifact.
    pub fn seal(mut self) -> std::io::Result<u64> {
        self.write_all(&footer_prefix())?;
        let checksum = self.checksum.digest();
        self.inner.write_all(&checksum.to_le_bytes())?;
        self.pos += 8;
        self.inner.seal()?;
        Ok(self.pos)
    }
}

impl std::io::Write for ArtifactWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        ArtifactWriter::write_all(self, buf)?;
        Ok(buf.len())
    }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        ArtifactWriter::write_all(self, buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
