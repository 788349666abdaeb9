//! Local file implementations of the segment I/O traits.

use std::{
    fs::File,
    io::{BufWriter, Write},
    ops::Range,
    path::Path,
};

use crate::{ReadAt, SealingWrite, verify};

/// Read-only view of a segment file. The size is captured at open time; the
/// file must not change while it is being read.
pub struct FileReader {
    file: File,
    size: u64,
}

impl FileReader {
    pub fn new(file: File) -> std::io::Result<FileReader> {
        let size = file.metadata()?.len();
        Ok(FileReader { file, size })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<FileReader> {
        FileReader::new(File::open(path)?)
    }
}

impl ReadAt for FileReader {
    fn size(&self) -> std::io::Result<u64> {
        Ok(self.size)
    }

    /// Reads exactly `range`; a range reaching past the end of the file is an
    /// `UnexpectedEof` error.
    fn read_at(&self, range: Range<u64>) -> std::io::Result<Vec<u8>> {
        verify!(range.end >= range.start);
        if range.end > self.size {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        let mut buf = vec![0u8; (range.end - range.start) as usize];
        read_exact_at(&self.file, range.start, &mut buf)?;
        Ok(buf)
    }
}

/// Appends to a freshly created file. The meta stream is written a few bytes
/// at a time, so appends go through a write buffer.
pub struct FileWriter {
    file: Option<BufWriter<File>>,
}

impl FileWriter {
    const BUFFER_SIZE: usize = 64 * 1024;

    pub fn new(file: File) -> FileWriter {
        FileWriter {
            file: Some(BufWriter::with_capacity(Self::BUFFER_SIZE, file)),
        }
    }

    /// Creates the file at `path`, failing when it already exists.
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<FileWriter> {
        Ok(FileWriter::new(File::create_new(path)?))
    }

    fn sealed() -> std::io::Error {
        std::io::Error::other("file writer is sealed")
    }
}

impl SealingWrite for FileWriter {
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.file
            .as_mut()
            .ok_or_else(Self::sealed)?
            .write_all(buf)
    }

    /// Flushes the buffer and syncs the file to disk.
    fn seal(&mut self) -> std::io::Result<()> {
        let file = self.file.take().ok_or_else(Self::sealed)?;
        let file = file.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }
}

#[cfg(unix)]
fn read_exact_at(file: &File, pos: u64, buf: &mut [u8]) -> std::io::Result<()> {
    use std::os::unix::fs::FileExt;

    file.read_exact_at(buf, pos)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut pos: u64, mut buf: &mut [u8]) -> std::io::Result<()> {
    use std::os::windows::fs::FileExt;

    while !buf.is_empty() {
        let n = file.seek_read(buf, pos)?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf = &mut buf[n..];
        pos += n as u64;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        ReadAt, SealingWrite,
        file::{FileReader, FileWriter},
    };

    #[test]
    fn test_segment_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_0.dvd");
        let mut writer = FileWriter::create(&path).unwrap();
        for i in 0..100u8 {
            writer.write_all(&[i; 3]).unwrap();
        }
        writer.seal().unwrap();
        assert!(writer.write_all(b"late").is_err());
        assert!(writer.seal().is_err());

        let reader = FileReader::open(&path).unwrap();
        assert_eq!(reader.size().unwrap(), 300);
        assert_eq!(reader.read_at(30..33).unwrap(), [10, 10, 10]);
        assert!(reader.read_at(5..5).unwrap().is_empty());
        assert_eq!(reader.read_all().unwrap().len(), 300);
        let err = reader.read_at(290..310).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_0.dvm");
        std::fs::write(&path, b"x").unwrap();
        let err = FileWriter::create(&path).err().unwrap();
        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
    }
}
