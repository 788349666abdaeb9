//! In-memory stream buffers, used by tests and by callers that keep a
//! segment's streams in memory.

use std::{
    ops::Range,
    sync::{Arc, Mutex},
};

use crate::{ReadAt, SealingWrite, verify};

/// A memory buffer that can be handed to a writer as a `Box<dyn SealingWrite>`
/// while a clone of the handle is kept around to collect the written bytes.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<SharedBufferState>>,
}

#[derive(Default)]
struct SharedBufferState {
    data: Vec<u8>,
    sealed: bool,
}

impl SharedBuffer {
    pub fn new() -> SharedBuffer {
        Default::default()
    }

    /// Returns a copy of the bytes written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.lock().data.clone()
    }

    pub fn is_sealed(&self) -> bool {
        self.lock().sealed
    }

    pub fn len(&self) -> usize {
        self.lock().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SharedBufferState> {
        // A poisoned buffer still holds consistent bytes: every append is a single
        // `extend_from_slice`.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SealingWrite for SharedBuffer {
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        let mut state = self.lock();
        if state.sealed {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "buffer is sealed",
            ));
        }
        state.data.extend_from_slice(buf);
        Ok(())
    }

    fn seal(&mut self) -> std::io::Result<()> {
        self.lock().sealed = true;
        Ok(())
    }
}

impl ReadAt for SharedBuffer {
    fn size(&self) -> std::io::Result<u64> {
        Ok(self.len() as u64)
    }

    /// Ranges reaching past the written bytes are clamped.
    fn read_at(&self, range: Range<u64>) -> std::io::Result<Vec<u8>> {
        verify!(range.end >= range.start);
        let state = self.lock();
        let end = range.end.min(state.data.len() as u64) as usize;
        let start = (range.start as usize).min(end);
        Ok(state.data[start..end].to_vec())
    }
}
