//! Bounded stream-to-stream copying.
//!
//! File bodies are moved between streams in fixed-size chunks. A copy
//! either transfers exactly the requested number of bytes or fails; there
//! is no partial-success return.

use crate::error::{PboError, Result};
use std::io::{self, Read, Write};

/// Size of the intermediate copy buffer.
pub const COPY_BUFFER_SIZE: usize = 32 * 1024;

/// Reusable copier owning its intermediate buffer.
pub struct DataMover {
    buffer: Box<[u8]>,
}

impl DataMover {
    /// Create a mover with the default buffer size.
    pub fn new() -> Self {
        Self::with_buffer_size(COPY_BUFFER_SIZE)
    }

    /// Create a mover with a custom buffer size (at least one byte).
    pub fn with_buffer_size(size: usize) -> Self {
        Self {
            buffer: vec![0u8; size.max(1)].into_boxed_slice(),
        }
    }

    /// Buffer size in bytes.
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Move exactly `len` bytes from `source` to `destination`.
    ///
    /// A source that runs dry before `len` bytes is an
    /// [`PboError::UnexpectedEof`]; write failures propagate as
    /// [`PboError::Io`].
    pub fn copy<R, W>(&mut self, source: &mut R, destination: &mut W, len: u64) -> Result<u64>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let mut remaining = len;

        while remaining > 0 {
            let chunk = remaining.min(self.buffer.len() as u64) as usize;
            let buf = &mut self.buffer[..chunk];

            source.read_exact(buf).map_err(|e| {
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    PboError::unexpected_eof(remaining)
                } else {
                    PboError::Io(e)
                }
            })?;
            destination.write_all(buf)?;

            remaining -= chunk as u64;
        }

        tracing::trace!(bytes = len, "copied body");
        Ok(len)
    }
}

impl Default for DataMover {
    fn default() -> Self {
        Self::new()
    }
}

/// Move exactly `len` bytes using a fresh [`DataMover`].
pub fn copy_exact<R, W>(source: &mut R, destination: &mut W, len: u64) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    DataMover::new().copy(source, destination, len)
}
