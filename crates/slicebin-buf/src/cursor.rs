use bytes::Bytes;

use crate::error::{BufError, Result};

/// A bounds-checked read cursor over an immutable byte buffer.
///
/// The cursor holds a cheaply-cloneable view of the buffer, never a copy.
/// Every failed movement leaves the position unchanged, so a caller that
/// catches an error can still trust the cursor's position.
#[derive(Debug, Clone)]
pub struct ByteCursor {
    buf: Bytes,
    pos: usize,
}

impl ByteCursor {
    /// Create a cursor positioned at the start of `buf`.
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self {
            buf: buf.into(),
            pos: 0,
        }
    }

    /// Current read position, in `[0, len]`.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total buffer length.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of bytes left to read.
    pub fn unread_len(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Whether no further bytes are available.
    pub fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Read the next `size` bytes as a view and advance past them.
    pub fn read(&mut self, size: usize) -> Result<Bytes> {
        let view = self.peek(size)?;
        self.pos += size;
        Ok(view)
    }

    /// Read the next `size` bytes as a view without advancing.
    pub fn peek(&self, size: usize) -> Result<Bytes> {
        if self.pos + size > self.buf.len() {
            return Err(BufError::ReadPastEnd {
                position: self.pos,
                requested: size,
                length: self.buf.len(),
            });
        }
        Ok(self.buf.slice(self.pos..self.pos + size))
    }

    /// Peek the next byte without advancing.
    pub fn peek_u8(&self) -> Result<u8> {
        if self.pos >= self.buf.len() {
            return Err(BufError::ReadPastEnd {
                position: self.pos,
                requested: 1,
                length: self.buf.len(),
            });
        }
        Ok(self.buf[self.pos])
    }

    /// Read exactly `N` bytes into an array and advance past them.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let view = self.peek(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&view);
        self.pos += N;
        Ok(out)
    }

    /// Set the position to `pos`.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.buf.len() {
            return Err(BufError::SeekOutOfRange {
                target: pos,
                length: self.buf.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Move the position forward by `count` bytes without reading.
    pub fn advance(&mut self, count: usize) -> Result<()> {
        let target = self.pos + count;
        if target > self.buf.len() {
            return Err(BufError::SeekOutOfRange {
                target,
                length: self.buf.len(),
            });
        }
        self.pos = target;
        Ok(())
    }

    /// Move the position backward by `count` bytes.
    pub fn rewind(&mut self, count: usize) -> Result<()> {
        if count > self.pos {
            return Err(BufError::RewindPastStart {
                position: self.pos,
                count,
            });
        }
        self.pos -= count;
        Ok(())
    }

    /// A view of all remaining unread bytes, after checking that at least
    /// `min` of them are available. The position does not move; callers that
    /// consume part of the view follow up with [`ByteCursor::advance`].
    pub fn unread_view(&self, min: usize) -> Result<Bytes> {
        if self.unread_len() < min {
            return Err(BufError::ReadPastEnd {
                position: self.pos,
                requested: min,
                length: self.buf.len(),
            });
        }
        Ok(self.buf.slice(self.pos..))
    }
}
