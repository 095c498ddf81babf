use bytes::{Bytes, BytesMut};

use crate::error::{BufError, Result};

const INITIAL_CAPACITY: usize = 256;

/// An append-only output buffer with a seekable logical write cursor.
///
/// The store is a single growable contiguous buffer. Writing at the end
/// appends; writing after a backward [`ByteSink::seek`] overwrites in place.
/// This is what lets an encoder reserve a length slot, write a field body,
/// then come back and patch the slot without a second buffer.
///
/// The cursor may be moved forward past the written length with
/// [`ByteSink::advance`]; a write issued from such a position would leave a
/// gap of undefined bytes and fails with [`BufError::WriteGap`].
#[derive(Debug, Default)]
pub struct ByteSink {
    buf: BytesMut,
    pos: usize,
}

impl ByteSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Create an empty sink with a pre-allocated store.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            pos: 0,
        }
    }

    /// Current logical write position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes actually written so far.
    pub fn written_len(&self) -> usize {
        self.buf.len()
    }

    /// Write `bytes` at the current position and advance past them.
    ///
    /// Bytes that fall inside the already-written region overwrite in place;
    /// the remainder appends.
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if self.pos > self.buf.len() {
            return Err(BufError::WriteGap {
                position: self.pos,
                length: self.buf.len(),
            });
        }
        let overlap = bytes.len().min(self.buf.len() - self.pos);
        self.buf[self.pos..self.pos + overlap].copy_from_slice(&bytes[..overlap]);
        self.buf.extend_from_slice(&bytes[overlap..]);
        self.pos += bytes.len();
        Ok(())
    }

    /// Reposition the logical cursor without truncating written data.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Move the logical cursor forward by `count` bytes without writing.
    ///
    /// Used after a seek-then-overwrite to skip back past a body that was
    /// already written, so subsequent writes append after it.
    pub fn advance(&mut self, count: usize) {
        self.pos += count;
    }

    /// An independent immutable copy of everything written so far.
    pub fn snapshot(&self) -> Bytes {
        Bytes::copy_from_slice(&self.buf)
    }

    /// Consume the sink, freezing the written bytes.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_writes_append() {
        let mut sink = ByteSink::new();
        sink.write(b"abc").unwrap();
        sink.write(b"def").unwrap();
        assert_eq!(sink.position(), 6);
        assert_eq!(sink.into_bytes().as_ref(), b"abcdef");
    }

    #[test]
    fn seek_back_overwrites_in_place() {
        let mut sink = ByteSink::new();
        sink.write(b"\0\0\0\0body").unwrap();
        sink.seek(0);
        sink.write(b"1234").unwrap();
        sink.advance(4);
        sink.write(b"!").unwrap();
        assert_eq!(sink.position(), 9);
        assert_eq!(sink.into_bytes().as_ref(), b"1234body!");
    }

    #[test]
    fn overwrite_straddling_the_end_extends() {
        let mut sink = ByteSink::new();
        sink.write(b"abcd").unwrap();
        sink.seek(2);
        sink.write(b"XYZ").unwrap();
        assert_eq!(sink.written_len(), 5);
        assert_eq!(sink.into_bytes().as_ref(), b"abXYZ");
    }

    #[test]
    fn write_past_written_length_is_a_gap() {
        let mut sink = ByteSink::new();
        sink.write(b"ab").unwrap();
        sink.advance(3);
        let err = sink.write(b"x").unwrap_err();
        assert!(matches!(err, BufError::WriteGap { position: 5, length: 2 }));
    }

    #[test]
    fn snapshot_is_independent() {
        let mut sink = ByteSink::new();
        sink.write(b"abc").unwrap();
        let snap = sink.snapshot();
        sink.write(b"def").unwrap();
        assert_eq!(snap.as_ref(), b"abc");
        assert_eq!(sink.snapshot().as_ref(), b"abcdef");
    }
}
