//! Accumulation buffer for partially parsed input.
//!
//! Bytes read from the transport are appended at the tail of a [`ByteWindow`];
//! the parser reports how many bytes at the head it consumed and the window
//! slides past them. Memory therefore tracks the largest unconsumed residue
//! (typically one unterminated line or an incomplete body), not the whole
//! message.
//!
//! When the window is full its capacity is at least doubled before the next read, so
//! appending `n` bytes costs amortized O(n) regardless of how the transport
//! fragments them.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Smallest capacity the window grows from.
const MIN_CAPACITY: usize = 8;

#[derive(Debug)]
pub struct ByteWindow {
    buf: BytesMut,
}

impl ByteWindow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity.max(MIN_CAPACITY)),
        }
    }

    /// Unconsumed bytes, oldest first.
    pub fn filled(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Appends bytes directly, growing as needed.
    pub fn push(&mut self, data: &[u8]) {
        if self.buf.capacity() - self.buf.len() < data.len() {
            self.grow(data.len());
        }
        self.buf.extend_from_slice(data);
    }

    /// Performs one read from `reader` into the free tail of the window.
    ///
    /// Returns the number of bytes read; `0` means end of stream.
    pub async fn fill_from<R>(&mut self, reader: &mut R) -> std::io::Result<usize>
    where
        R: AsyncRead + Unpin,
    {
        if self.buf.len() == self.buf.capacity() {
            self.grow(1);
        }
        reader.read_buf(&mut self.buf).await
    }

    /// Discards `consumed` bytes from the head of the window.
    ///
    /// Sliding past everything resets the window to empty while keeping its
    /// allocation.
    pub fn slide(&mut self, consumed: usize) {
        let consumed = consumed.min(self.buf.len());
        self.buf.advance(consumed);
    }

    /// Ensures room for `needed` more bytes, at least doubling capacity.
    fn grow(&mut self, needed: usize) {
        // `reserve` counts from `len`, not from the current capacity.
        let len = self.buf.len();
        let target = (self.buf.capacity() * 2)
            .max(len + needed)
            .max(MIN_CAPACITY);
        self.buf.reserve(target - len);
    }
}

impl Default for ByteWindow {
    fn default() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }
}
