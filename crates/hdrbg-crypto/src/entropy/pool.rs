//! FIFO buffer for conditioned entropy bytes.
//!
//! Conditioned output arrives in 32-byte blocks while requests come in
//! arbitrary sizes; the pool holds the surplus until the next request.
//! Consumed and dropped bytes are zeroed.

use zeroize::Zeroize;

/// Byte FIFO that zeroes everything it gives up.
#[derive(Default)]
pub struct EntropyPool {
    buf: Vec<u8>,
    head: usize,
}

impl EntropyPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `data` behind the bytes already queued.
    pub fn push(&mut self, data: &[u8]) {
        self.compact();
        self.buf.extend_from_slice(data);
    }

    /// Move up to `out.len()` bytes out of the pool; returns how many.
    pub fn pop(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.len());
        let taken = &mut self.buf[self.head..self.head + n];
        out[..n].copy_from_slice(taken);
        taken.zeroize();
        self.head += n;
        n
    }

    pub fn len(&self) -> usize {
        self.buf.len() - self.head
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the consumed prefix so the buffer does not grow without bound.
    fn compact(&mut self) {
        if self.head == 0 {
            return;
        }
        let live = self.len();
        self.buf.copy_within(self.head.., 0);
        self.buf[live..].zeroize();
        self.buf.truncate(live);
        self.head = 0;
    }
}

impl Drop for EntropyPool {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}
