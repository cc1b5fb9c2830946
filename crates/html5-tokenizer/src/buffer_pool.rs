//! Reusable append-only character buffers (spec §4, component 5; §9).
//!
//! Per spec §9: "a process-wide pool of reusable append-only character
//! buffers keeps per-token allocation cost bounded. Alternative: a single
//! buffer owned by the tokenizer, cleared between tokens." This crate takes
//! the pool approach so the tokenizer can hold more than one buffer
//! checked out at once (e.g. a tag name buffer and a character-reference
//! name buffer simultaneously, during `<a href="&copy">`), without the
//! lifetime gymnastics a self-referential "auto-return on drop" buffer
//! would need. Callers check a buffer out, fill it, and either turn it into
//! an owned `String` for a token payload or explicitly `release` it back.

/// A small free-list of `String` buffers, reused across tokens to avoid
/// reallocating a fresh buffer for every tag name / comment / doctype /
/// character-reference name.
#[derive(Debug, Default)]
pub struct BufferPool {
    free: Vec<String>,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check out a buffer, reusing a previously released allocation when
    /// one is available. The returned buffer is always empty.
    pub fn acquire(&mut self) -> String {
        self.free.pop().unwrap_or_default()
    }

    /// Return a buffer to the pool for reuse. The buffer is cleared (its
    /// capacity is retained) before being added to the free list.
    pub fn release(&mut self, mut buffer: String) {
        buffer.clear();
        self.free.push(buffer);
    }

    /// Number of buffers currently available for reuse (test/debug use).
    pub fn available(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquired_buffer_starts_empty() {
        let mut pool = BufferPool::new();
        let buf = pool.acquire();
        assert!(buf.is_empty());
    }

    #[test]
    fn released_buffer_is_reused_and_cleared() {
        let mut pool = BufferPool::new();
        let mut buf = pool.acquire();
        buf.push_str("hello");
        pool.release(buf);
        assert_eq!(pool.available(), 1);

        let buf2 = pool.acquire();
        assert!(buf2.is_empty(), "reused buffer must be cleared");
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn release_retains_capacity_for_reuse() {
        let mut pool = BufferPool::new();
        let mut buf = pool.acquire();
        buf.push_str("a long string to force an allocation larger than zero");
        let capacity = buf.capacity();
        pool.release(buf);
        let reused = pool.acquire();
        assert!(reused.capacity() >= capacity);
    }
}
