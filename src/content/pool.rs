//! Scratch buffer pools for document ingestion and per-range text.
//!
//! A [`BufferPool`] is a mutex-protected free list owned by a long-lived
//! extractor. [`BufferPool::acquire`] hands out a [`Pooled`] guard that
//! derefs to the buffer and, on drop, clears it and pushes it back. Guards
//! return their buffer on every exit path, including early `?` returns.
//!
//! # Example
//!
//! ```rust
//! use webfetch::content::pool::BufferPool;
//!
//! let pool: BufferPool<String> = BufferPool::new(1024);
//! {
//!     let mut buf = pool.acquire();
//!     buf.push_str("## Page 1\n\n");
//!     assert!(buf.capacity() >= 1024);
//! }
//! assert_eq!(pool.idle(), 1);
//! ```

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

/// Initial capacity for whole-document ingestion buffers (1MB).
pub const DOCUMENT_BUFFER_CAPACITY: usize = 1024 * 1024;

/// Initial capacity for per-range text buffers (1KB).
pub const RANGE_BUFFER_CAPACITY: usize = 1024;

/// Idle buffers kept per pool; extras are dropped on release.
const DEFAULT_MAX_IDLE: usize = 64;

/// A growable buffer that can be cleared for reuse.
///
/// `Default` must not allocate; it stands in for the buffer while it is
/// being handed back to the pool.
pub trait Scratch: Send + Default {
    fn with_capacity(capacity: usize) -> Self;
    /// Clear contents, keeping the allocation.
    fn reset(&mut self);
}

impl Scratch for Vec<u8> {
    fn with_capacity(capacity: usize) -> Self {
        Vec::with_capacity(capacity)
    }

    fn reset(&mut self) {
        self.clear();
    }
}

impl Scratch for String {
    fn with_capacity(capacity: usize) -> Self {
        String::with_capacity(capacity)
    }

    fn reset(&mut self) {
        self.clear();
    }
}

/// Free list of reusable buffers of one kind.
pub struct BufferPool<T: Scratch> {
    free: Mutex<Vec<T>>,
    initial_capacity: usize,
    max_idle: usize,
}

impl<T: Scratch> BufferPool<T> {
    /// Create an empty pool whose fresh buffers start at `initial_capacity`.
    #[must_use]
    pub fn new(initial_capacity: usize) -> Self {
        Self::with_max_idle(initial_capacity, DEFAULT_MAX_IDLE)
    }

    #[must_use]
    pub fn with_max_idle(initial_capacity: usize, max_idle: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            initial_capacity,
            max_idle,
        }
    }

    /// Take a cleared buffer from the pool, allocating if none is idle.
    pub fn acquire(&self) -> Pooled<'_, T> {
        let reused = self.lock().pop();
        let buf = reused.unwrap_or_else(|| T::with_capacity(self.initial_capacity));
        Pooled { pool: self, buf }
    }

    /// Number of idle buffers currently held.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, mut buf: T) {
        buf.reset();
        let mut free = self.lock();
        if free.len() < self.max_idle {
            free.push(buf);
        }
    }

    // A panic while holding the lock cannot leave the free list in a bad
    // state, so poisoning is ignored.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<T>> {
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A buffer on loan from a [`BufferPool`]; returned on drop.
pub struct Pooled<'a, T: Scratch> {
    pool: &'a BufferPool<T>,
    buf: T,
}

impl<T: Scratch> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.buf
    }
}

impl<T: Scratch> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.buf
    }
}

impl<T: Scratch> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_allocates_with_initial_capacity() {
        let pool: BufferPool<Vec<u8>> = BufferPool::new(4096);
        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 4096);
    }

    #[test]
    fn dropped_buffer_is_cleared_and_reused() {
        let pool: BufferPool<String> = BufferPool::new(16);
        {
            let mut buf = pool.acquire();
            buf.push_str(&"x".repeat(100));
        }
        assert_eq!(pool.idle(), 1);

        let buf = pool.acquire();
        assert!(buf.is_empty(), "reused buffer must be reset");
        assert!(buf.capacity() >= 100, "reused buffer keeps its allocation");
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn buffer_returns_on_early_error() {
        fn fails(pool: &BufferPool<Vec<u8>>) -> Result<(), &'static str> {
            let mut buf = pool.acquire();
            buf.extend_from_slice(b"partial");
            if !buf.is_empty() {
                return Err("boom");
            }
            Ok(())
        }

        let pool = BufferPool::new(8);
        assert!(fails(&pool).is_err());
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn idle_count_is_bounded() {
        let pool: BufferPool<String> = BufferPool::with_max_idle(8, 2);
        let held: Vec<_> = (0..5).map(|_| pool.acquire()).collect();
        drop(held);
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn concurrent_acquire_release() {
        let pool: BufferPool<String> = BufferPool::new(32);
        std::thread::scope(|s| {
            for i in 0..8 {
                let pool = &pool;
                s.spawn(move || {
                    for _ in 0..100 {
                        let mut buf = pool.acquire();
                        buf.push_str(&i.to_string());
                        assert_eq!(buf.as_str(), i.to_string());
                    }
                });
            }
        });
        assert!(pool.idle() <= 8);
    }

    #[test]
    fn release_hands_back_the_loaned_allocation() {
        let pool: BufferPool<Vec<u8>> = BufferPool::new(0);
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(&[1u8; 512]);
        }
        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 512, "pool must not keep the empty placeholder");
    }
}
