//! Ingestion size ceiling.
//!
//! Documents are buffered whole because the container parser needs random
//! access. The guard rejects an oversize document as early as it can:
//!
//! - a declared length above the limit fails before a single byte is read;
//! - otherwise at most `limit + 1` bytes are read. Reading that extra byte
//!   is what distinguishes "exactly at the limit" from "over the limit"
//!   without knowing the total size up front.

use std::io::Read;

use tracing::debug;

use super::error::{ExtractError, Result};
use super::pool::{BufferPool, Pooled};

/// Default ingestion ceiling (100MB).
pub const MAX_DOCUMENT_BYTES: u64 = 100 * 1024 * 1024;

/// Enforces a byte ceiling while buffering a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeGuard {
    limit: u64,
}

impl Default for SizeGuard {
    fn default() -> Self {
        Self::new(MAX_DOCUMENT_BYTES)
    }
}

impl SizeGuard {
    #[must_use]
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Reject an advertised length above the limit. `None` means unknown.
    pub fn check_declared(&self, declared: Option<u64>) -> Result<()> {
        match declared {
            Some(declared) if declared > self.limit => {
                debug!(declared, limit = self.limit, "rejecting oversize declared length");
                Err(ExtractError::OversizeDeclared {
                    declared,
                    limit: self.limit,
                })
            }
            _ => Ok(()),
        }
    }

    /// Buffer `reader` into a pooled buffer, enforcing the limit.
    pub fn read_from<'p, R: Read>(
        &self,
        reader: R,
        declared: Option<u64>,
        pool: &'p BufferPool<Vec<u8>>,
    ) -> Result<Pooled<'p, Vec<u8>>> {
        self.check_declared(declared)?;

        let mut buf = pool.acquire();
        reader
            .take(self.limit.saturating_add(1))
            .read_to_end(&mut buf)?;

        if buf.len() as u64 > self.limit {
            debug!(limit = self.limit, "document exceeded limit while reading");
            return Err(ExtractError::OversizeActual { limit: self.limit });
        }

        debug!(bytes = buf.len(), "document buffered");
        Ok(buf)
    }

    /// Start an incremental ingestion for bodies that arrive as chunks.
    pub fn ingest<'p>(
        &self,
        declared: Option<u64>,
        pool: &'p BufferPool<Vec<u8>>,
    ) -> Result<Ingest<'p>> {
        self.check_declared(declared)?;
        Ok(Ingest {
            buf: pool.acquire(),
            limit: self.limit,
        })
    }
}

/// An in-progress chunked ingestion. See [`SizeGuard::ingest`].
pub struct Ingest<'p> {
    buf: Pooled<'p, Vec<u8>>,
    limit: u64,
}

impl<'p> Ingest<'p> {
    /// Append a chunk. Fails once more than `limit` bytes have arrived.
    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        let cap = self.limit.saturating_add(1);
        let remaining = cap.saturating_sub(self.buf.len() as u64);
        let take = usize::try_from(remaining).map_or(chunk.len(), |r| r.min(chunk.len()));
        self.buf.extend_from_slice(&chunk[..take]);

        if self.buf.len() as u64 > self.limit {
            debug!(limit = self.limit, "document exceeded limit while streaming");
            return Err(ExtractError::OversizeActual { limit: self.limit });
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish ingestion, handing back the buffered bytes.
    #[must_use]
    pub fn finish(self) -> Pooled<'p, Vec<u8>> {
        self.buf
    }
}
