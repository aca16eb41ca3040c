//! Page range scheduling for the extraction worker pool.
//!
//! Splits `num_pages` into at most `min(parallelism, num_pages, ceiling)`
//! contiguous ranges whose sizes differ by at most one. Ranges come out in
//! ascending page order, so worker index `i` always holds pages that precede
//! those of worker `i + 1` and the assembler can merge by index.

use std::ops::Range;

/// Hard upper bound on extraction workers.
pub const MAX_WORKERS: usize = 32;

/// A contiguous block of 1-based page numbers, `start..end_exclusive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end_exclusive: usize,
}

impl PageRange {
    #[must_use]
    pub fn len(&self) -> usize {
        self.end_exclusive - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end_exclusive == self.start
    }

    /// Page numbers in ascending order.
    #[must_use]
    pub fn pages(&self) -> Range<usize> {
        self.start..self.end_exclusive
    }
}

/// Number of workers for a document of `num_pages`.
///
/// Zero pages means zero workers; otherwise at least one.
#[must_use]
pub fn worker_count(num_pages: usize, parallelism: usize, ceiling: usize) -> usize {
    if num_pages == 0 {
        return 0;
    }
    parallelism.max(1).min(num_pages).min(ceiling.max(1))
}

/// Partition pages `1..=num_pages` into balanced contiguous ranges.
///
/// The first `num_pages % workers` ranges receive one extra page.
#[must_use]
pub fn plan_ranges(num_pages: usize, parallelism: usize, ceiling: usize) -> Vec<PageRange> {
    let workers = worker_count(num_pages, parallelism, ceiling);
    if workers == 0 {
        return Vec::new();
    }

    let base = num_pages / workers;
    let extra = num_pages % workers;

    let mut ranges = Vec::with_capacity(workers);
    let mut start = 1;
    for idx in 0..workers {
        let count = if idx < extra { base + 1 } else { base };
        ranges.push(PageRange {
            start,
            end_exclusive: start + count,
        });
        start += count;
    }
    ranges
}
