use super::{BatchGet, BatchPut, GetResult, Pager};
use crate::types::PageId;
use dmerge_result::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A thread-safe container for I/O statistics.
#[derive(Debug, Default)]
pub struct IoStats {
    // Total individual items.
    pub physical_gets: AtomicU64,
    pub physical_puts: AtomicU64,
    pub physical_frees: AtomicU64,
    pub physical_allocs: AtomicU64,

    // Total batch operations (i.e. calls into the pager).
    pub get_batches: AtomicU64,
    pub put_batches: AtomicU64,
}

/// Point-in-time copy of [`IoStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoStatsSnapshot {
    pub physical_gets: u64,
    pub physical_puts: u64,
    pub physical_frees: u64,
    pub physical_allocs: u64,
    pub get_batches: u64,
    pub put_batches: u64,
}

impl IoStats {
    /// Capture a point-in-time snapshot of the accumulated metrics.
    pub fn snapshot(&self) -> IoStatsSnapshot {
        IoStatsSnapshot {
            physical_gets: self.physical_gets.load(Ordering::Relaxed),
            physical_puts: self.physical_puts.load(Ordering::Relaxed),
            physical_frees: self.physical_frees.load(Ordering::Relaxed),
            physical_allocs: self.physical_allocs.load(Ordering::Relaxed),
            get_batches: self.get_batches.load(Ordering::Relaxed),
            put_batches: self.put_batches.load(Ordering::Relaxed),
        }
    }

    /// Reset all statistics to zero.
    pub fn reset(&self) {
        self.physical_gets.store(0, Ordering::Relaxed);
        self.physical_puts.store(0, Ordering::Relaxed);
        self.physical_frees.store(0, Ordering::Relaxed);
        self.physical_allocs.store(0, Ordering::Relaxed);
        self.get_batches.store(0, Ordering::Relaxed);
        self.put_batches.store(0, Ordering::Relaxed);
    }
}

/// Wraps any [`Pager`] and counts the physical I/O that flows through it.
///
/// Used by tests to assert I/O behavior, e.g. that a column filled from its
/// default value never touches the page store.
pub struct InstrumentedPager<P: Pager> {
    inner: P,
    stats: Arc<IoStats>,
}

impl<P: Pager> InstrumentedPager<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            stats: Arc::new(IoStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<IoStats> {
        Arc::clone(&self.stats)
    }
}

impl<P: Pager> Pager for InstrumentedPager<P> {
    type Blob = P::Blob;

    fn alloc_many(&self, n: usize) -> Result<Vec<PageId>> {
        self.stats
            .physical_allocs
            .fetch_add(n as u64, Ordering::Relaxed);
        self.inner.alloc_many(n)
    }

    fn batch_get(&self, gets: &[BatchGet]) -> Result<Vec<GetResult<Self::Blob>>> {
        self.stats.get_batches.fetch_add(1, Ordering::Relaxed);
        self.stats
            .physical_gets
            .fetch_add(gets.len() as u64, Ordering::Relaxed);
        self.inner.batch_get(gets)
    }

    fn batch_put(&self, puts: &[BatchPut]) -> Result<()> {
        self.stats.put_batches.fetch_add(1, Ordering::Relaxed);
        self.stats
            .physical_puts
            .fetch_add(puts.len() as u64, Ordering::Relaxed);
        self.inner.batch_put(puts)
    }

    fn free_many(&self, page_ids: &[PageId]) -> Result<()> {
        self.stats
            .physical_frees
            .fetch_add(page_ids.len() as u64, Ordering::Relaxed);
        self.inner.free_many(page_ids)
    }
}
