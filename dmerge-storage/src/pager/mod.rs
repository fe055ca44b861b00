//! Minimal pager trait + in-memory implementation returning `Bytes` blobs.
//!
//! Returning [`bytes::Bytes`] lets readers keep decompressing straight out of
//! refcounted pager memory, and makes reference pages cheap: a ref page is a
//! second handle on the same blob, so freeing the original page id does not
//! invalidate readers holding the reference.

use crate::types::PageId;
use crate::write_batch::WriteBatch;
use dmerge_result::Result;

pub mod instrumented_pager;
pub use instrumented_pager::*;

pub mod mem_pager;
pub use mem_pager::*;

#[derive(Clone, Debug)]
pub enum BatchPut {
    /// Store `bytes` under `page_id`.
    Raw { page_id: PageId, bytes: Vec<u8> },
    /// Make `page_id` a zero-copy reference to `target_page_id`'s data.
    /// The target must already exist, or precede this entry in the batch.
    Ref {
        page_id: PageId,
        target_page_id: PageId,
    },
}

#[derive(Clone, Copy, Debug)]
pub enum BatchGet {
    Raw { page_id: PageId },
}

#[derive(Clone, Debug)]
pub enum GetResult<B> {
    Raw { page_id: PageId, bytes: B },
    Missing { page_id: PageId },
}

pub trait Pager: Send + Sync + 'static {
    type Blob: AsRef<[u8]> + Clone + Send + Sync + 'static;

    /// Allocate `n` fresh page ids. Monotonic; never reused.
    fn alloc_many(&self, n: usize) -> Result<Vec<PageId>>;

    /// Batch get blobs; returns one `GetResult` per request in order.
    fn batch_get(&self, gets: &[BatchGet]) -> Result<Vec<GetResult<Self::Blob>>>;

    /// Apply a batch of puts as one atomic unit.
    fn batch_put(&self, puts: &[BatchPut]) -> Result<()>;

    /// Batch free page ids (best-effort). Implementations may ignore unknown
    /// ids. Blobs still referenced through ref pages stay readable.
    fn free_many(&self, page_ids: &[PageId]) -> Result<()>;

    /// Commit a [`WriteBatch`] built by the write path.
    fn commit(&self, wb: WriteBatch) -> Result<()> {
        self.batch_put(&wb.into_puts())
    }
}
