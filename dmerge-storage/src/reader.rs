use crate::pager::{BatchGet, GetResult, Pager};
use crate::types::PageId;
use dmerge_result::{Error, Result};

/// One page as served by the page store.
#[derive(Clone, Debug)]
pub struct Page<B> {
    pub page_id: PageId,
    pub data: B,
}

/// Batched random reader over a [`Pager`].
///
/// `read` fetches all requested pages in one pager round trip and invokes the
/// handler once per page. Handler invocation order is unspecified; callers
/// must route each page to its own destination.
pub struct PageReader<'a, P: Pager> {
    pager: &'a P,
}

impl<'a, P: Pager> PageReader<'a, P> {
    pub fn new(pager: &'a P) -> Self {
        Self { pager }
    }

    pub fn read<F>(&self, page_ids: &[PageId], mut handler: F) -> Result<()>
    where
        F: FnMut(&Page<P::Blob>) -> Result<()>,
    {
        if page_ids.is_empty() {
            return Ok(());
        }
        let gets: Vec<BatchGet> = page_ids
            .iter()
            .map(|&page_id| BatchGet::Raw { page_id })
            .collect();
        for result in self.pager.batch_get(&gets)? {
            match result {
                GetResult::Raw { page_id, bytes } => {
                    handler(&Page {
                        page_id,
                        data: bytes,
                    })?;
                }
                GetResult::Missing { page_id } => {
                    return Err(Error::StorageUnavailable(format!(
                        "page {page_id} not found"
                    )));
                }
            }
        }
        Ok(())
    }
}
