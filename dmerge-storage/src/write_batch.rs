use crate::pager::BatchPut;
use crate::types::PageId;

/// A group of page-store mutations committed as one atomic unit.
///
/// The write path stages every column page (and ref page) here before the
/// owning descriptor becomes visible in any manifest; committing the batch is
/// what makes the pages durable.
#[derive(Debug, Default)]
pub struct WriteBatch {
    puts: Vec<BatchPut>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `bytes` to be stored under `page_id`.
    pub fn put_page(&mut self, page_id: PageId, bytes: Vec<u8>) {
        self.puts.push(BatchPut::Raw { page_id, bytes });
    }

    /// Stage a zero-copy reference from `page_id` to `target_page_id`.
    pub fn put_ref_page(&mut self, page_id: PageId, target_page_id: PageId) {
        self.puts.push(BatchPut::Ref {
            page_id,
            target_page_id,
        });
    }

    pub fn len(&self) -> usize {
        self.puts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puts.is_empty()
    }

    pub fn into_puts(self) -> Vec<BatchPut> {
        self.puts
    }
}
