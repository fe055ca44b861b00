use super::*;
use crate::types::PageId;
use bytes::Bytes;
use dmerge_result::{Error, Result};
use rustc_hash::FxHashMap;
use std::sync::RwLock;

/// In-memory pager used for tests/benchmarks.
///
/// The id allocator and the page table live together under one lock, so a
/// committing batch resolves its ref pages against the same state it inserts
/// into. Ref pages resolve to a clone of the target's `Bytes` handle, so the
/// data stays alive as long as any page id still points at it, matching the
/// refcounting behavior of the real page store.
#[allow(clippy::module_name_repetitions)]
pub struct MemPager {
    state: RwLock<MemPagerState>,
}

struct MemPagerState {
    next_page_id: PageId,
    pages: FxHashMap<PageId, Bytes>,
}

impl Default for MemPager {
    fn default() -> Self {
        Self::new()
    }
}

impl MemPager {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemPagerState {
                next_page_id: 1,
                pages: FxHashMap::default(),
            }),
        }
    }
}

impl Pager for MemPager {
    type Blob = Bytes;

    fn alloc_many(&self, n: usize) -> Result<Vec<PageId>> {
        let mut state = self.state.write().expect("MemPager state lock poisoned");
        let start = state.next_page_id;
        let end = start
            .checked_add(n as u64)
            .ok_or_else(|| Error::StorageUnavailable("page id space exhausted".to_string()))?;
        state.next_page_id = end;
        Ok((start..end).collect())
    }

    fn batch_put(&self, puts: &[BatchPut]) -> Result<()> {
        let mut state = self.state.write().expect("MemPager state lock poisoned");
        for p in puts {
            match p {
                BatchPut::Raw { page_id, bytes } => {
                    state.pages.insert(*page_id, Bytes::from(bytes.clone()));
                }
                BatchPut::Ref {
                    page_id,
                    target_page_id,
                } => {
                    // Within a batch, refs may target pages put earlier in the
                    // same batch; entries are applied in order.
                    let target = state.pages.get(target_page_id).cloned().ok_or_else(|| {
                        Error::StorageUnavailable(format!(
                            "ref page {page_id} targets unknown page {target_page_id}"
                        ))
                    })?;
                    state.pages.insert(*page_id, target);
                }
            }
        }
        Ok(())
    }

    fn batch_get(&self, gets: &[BatchGet]) -> Result<Vec<GetResult<Self::Blob>>> {
        let state = self.state.read().expect("MemPager state lock poisoned");
        Ok(gets
            .iter()
            .map(|&BatchGet::Raw { page_id }| match state.pages.get(&page_id) {
                Some(bytes) => GetResult::Raw {
                    page_id,
                    bytes: bytes.clone(),
                },
                None => GetResult::Missing { page_id },
            })
            .collect())
    }

    fn free_many(&self, page_ids: &[PageId]) -> Result<()> {
        let mut state = self.state.write().expect("MemPager state lock poisoned");
        for page_id in page_ids {
            state.pages.remove(page_id);
        }
        Ok(())
    }
}
