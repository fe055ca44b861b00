//! Page store abstractions consumed by the pack layer.
//!
//! The physical page store lives outside this workspace; what the pack layer
//! needs from it is small: allocate page ids, commit batches of page writes
//! atomically, and serve batched random reads. [`pager::Pager`] captures that
//! surface, [`pager::MemPager`] implements it in memory for tests and
//! benchmarks, and [`pager::InstrumentedPager`] wraps any implementation with
//! I/O counters.

pub mod pager;
pub mod reader;
pub mod types;
pub mod write_batch;

pub use pager::{BatchGet, BatchPut, GetResult, InstrumentedPager, MemPager, Pager};
pub use reader::{Page, PageReader};
pub use types::PageId;
pub use write_batch::WriteBatch;
