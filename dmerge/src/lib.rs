//! dmerge: the pack layer of a delta-merge columnar storage engine.
//!
//! This crate is the single entrypoint over the `dmerge-*` workspace. A
//! *pack* is the immutable on-disk unit: a contiguous, handle-ordered run of
//! rows whose columns are keyed to opaque pages in a page store, described by
//! a small versioned binary descriptor. The workspace splits the concern into
//! layers so higher crates only depend on the ones below:
//!
//! - [`dmerge_result`]: the unified error enum and `Result` alias.
//! - [`dmerge_storage`]: the pager surface the external page store must
//!   provide (batched reads, atomic write batches, reference pages) plus an
//!   in-memory implementation for tests and benchmarks.
//! - [`dmerge_data_types`]: the closed data-type universe, in-memory columns,
//!   the bulk multi-stream codec behind column pages, and the min/max index.
//! - [`dmerge_pack`]: pack descriptors and their codec, the write path, the
//!   ref-pack factory, and the schema-evolving read path.
//!
//! Schema evolution is applied on read: packs are never rewritten in place.
//! A reader may see columns the pack predates (filled from defaults) or
//! columns whose on-disk integer type is narrower than the declared one
//! (widened on the fly, same sign only).

pub use dmerge_data_types as data_types;
pub use dmerge_pack as pack;
pub use dmerge_result as result;
pub use dmerge_storage as storage;

pub use dmerge_data_types::{Column, DataType, MinMaxIndex, Value};
pub use dmerge_pack::{
    Block, ColumnDefine, ColumnMeta, DmContext, EXTRA_HANDLE_COLUMN_ID, Pack, create_ref_pack,
    create_ref_packs, prepare_pack_write, read_pack,
};
pub use dmerge_result::{Error, Result};
pub use dmerge_storage::{MemPager, PageReader, Pager, WriteBatch};
