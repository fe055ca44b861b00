//! The pack layer of the dmerge delta-merge storage engine.
//!
//! A pack is the immutable on-disk unit grouping a contiguous, handle-ordered
//! run of rows, keyed per-column to opaque pages in the external page store.
//! This crate owns the versioned pack descriptor format, the write path that
//! turns a row block into column pages plus a descriptor, the zero-copy
//! ref-pack factory, and the read path that materializes columns back,
//! filling columns added by DDL from their defaults and applying the
//! enumerated integer-widening casts when the on-disk type no longer matches
//! the reader's.
//!
//! Packs are plain value objects: once constructed they are safe to read from
//! any number of threads, and nothing here spawns threads or retries I/O.

pub mod block;
pub mod cast;
pub mod constants;
pub mod context;
pub mod field_type;
pub mod pack;
pub mod read;
pub mod serialization;
pub mod types;
pub mod write;

pub use block::{Block, ColumnDefine, ColumnWithTypeAndName};
pub use cast::{cast_column, is_supported_cast};
pub use constants::EXTRA_HANDLE_COLUMN_ID;
pub use context::DmContext;
pub use pack::{ColumnMeta, Pack};
pub use read::{read_pack, read_pack_data};
pub use serialization::{deserialize_packs, serialize_packs};
pub use types::{ColId, Handle};
pub use write::{create_ref_pack, create_ref_packs, prepare_pack_write, serialize_column};
