//! Data type descriptors and in-memory columns for the dmerge pack layer.
//!
//! [`DataType`] is a closed tagged variant over the concrete type
//! descriptors; nullability is a wrapper variant carrying the inner type.
//! Each type knows its canonical name (with [`DataType::from_name`] as the
//! exact inverse), how to create and fill columns, and how to stream a column
//! window through the bulk multi-stream codec that backs column pages.
//!
//! The crate also owns the compressed page frame ([`compress`]) and the
//! min/max index ([`MinMaxIndex`]) whose binary layout is delegated to the
//! indexed type.

pub mod codec;
pub mod column;
pub mod compress;
pub mod data_type;
pub mod minmax;
pub mod value;

mod bulk;

pub use column::{Column, NullableColumn, StringColumn};
pub use compress::{CompressionMethod, compress_frame, decompress_frame};
pub use data_type::DataType;
pub use minmax::MinMaxIndex;
pub use value::Value;
