use std::{fmt, io};
use thiserror::Error;

/// Unified error type for the dmerge storage engine.
///
/// Packs are durable on-disk structures, so most variants distinguish between
/// corruption (a descriptor or page that cannot be trusted) and requests that
/// are merely unsatisfiable (an unsupported cast, a missing column). Fatal
/// variants abort the containing read or write; nothing is retried here.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error bubbled up from the page store backend.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A pack descriptor carries a binary version this build does not speak.
    ///
    /// There is no compatibility shim: any version other than the current one
    /// is treated as corruption and the pack is discarded.
    #[error("pack binary version not match: {0}")]
    FormatVersion(u64),

    /// A column meta disagrees with the pack-wide row count.
    #[error("column rows not match: pack has {expected}, column meta declares {got}")]
    RowsMismatch { expected: u64, got: u64 },

    /// A write referenced a column the block or context does not know about.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The on-disk type cannot be read as the requested type.
    ///
    /// Only the enumerated same-sign integer widenings are supported;
    /// everything else, including signed/unsigned crossings, lands here.
    #[error("cast from {from} to {to} is not supported")]
    CastUnsupported { from: String, to: String },

    /// A NULL was found while casting into a non-nullable destination.
    /// Never substituted silently.
    #[error("cast from {from} to {to} with NULL value is not supported")]
    NullInNonNullable { from: String, to: String },

    /// A column's declared default value cannot be materialized as the
    /// column's type. Indicates a DDL bug upstream.
    #[error("invalid default value: {0}")]
    InvalidDefaultValue(String),

    /// The page store could not serve a read or an allocation.
    #[error("page store unavailable: {0}")]
    StorageUnavailable(String),

    /// Rejected input surfaced to the query planner.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// On-disk bytes that cannot be decoded. Fatal to the containing read.
    #[error("corrupted data: {0}")]
    Corrupted(String),
}

impl Error {
    /// Build a [`Error::Corrupted`] from any displayable error.
    #[inline]
    pub fn corrupted<E: fmt::Display>(err: E) -> Self {
        Error::Corrupted(err.to_string())
    }

    /// Build a [`Error::StorageUnavailable`] from any displayable error.
    #[inline]
    pub fn storage<E: fmt::Display>(err: E) -> Self {
        Error::StorageUnavailable(err.to_string())
    }
}
