//! Error and result definitions for the dmerge storage engine.
//!
//! Every crate in the workspace returns the unified [`Error`] enum so that
//! failures propagate across crate boundaries with the `?` operator and can
//! still be matched structurally at the top of a read or write request. The
//! pack subsystem never retries internally and never swallows an error;
//! retry policy belongs to the caller.

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
