//! Core type definitions for the page store surface.

/// Opaque 64-bit page identifier in the page store namespace.
/// Unique per write; treated as an opaque handle by higher layers.
pub type PageId = u64;
