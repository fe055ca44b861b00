//! Core identifier types of the pack layer.

/// Primary-key integer of a row. Handles are monotonically ordered within a
/// table; a pack only asserts that its rows lie inside its handle bounds.
pub type Handle = i64;

/// Stable column identifier; survives renames.
pub type ColId = i64;
