use crate::types::ColId;

/// Well-known column id of the hidden handle column.
///
/// The pack builder keys its min/max indexing decision off this sentinel;
/// only the handle column carries an index in the current format.
pub const EXTRA_HANDLE_COLUMN_ID: ColId = -1;

/// Conventional name of the hidden handle column.
pub const EXTRA_HANDLE_COLUMN_NAME: &str = "_extra_handle";
