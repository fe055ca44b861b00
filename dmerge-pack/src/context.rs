use crate::block::ColumnDefine;
use crate::types::ColId;
use rustc_hash::FxHashSet;

/// Write-path configuration for one delta-merge store.
///
/// Carries the handle column's define, the full list of columns persisted per
/// pack, and the set of columns stored without compression.
#[derive(Debug, Clone)]
pub struct DmContext {
    pub handle_column: ColumnDefine,
    pub store_columns: Vec<ColumnDefine>,
    pub not_compress: FxHashSet<ColId>,
}

impl DmContext {
    pub fn new(handle_column: ColumnDefine, store_columns: Vec<ColumnDefine>) -> Self {
        Self {
            handle_column,
            store_columns,
            not_compress: FxHashSet::default(),
        }
    }
}
