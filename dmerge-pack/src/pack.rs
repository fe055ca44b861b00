use crate::types::{ColId, Handle};
use dmerge_data_types::{DataType, MinMaxIndex};
use dmerge_result::{Error, Result};
use dmerge_storage::PageId;
use std::sync::Arc;

/// Descriptor of one column within one pack.
///
/// The data-type descriptor and the min/max index are shared-owned: many
/// packs reference the same type object, and ref-packs share their source's
/// index. Neither is mutated after the pack is written.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    pub col_id: ColId,
    pub page_id: PageId,
    pub rows: u64,
    /// On-disk payload size, post-compression.
    pub bytes: u64,
    pub data_type: Arc<DataType>,
    /// Present only for the handle column in the current format.
    pub minmax: Option<Arc<MinMaxIndex>>,
}

/// Immutable descriptor of a contiguous, handle-ordered run of rows.
///
/// A data pack's bounds are inclusive on both ends. A delete-range pack
/// carries no columns and tombstones the half-open interval
/// `[handle_start, handle_end)`; the asymmetry is part of the on-disk
/// contract and must not be normalized away.
#[derive(Debug, Clone, PartialEq)]
pub struct Pack {
    handle_start: Handle,
    handle_end: Handle,
    pub(crate) is_delete_range: bool,
    /// Insertion-ordered: descriptor round-trips are bit-exact only if the
    /// column order is preserved, so no hashed container here.
    columns: Vec<(ColId, ColumnMeta)>,
    /// `None` until the first column meta lands. Zero is a legitimate row
    /// count, so it cannot double as the "not yet established" sentinel.
    rows: Option<u64>,
}

impl Pack {
    /// Descriptor binary version written by this build. Anything else on
    /// disk is rejected; there is no compatibility shim yet.
    pub const CURRENT_VERSION: u64 = 1;

    /// A data pack covering `[handle_start, handle_end]`, columns to follow.
    pub fn new(handle_start: Handle, handle_end: Handle) -> Self {
        debug_assert!(handle_start <= handle_end);
        Self {
            handle_start,
            handle_end,
            is_delete_range: false,
            columns: Vec::new(),
            rows: None,
        }
    }

    /// A tombstone over `[handle_start, handle_end)`. No column data.
    pub fn new_delete_range(handle_start: Handle, handle_end: Handle) -> Self {
        debug_assert!(handle_start <= handle_end);
        Self {
            handle_start,
            handle_end,
            is_delete_range: true,
            columns: Vec::new(),
            rows: None,
        }
    }

    #[inline]
    pub fn handle_first_last(&self) -> (Handle, Handle) {
        (self.handle_start, self.handle_end)
    }

    #[inline]
    pub fn is_delete_range(&self) -> bool {
        self.is_delete_range
    }

    /// The tombstoned interval, half-open. Only meaningful for delete packs.
    #[inline]
    pub fn delete_range(&self) -> (Handle, Handle) {
        debug_assert!(self.is_delete_range);
        (self.handle_start, self.handle_end)
    }

    #[inline]
    pub fn rows(&self) -> u64 {
        self.rows.unwrap_or(0)
    }

    pub fn has_column(&self, col_id: ColId) -> bool {
        self.columns.iter().any(|(id, _)| *id == col_id)
    }

    pub fn get_column(&self, col_id: ColId) -> Option<&ColumnMeta> {
        self.columns
            .iter()
            .find(|(id, _)| *id == col_id)
            .map(|(_, meta)| meta)
    }

    /// Column metas in insertion order.
    pub fn metas(&self) -> &[(ColId, ColumnMeta)] {
        &self.columns
    }

    /// Add a column meta during construction.
    ///
    /// The first meta establishes the pack-wide row count (zero included);
    /// every later one must agree or the pack is corrupt.
    pub fn insert(&mut self, meta: ColumnMeta) -> Result<()> {
        if self.is_delete_range {
            return Err(Error::Corrupted(
                "delete-range pack cannot carry columns".to_string(),
            ));
        }
        if self.has_column(meta.col_id) {
            return Err(Error::Corrupted(format!(
                "duplicate column id {} in pack",
                meta.col_id
            )));
        }
        match self.rows {
            Some(expected) if expected != meta.rows => {
                return Err(Error::RowsMismatch {
                    expected,
                    got: meta.rows,
                });
            }
            _ => self.rows = Some(meta.rows),
        }
        self.columns.push((meta.col_id, meta));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(col_id: ColId, rows: u64) -> ColumnMeta {
        ColumnMeta {
            col_id,
            page_id: (col_id + 100) as u64,
            rows,
            bytes: 64,
            data_type: Arc::new(DataType::Int64),
            minmax: None,
        }
    }

    #[test]
    fn insert_establishes_and_enforces_row_count() {
        let mut pack = Pack::new(0, 9);
        pack.insert(meta(-1, 16)).unwrap();
        assert_eq!(pack.rows(), 16);
        let err = pack.insert(meta(2, 17)).unwrap_err();
        assert!(matches!(
            err,
            Error::RowsMismatch {
                expected: 16,
                got: 17
            }
        ));
    }

    #[test]
    fn zero_rows_establishes_the_row_count() {
        let mut pack = Pack::new(0, 9);
        pack.insert(meta(1, 0)).unwrap();
        assert_eq!(pack.rows(), 0);
        let err = pack.insert(meta(2, 5)).unwrap_err();
        assert!(matches!(err, Error::RowsMismatch { expected: 0, got: 5 }));
    }

    #[test]
    fn zero_rows_after_nonzero_is_rejected() {
        let mut pack = Pack::new(0, 9);
        pack.insert(meta(1, 5)).unwrap();
        let err = pack.insert(meta(2, 0)).unwrap_err();
        assert!(matches!(err, Error::RowsMismatch { expected: 5, got: 0 }));
    }

    #[test]
    fn all_zero_row_columns_are_consistent() {
        let mut pack = Pack::new(0, 9);
        pack.insert(meta(1, 0)).unwrap();
        pack.insert(meta(2, 0)).unwrap();
        assert_eq!(pack.rows(), 0);
        assert_eq!(pack.metas().len(), 2);
    }

    #[test]
    fn duplicate_column_id_is_rejected() {
        let mut pack = Pack::new(0, 9);
        pack.insert(meta(3, 8)).unwrap();
        assert!(pack.insert(meta(3, 8)).is_err());
    }

    #[test]
    fn delete_range_pack_has_no_columns() {
        let mut pack = Pack::new_delete_range(100, 200);
        assert!(pack.is_delete_range());
        assert_eq!(pack.delete_range(), (100, 200));
        assert_eq!(pack.rows(), 0);
        assert!(pack.insert(meta(1, 4)).is_err());
    }

    #[test]
    fn lookup_by_col_id() {
        let mut pack = Pack::new(5, 6);
        pack.insert(meta(-1, 2)).unwrap();
        pack.insert(meta(7, 2)).unwrap();
        assert!(pack.has_column(7));
        assert!(!pack.has_column(8));
        assert_eq!(pack.get_column(-1).unwrap().page_id, 99);
        assert_eq!(pack.metas().len(), 2);
    }
}
