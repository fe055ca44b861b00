//! Field types of scan outputs, as consumed by downstream query planning.
//!
//! Table scans synthesize their output field types from the stored column
//! info; aggregations take the field type each aggregate / group-by
//! expression declares, and an expression without a valid field type is
//! rejected before planning proceeds.

use dmerge_result::{Error, Result};

/// Wire-level type tag meaning "no type declared".
pub const TYPE_UNSPECIFIED: i32 = 0;

/// Column metadata as recorded in table info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnInfo {
    pub tp: i32,
    pub flag: u32,
    pub flen: i32,
    pub decimal: i32,
}

/// Declared type of one expression or scan output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldType {
    pub tp: i32,
    pub flag: u32,
    pub flen: i32,
    pub decimal: i32,
}

impl FieldType {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.tp != TYPE_UNSPECIFIED
    }
}

impl From<&ColumnInfo> for FieldType {
    fn from(ci: &ColumnInfo) -> Self {
        FieldType {
            tp: ci.tp,
            flag: ci.flag,
            flen: ci.flen,
            decimal: ci.decimal,
        }
    }
}

/// Output field types of a table scan, one per stored column.
pub fn field_types_from_table_scan(columns: &[ColumnInfo]) -> Vec<FieldType> {
    columns.iter().map(FieldType::from).collect()
}

/// Output field types of an aggregation: aggregate expressions first, then
/// group-by expressions. Any expression lacking a valid field type is a bad
/// request.
pub fn collect_agg_field_types(
    agg_funcs: &[FieldType],
    group_bys: &[FieldType],
) -> Result<Vec<FieldType>> {
    let mut out = Vec::with_capacity(agg_funcs.len() + group_bys.len());
    for ft in agg_funcs {
        if !ft.is_valid() {
            return Err(Error::BadRequest(
                "agg expression without valid field type".to_string(),
            ));
        }
        out.push(*ft);
    }
    for ft in group_bys {
        if !ft.is_valid() {
            return Err(Error::BadRequest(
                "group by expression without valid field type".to_string(),
            ));
        }
        out.push(*ft);
    }
    Ok(out)
}
