use crate::column::Column;
use crate::data_type::DataType;
use crate::value::Value;
use dmerge_result::Result;

/// Per-pack min/max summary of one column, used for predicate pushdown.
///
/// Stored as a two-row column `[min, max]` of the indexed type; the binary
/// layout is delegated to the type's own bulk codec. Never mutated after the
/// pack is written.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxIndex {
    values: Column,
}

/// Row `a` strictly less than row `b`. Caller guarantees a flat column.
fn less_at(column: &Column, a: usize, b: usize) -> bool {
    match column {
        Column::Int8(v) => v[a] < v[b],
        Column::Int16(v) => v[a] < v[b],
        Column::Int32(v) => v[a] < v[b],
        Column::Int64(v) => v[a] < v[b],
        Column::UInt8(v) => v[a] < v[b],
        Column::UInt16(v) => v[a] < v[b],
        Column::UInt32(v) => v[a] < v[b],
        Column::UInt64(v) => v[a] < v[b],
        Column::String(c) => c.value_bytes(a) < c.value_bytes(b),
        Column::Nullable(_) => {
            debug_assert!(false, "less_at on a nullable column");
            false
        }
    }
}

impl MinMaxIndex {
    /// Scan `column` and record its extremes. NULL rows are skipped; a column
    /// with no non-null rows indexes the type's default (or NULL for a
    /// nullable type).
    pub fn build(data_type: &DataType, column: &Column) -> Result<Self> {
        let (flat, null_map): (&Column, Option<&[u8]>) = match column {
            Column::Nullable(c) => (&c.nested, Some(&c.null_map)),
            other => (other, None),
        };

        let mut min_idx: Option<usize> = None;
        let mut max_idx: Option<usize> = None;
        for i in 0..column.len() {
            if null_map.is_some_and(|nm| nm[i] != 0) {
                continue;
            }
            match (min_idx, max_idx) {
                (None, _) => {
                    min_idx = Some(i);
                    max_idx = Some(i);
                }
                (Some(lo), Some(hi)) => {
                    if less_at(flat, i, lo) {
                        min_idx = Some(i);
                    }
                    if less_at(flat, hi, i) {
                        max_idx = Some(i);
                    }
                }
                _ => unreachable!(),
            }
        }

        let mut values = data_type.create_column();
        match (min_idx, max_idx) {
            (Some(lo), Some(hi)) => {
                values.push(&column.value_at(lo))?;
                values.push(&column.value_at(hi))?;
            }
            _ => {
                let default = data_type.default_value();
                values.push(&default)?;
                values.push(&default)?;
            }
        }
        Ok(Self { values })
    }

    #[inline]
    pub fn min(&self) -> Value {
        self.values.value_at(0)
    }

    #[inline]
    pub fn max(&self) -> Value {
        self.values.value_at(1)
    }

    pub fn write(&self, data_type: &DataType, out: &mut Vec<u8>) -> Result<()> {
        data_type.serialize_bulk(&self.values, 0, self.values.len(), out)
    }

    pub fn read(data_type: &DataType, buf: &[u8], pos: &mut usize) -> Result<Self> {
        let mut values = data_type.create_column();
        data_type.deserialize_bulk(&mut values, 2, 2, 0.0, buf, pos)?;
        Ok(Self { values })
    }
}
