//! Schema-evolution casts applied when the on-disk column type differs from
//! the reader's declared type.
//!
//! Two layers: nullability reconciliation around the columns, then the
//! enumerated same-sign integer widenings on the flat inner columns. Nothing
//! else casts. Signed/unsigned crossings and narrowings are rejected, and a
//! NULL read into a non-nullable destination of the same inner type is a hard
//! error, never a silent substitution.

use crate::block::ColumnDefine;
use dmerge_data_types::{Column, DataType, Value};
use dmerge_result::{Error, Result};

/// Whether on-disk type `from` can be read as `to`.
///
/// Equal types, nullability-only changes, and the widening matrix are
/// supported. This gate runs before any page bytes are decoded.
pub fn is_supported_cast(from: &DataType, to: &DataType) -> bool {
    if from == to {
        return true;
    }
    let from_inner = from.remove_nullable();
    let to_inner = to.remove_nullable();
    from_inner == to_inner || is_supported_widening(from_inner, to_inner)
}

fn is_supported_widening(from: &DataType, to: &DataType) -> bool {
    use DataType::*;
    matches!(
        (from, to),
        (UInt8, UInt16 | UInt32 | UInt64)
            | (Int8, Int16 | Int32 | Int64)
            | (UInt16, UInt32 | UInt64)
            | (Int16, Int32 | Int64)
            | (UInt32, UInt64)
            | (Int32, Int64)
    )
}

/// Resolve a column's declared default as a concrete integer, for filling
/// NULL slots when a nullable column is read as non-nullable with a widening.
trait IntDefault: Sized + Copy {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_int_default {
    ($($prim:ty),*) => {
        $(
            impl IntDefault for $prim {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        // An absent default means zero.
                        Value::Null => Some(0),
                        Value::Int64(v) => <$prim>::try_from(*v).ok(),
                        Value::UInt64(v) => <$prim>::try_from(*v).ok(),
                        Value::String(_) => None,
                    }
                }
            }
        )*
    };
}

impl_int_default!(i16, i32, i64, u16, u32, u64);

/// `insert_range_from` with a static widening, plus NULL-slot substitution
/// when the source carried a null map.
fn widen_into<F, T>(
    src: &[F],
    dst: &mut Vec<T>,
    null_map: Option<&[u8]>,
    read_define: &ColumnDefine,
    rows_offset: usize,
    rows_limit: usize,
) -> Result<()>
where
    F: Copy,
    T: From<F> + IntDefault,
{
    debug_assert!(rows_offset + rows_limit <= src.len());
    dst.reserve(rows_limit);
    for i in 0..rows_limit {
        dst.push(T::from(src[rows_offset + i]));
    }

    if let Some(null_map) = null_map {
        // Casting nullable to not null: overwrite the NULL slots with the
        // column's declared default value.
        let default = T::from_value(&read_define.default_value).ok_or_else(|| {
            Error::InvalidDefaultValue(format!(
                "column {} declares default {:?}",
                read_define.name, read_define.default_value
            ))
        })?;
        let base = dst.len() - rows_limit;
        for i in 0..rows_limit {
            if null_map[rows_offset + i] != 0 {
                dst[base + i] = default;
            }
        }
    }
    Ok(())
}

/// Apply one widening from the matrix. `Ok(false)` means the pair is not
/// supported at all.
fn cast_flat_numeric_column(
    disk_col: &Column,
    memory_col: &mut Column,
    null_map: Option<&[u8]>,
    read_define: &ColumnDefine,
    rows_offset: usize,
    rows_limit: usize,
) -> Result<bool> {
    macro_rules! widen {
        ($src:expr, $dst:expr) => {{
            widen_into($src, $dst, null_map, read_define, rows_offset, rows_limit)?;
            Ok(true)
        }};
    }
    match (disk_col, memory_col) {
        (Column::UInt8(src), Column::UInt16(dst)) => widen!(src, dst),
        (Column::UInt8(src), Column::UInt32(dst)) => widen!(src, dst),
        (Column::UInt8(src), Column::UInt64(dst)) => widen!(src, dst),
        (Column::Int8(src), Column::Int16(dst)) => widen!(src, dst),
        (Column::Int8(src), Column::Int32(dst)) => widen!(src, dst),
        (Column::Int8(src), Column::Int64(dst)) => widen!(src, dst),
        (Column::UInt16(src), Column::UInt32(dst)) => widen!(src, dst),
        (Column::UInt16(src), Column::UInt64(dst)) => widen!(src, dst),
        (Column::Int16(src), Column::Int32(dst)) => widen!(src, dst),
        (Column::Int16(src), Column::Int64(dst)) => widen!(src, dst),
        (Column::UInt32(src), Column::UInt64(dst)) => widen!(src, dst),
        (Column::Int32(src), Column::Int64(dst)) => widen!(src, dst),
        _ => Ok(false),
    }
}

/// Cast rows `[rows_offset, rows_offset + rows_limit)` of `disk_col` (typed
/// per the pack's `disk_type`) into `memory_col` (typed per `read_define`).
///
/// `disk_col` must hold `rows_offset + rows_limit` decoded rows.
pub fn cast_column(
    disk_type: &DataType,
    disk_col: &Column,
    read_define: &ColumnDefine,
    memory_col: &mut Column,
    rows_offset: usize,
    rows_limit: usize,
) -> Result<()> {
    let read_type = &read_define.data_type;
    let unsupported = || Error::CastUnsupported {
        from: disk_type.name(),
        to: read_type.name(),
    };

    // Unwrap Nullable(...) on both sides, remembering the source null map
    // when the destination cannot represent NULL.
    let (disk_flat, mem_flat, null_map): (&Column, &mut Column, Option<&[u8]>) =
        match (disk_col, memory_col) {
            (Column::Nullable(disk), Column::Nullable(mem)) => {
                let null_slice = disk
                    .null_map
                    .get(rows_offset..rows_offset + rows_limit)
                    .ok_or_else(|| Error::corrupted("cast window out of bounds"))?;
                mem.null_map.extend_from_slice(null_slice);
                (&*disk.nested, &mut *mem.nested, None)
            }
            (disk_flat, Column::Nullable(mem)) => {
                // not null -> nullable: no row is NULL.
                mem.null_map.extend(std::iter::repeat(0u8).take(rows_limit));
                (disk_flat, &mut *mem.nested, None)
            }
            (Column::Nullable(disk), mem_flat) => {
                // nullable -> not null: deal with the NULL slots below.
                (&*disk.nested, mem_flat, Some(disk.null_map.as_slice()))
            }
            (disk_flat, mem_flat) => (disk_flat, mem_flat, None),
        };

    let disk_type_flat = disk_type.remove_nullable();
    let read_type_flat = read_type.remove_nullable();

    if disk_type_flat == read_type_flat {
        // Only the nullability changed; move the value range as-is.
        mem_flat.insert_range_from(disk_flat, rows_offset, rows_limit)?;
        if let Some(null_map) = null_map {
            // No inner cast to hang a default on: a NULL here is unreadable.
            for i in 0..rows_limit {
                if null_map[rows_offset + i] != 0 {
                    return Err(Error::NullInNonNullable {
                        from: disk_type.name(),
                        to: read_type.name(),
                    });
                }
            }
        }
        return Ok(());
    }

    if !cast_flat_numeric_column(
        disk_flat,
        mem_flat,
        null_map,
        read_define,
        rows_offset,
        rows_limit,
    )? {
        return Err(unsupported());
    }
    Ok(())
}
