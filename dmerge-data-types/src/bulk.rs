//! Bulk multi-stream codec: streams a column window into one destination
//! buffer, substreams concatenated in declaration order.
//!
//! For `Nullable(T)` the null-map substream (one byte per serialized row)
//! precedes the nested value substream. The deserializer is handed the total
//! on-disk row count so it can locate the value substream when decoding only
//! a prefix of the rows. `String` values are LEB128 length-prefixed and
//! interleaved, so a prefix decode simply stops early.

use crate::codec;
use crate::column::Column;
use crate::data_type::DataType;
use dmerge_result::{Error, Result};

fn type_column_mismatch(ty: &DataType, column: &Column) -> Error {
    Error::Corrupted(format!(
        "bulk codec: {} column does not match type {}",
        column.data_type().name(),
        ty.name()
    ))
}

impl DataType {
    /// Serialize rows `[offset, offset + num)` of `column` into `out`.
    pub fn serialize_bulk(
        &self,
        column: &Column,
        offset: usize,
        num: usize,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        macro_rules! ser_prim {
            ($vals:expr) => {{
                let slice = $vals.get(offset..offset + num).ok_or_else(|| {
                    Error::Corrupted(format!(
                        "bulk codec: window [{offset}, {}) out of bounds, len {}",
                        offset + num,
                        $vals.len()
                    ))
                })?;
                out.reserve(std::mem::size_of_val(slice));
                for v in slice {
                    out.extend_from_slice(&v.to_le_bytes());
                }
                Ok(())
            }};
        }

        match (self, column) {
            (DataType::Int8, Column::Int8(v)) => ser_prim!(v),
            (DataType::Int16, Column::Int16(v)) => ser_prim!(v),
            (DataType::Int32, Column::Int32(v)) => ser_prim!(v),
            (DataType::Int64, Column::Int64(v)) => ser_prim!(v),
            (DataType::UInt8, Column::UInt8(v)) => ser_prim!(v),
            (DataType::UInt16, Column::UInt16(v)) => ser_prim!(v),
            (DataType::UInt32, Column::UInt32(v)) => ser_prim!(v),
            (DataType::UInt64, Column::UInt64(v)) => ser_prim!(v),
            (DataType::String, Column::String(c)) => {
                if offset + num > c.len() {
                    return Err(type_column_mismatch(self, column));
                }
                for i in offset..offset + num {
                    let bytes = c.value_bytes(i);
                    codec::put_varuint(out, bytes.len() as u64);
                    out.extend_from_slice(bytes);
                }
                Ok(())
            }
            (DataType::Nullable(inner), Column::Nullable(c)) => {
                let null_slice = c.null_map.get(offset..offset + num).ok_or_else(|| {
                    Error::Corrupted(format!(
                        "bulk codec: window [{offset}, {}) out of bounds, len {}",
                        offset + num,
                        c.len()
                    ))
                })?;
                out.extend_from_slice(null_slice);
                inner.serialize_bulk(&c.nested, offset, num, out)
            }
            _ => Err(type_column_mismatch(self, column)),
        }
    }

    /// Decode the first `rows_limit` of `rows_total` on-disk rows, appending
    /// to `column`. `avg_value_size_hint` (bytes per row, from the page size)
    /// pre-sizes variable-width buffers.
    pub fn deserialize_bulk(
        &self,
        column: &mut Column,
        rows_limit: usize,
        rows_total: usize,
        avg_value_size_hint: f64,
        buf: &[u8],
        pos: &mut usize,
    ) -> Result<()> {
        debug_assert!(rows_limit <= rows_total);

        macro_rules! de_prim {
            ($vals:expr, $prim:ty) => {{
                $vals.reserve(rows_limit);
                for _ in 0..rows_limit {
                    let bytes = codec::get_bytes(buf, pos, std::mem::size_of::<$prim>())?;
                    $vals.push(<$prim>::from_le_bytes(bytes.try_into().expect("length checked")));
                }
                Ok(())
            }};
        }

        match (self, column) {
            (DataType::Int8, Column::Int8(v)) => de_prim!(v, i8),
            (DataType::Int16, Column::Int16(v)) => de_prim!(v, i16),
            (DataType::Int32, Column::Int32(v)) => de_prim!(v, i32),
            (DataType::Int64, Column::Int64(v)) => de_prim!(v, i64),
            (DataType::UInt8, Column::UInt8(v)) => de_prim!(v, u8),
            (DataType::UInt16, Column::UInt16(v)) => de_prim!(v, u16),
            (DataType::UInt32, Column::UInt32(v)) => de_prim!(v, u32),
            (DataType::UInt64, Column::UInt64(v)) => de_prim!(v, u64),
            (DataType::String, Column::String(c)) => {
                c.offsets.reserve(rows_limit);
                if avg_value_size_hint > 0.0 {
                    c.chars.reserve((avg_value_size_hint * rows_limit as f64) as usize);
                }
                for _ in 0..rows_limit {
                    let len = codec::get_varuint(buf, pos)? as usize;
                    let bytes = codec::get_bytes(buf, pos, len)?;
                    std::str::from_utf8(bytes).map_err(Error::corrupted)?;
                    c.push_bytes(bytes);
                }
                Ok(())
            }
            (DataType::Nullable(inner), Column::Nullable(c)) => {
                let null_slice = codec::get_bytes(buf, pos, rows_limit)?;
                c.null_map.extend_from_slice(null_slice);
                // The null-map substream covers every on-disk row; hop over
                // the tail to reach the value substream.
                codec::get_bytes(buf, pos, rows_total - rows_limit)?;
                inner.deserialize_bulk(
                    &mut c.nested,
                    rows_limit,
                    rows_total,
                    avg_value_size_hint,
                    buf,
                    pos,
                )
            }
            (ty, column) => Err(type_column_mismatch(ty, column)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn roundtrip(ty: &DataType, values: &[Value]) -> Column {
        let mut col = ty.create_column();
        for v in values {
            col.push(v).unwrap();
        }
        let mut buf = Vec::new();
        ty.serialize_bulk(&col, 0, col.len(), &mut buf).unwrap();
        let mut out = ty.create_column();
        let mut pos = 0;
        ty.deserialize_bulk(&mut out, values.len(), values.len(), 0.0, &buf, &mut pos)
            .unwrap();
        assert_eq!(pos, buf.len());
        assert_eq!(out, col);
        out
    }

    #[test]
    fn primitive_roundtrip() {
        roundtrip(
            &DataType::Int32,
            &[Value::Int64(1), Value::Int64(-1), Value::Int64(i32::MAX as i64)],
        );
        roundtrip(
            &DataType::UInt8,
            &[Value::UInt64(0), Value::UInt64(255), Value::UInt64(7)],
        );
    }

    #[test]
    fn string_roundtrip() {
        roundtrip(
            &DataType::String,
            &[
                Value::String("a".into()),
                Value::String(String::new()),
                Value::String("ccc".into()),
            ],
        );
    }

    #[test]
    fn nullable_roundtrip() {
        roundtrip(
            &DataType::nullable(DataType::Int64),
            &[Value::Int64(5), Value::Null, Value::Int64(-9)],
        );
    }

    #[test]
    fn prefix_decode_stops_early() {
        let ty = DataType::String;
        let mut col = ty.create_column();
        for s in ["aa", "b", "cccc"] {
            col.push(&Value::String(s.into())).unwrap();
        }
        let mut buf = Vec::new();
        ty.serialize_bulk(&col, 0, 3, &mut buf).unwrap();
        let mut out = ty.create_column();
        let mut pos = 0;
        ty.deserialize_bulk(&mut out, 2, 3, 0.0, &buf, &mut pos).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.value_at(1), Value::String("b".into()));
    }

    #[test]
    fn nullable_prefix_decode_skips_null_map_tail() {
        let ty = DataType::nullable(DataType::UInt16);
        let mut col = ty.create_column();
        for v in [Value::UInt64(1), Value::Null, Value::UInt64(3), Value::UInt64(4)] {
            col.push(&v).unwrap();
        }
        let mut buf = Vec::new();
        ty.serialize_bulk(&col, 0, 4, &mut buf).unwrap();
        let mut out = ty.create_column();
        let mut pos = 0;
        ty.deserialize_bulk(&mut out, 2, 4, 0.0, &buf, &mut pos).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.value_at(0), Value::UInt64(1));
        assert_eq!(out.value_at(1), Value::Null);
    }

    #[test]
    fn window_serialization_takes_a_slice() {
        let ty = DataType::Int16;
        let mut col = ty.create_column();
        for v in [10i64, 20, 30, 40] {
            col.push(&Value::Int64(v)).unwrap();
        }
        let mut buf = Vec::new();
        ty.serialize_bulk(&col, 1, 2, &mut buf).unwrap();
        let mut out = ty.create_column();
        let mut pos = 0;
        ty.deserialize_bulk(&mut out, 2, 2, 0.0, &buf, &mut pos).unwrap();
        assert_eq!(out.value_at(0), Value::Int64(20));
        assert_eq!(out.value_at(1), Value::Int64(30));
    }

    #[test]
    fn invalid_utf8_is_corruption() {
        let ty = DataType::String;
        let mut buf = Vec::new();
        codec::put_varuint(&mut buf, 2);
        buf.extend_from_slice(&[0xff, 0xfe]);
        let mut out = ty.create_column();
        let mut pos = 0;
        assert!(ty.deserialize_bulk(&mut out, 1, 1, 0.0, &buf, &mut pos).is_err());
    }
}
