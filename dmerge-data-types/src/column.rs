use crate::data_type::DataType;
use crate::value::Value;
use dmerge_result::{Error, Result};
use std::sync::Arc;

/// Variable-width string column: concatenated bytes plus end offsets.
///
/// `offsets[i]` is the end of value `i` in `chars`; value `i` starts at
/// `offsets[i - 1]` (or 0). Only valid UTF-8 ever enters the column, either
/// from `&str` pushes or from the validating bulk decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringColumn {
    pub chars: Vec<u8>,
    pub offsets: Vec<u64>,
}

impl StringColumn {
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    #[inline]
    pub fn value_bytes(&self, i: usize) -> &[u8] {
        let start = if i == 0 { 0 } else { self.offsets[i - 1] as usize };
        let end = self.offsets[i] as usize;
        &self.chars[start..end]
    }

    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.chars.extend_from_slice(bytes);
        self.offsets.push(self.chars.len() as u64);
    }

    fn insert_range_from(&mut self, src: &StringColumn, offset: usize, len: usize) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        if offset + len > src.len() {
            return Err(range_out_of_bounds(src.len(), offset, len));
        }
        let byte_start = if offset == 0 {
            0
        } else {
            src.offsets[offset - 1] as usize
        };
        let byte_end = src.offsets[offset + len - 1] as usize;
        let base = self.chars.len() as u64;
        self.chars.extend_from_slice(&src.chars[byte_start..byte_end]);
        self.offsets.extend(
            src.offsets[offset..offset + len]
                .iter()
                .map(|&end| base + (end - byte_start as u64)),
        );
        Ok(())
    }
}

/// Nullable column: one-byte-per-row null map beside the nested column.
///
/// Structural invariant: `null_map.len() == nested.len()` whenever control
/// leaves this crate's mutation APIs. A set byte means NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct NullableColumn {
    pub null_map: Vec<u8>,
    pub nested: Box<Column>,
}

impl NullableColumn {
    pub fn new(nested: Column) -> Self {
        debug_assert!(nested.is_empty());
        Self {
            null_map: Vec::new(),
            nested: Box::new(nested),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.null_map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.null_map.is_empty()
    }

    #[inline]
    pub fn is_null_at(&self, i: usize) -> bool {
        self.null_map[i] != 0
    }
}

/// In-memory column: a tagged vector matching [`DataType`].
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    String(StringColumn),
    Nullable(NullableColumn),
}

fn range_out_of_bounds(len: usize, offset: usize, num: usize) -> Error {
    Error::Corrupted(format!(
        "column range [{offset}, {}) out of bounds, len {len}",
        offset + num
    ))
}

fn cannot_materialize(value: &Value, ty: &DataType) -> Error {
    Error::InvalidDefaultValue(format!("cannot materialize {value:?} as {}", ty.name()))
}

macro_rules! int_from_value {
    ($value:expr, $prim:ty, $dt:expr) => {
        match $value {
            Value::Int64(v) => <$prim>::try_from(*v).map_err(|_| cannot_materialize($value, &$dt)),
            Value::UInt64(v) => <$prim>::try_from(*v).map_err(|_| cannot_materialize($value, &$dt)),
            other => Err(cannot_materialize(other, &$dt)),
        }
    };
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Int8(v) => v.len(),
            Column::Int16(v) => v.len(),
            Column::Int32(v) => v.len(),
            Column::Int64(v) => v.len(),
            Column::UInt8(v) => v.len(),
            Column::UInt16(v) => v.len(),
            Column::UInt32(v) => v.len(),
            Column::UInt64(v) => v.len(),
            Column::String(c) => c.len(),
            Column::Nullable(c) => c.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The data type this column is an instance of.
    pub fn data_type(&self) -> DataType {
        match self {
            Column::Int8(_) => DataType::Int8,
            Column::Int16(_) => DataType::Int16,
            Column::Int32(_) => DataType::Int32,
            Column::Int64(_) => DataType::Int64,
            Column::UInt8(_) => DataType::UInt8,
            Column::UInt16(_) => DataType::UInt16,
            Column::UInt32(_) => DataType::UInt32,
            Column::UInt64(_) => DataType::UInt64,
            Column::String(_) => DataType::String,
            Column::Nullable(c) => DataType::Nullable(Arc::new(c.nested.data_type())),
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        match self {
            Column::Int8(v) => v.reserve(additional),
            Column::Int16(v) => v.reserve(additional),
            Column::Int32(v) => v.reserve(additional),
            Column::Int64(v) => v.reserve(additional),
            Column::UInt8(v) => v.reserve(additional),
            Column::UInt16(v) => v.reserve(additional),
            Column::UInt32(v) => v.reserve(additional),
            Column::UInt64(v) => v.reserve(additional),
            Column::String(c) => c.offsets.reserve(additional),
            Column::Nullable(c) => {
                c.null_map.reserve(additional);
                c.nested.reserve(additional);
            }
        }
    }

    /// Append one dynamically-typed value. Integer values are narrowed with a
    /// range check; a kind mismatch or overflow is an invalid default value.
    pub fn push(&mut self, value: &Value) -> Result<()> {
        match self {
            Column::Int8(v) => v.push(int_from_value!(value, i8, DataType::Int8)?),
            Column::Int16(v) => v.push(int_from_value!(value, i16, DataType::Int16)?),
            Column::Int32(v) => v.push(int_from_value!(value, i32, DataType::Int32)?),
            Column::Int64(v) => v.push(int_from_value!(value, i64, DataType::Int64)?),
            Column::UInt8(v) => v.push(int_from_value!(value, u8, DataType::UInt8)?),
            Column::UInt16(v) => v.push(int_from_value!(value, u16, DataType::UInt16)?),
            Column::UInt32(v) => v.push(int_from_value!(value, u32, DataType::UInt32)?),
            Column::UInt64(v) => v.push(int_from_value!(value, u64, DataType::UInt64)?),
            Column::String(c) => match value {
                Value::String(s) => c.push_bytes(s.as_bytes()),
                other => return Err(cannot_materialize(other, &DataType::String)),
            },
            Column::Nullable(c) => {
                if value.is_null() {
                    c.null_map.push(1);
                    c.nested.push_default();
                } else {
                    c.null_map.push(0);
                    c.nested.push(value)?;
                }
            }
        }
        Ok(())
    }

    /// Append the type's own default (zero / empty string / NULL).
    pub fn push_default(&mut self) {
        match self {
            Column::Int8(v) => v.push(0),
            Column::Int16(v) => v.push(0),
            Column::Int32(v) => v.push(0),
            Column::Int64(v) => v.push(0),
            Column::UInt8(v) => v.push(0),
            Column::UInt16(v) => v.push(0),
            Column::UInt32(v) => v.push(0),
            Column::UInt64(v) => v.push(0),
            Column::String(c) => c.push_bytes(b""),
            Column::Nullable(c) => {
                c.null_map.push(1);
                c.nested.push_default();
            }
        }
    }

    /// Append `n` copies of `value`.
    pub fn insert_many(&mut self, value: &Value, n: usize) -> Result<()> {
        self.reserve(n);
        for _ in 0..n {
            self.push(value)?;
        }
        Ok(())
    }

    /// Read back row `i` as a dynamically-typed value.
    pub fn value_at(&self, i: usize) -> Value {
        match self {
            Column::Int8(v) => Value::Int64(v[i] as i64),
            Column::Int16(v) => Value::Int64(v[i] as i64),
            Column::Int32(v) => Value::Int64(v[i] as i64),
            Column::Int64(v) => Value::Int64(v[i]),
            Column::UInt8(v) => Value::UInt64(v[i] as u64),
            Column::UInt16(v) => Value::UInt64(v[i] as u64),
            Column::UInt32(v) => Value::UInt64(v[i] as u64),
            Column::UInt64(v) => Value::UInt64(v[i]),
            Column::String(c) => {
                Value::String(String::from_utf8_lossy(c.value_bytes(i)).into_owned())
            }
            Column::Nullable(c) => {
                if c.is_null_at(i) {
                    Value::Null
                } else {
                    c.nested.value_at(i)
                }
            }
        }
    }

    /// Append rows `[offset, offset + len)` of `src`, which must be a column
    /// of the same type.
    pub fn insert_range_from(&mut self, src: &Column, offset: usize, len: usize) -> Result<()> {
        macro_rules! copy_range {
            ($dst:expr, $src:expr) => {{
                let slice = $src
                    .get(offset..offset + len)
                    .ok_or_else(|| range_out_of_bounds($src.len(), offset, len))?;
                $dst.extend_from_slice(slice);
                Ok(())
            }};
        }
        match (self, src) {
            (Column::Int8(dst), Column::Int8(s)) => copy_range!(dst, s),
            (Column::Int16(dst), Column::Int16(s)) => copy_range!(dst, s),
            (Column::Int32(dst), Column::Int32(s)) => copy_range!(dst, s),
            (Column::Int64(dst), Column::Int64(s)) => copy_range!(dst, s),
            (Column::UInt8(dst), Column::UInt8(s)) => copy_range!(dst, s),
            (Column::UInt16(dst), Column::UInt16(s)) => copy_range!(dst, s),
            (Column::UInt32(dst), Column::UInt32(s)) => copy_range!(dst, s),
            (Column::UInt64(dst), Column::UInt64(s)) => copy_range!(dst, s),
            (Column::String(dst), Column::String(s)) => dst.insert_range_from(s, offset, len),
            (Column::Nullable(dst), Column::Nullable(s)) => {
                let null_slice = s
                    .null_map
                    .get(offset..offset + len)
                    .ok_or_else(|| range_out_of_bounds(s.len(), offset, len))?;
                dst.null_map.extend_from_slice(null_slice);
                dst.nested.insert_range_from(&s.nested, offset, len)
            }
            (dst, src) => Err(Error::Corrupted(format!(
                "insert_range_from type mismatch: {} into {}",
                src.data_type().name(),
                dst.data_type().name()
            ))),
        }
    }
}
