use crate::column::{Column, NullableColumn, StringColumn};
use crate::value::Value;
use dmerge_result::{Error, Result};
use std::sync::Arc;

/// Tagged descriptor of a column data type.
///
/// The type universe is closed: eight integer widths, `String`, and a
/// `Nullable` wrapper carrying the inner type. [`DataType::from_name`] is the
/// process-wide registry lookup and is the exact inverse of
/// [`DataType::name`]; descriptors reconstituted from a pack descriptor go
/// through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    String,
    Nullable(Arc<DataType>),
}

impl DataType {
    /// Wrap `inner` in a `Nullable`. Nesting nullables is not a thing.
    pub fn nullable(inner: DataType) -> DataType {
        debug_assert!(!inner.is_nullable());
        DataType::Nullable(Arc::new(inner))
    }

    /// Canonical textual encoding, e.g. `Int32` or `Nullable(UInt64)`.
    pub fn name(&self) -> String {
        match self {
            DataType::Int8 => "Int8".to_string(),
            DataType::Int16 => "Int16".to_string(),
            DataType::Int32 => "Int32".to_string(),
            DataType::Int64 => "Int64".to_string(),
            DataType::UInt8 => "UInt8".to_string(),
            DataType::UInt16 => "UInt16".to_string(),
            DataType::UInt32 => "UInt32".to_string(),
            DataType::UInt64 => "UInt64".to_string(),
            DataType::String => "String".to_string(),
            DataType::Nullable(inner) => format!("Nullable({})", inner.name()),
        }
    }

    /// Registry lookup by canonical name; the inverse of [`DataType::name`].
    pub fn from_name(name: &str) -> Result<DataType> {
        if let Some(rest) = name.strip_prefix("Nullable(") {
            let inner_name = rest
                .strip_suffix(')')
                .ok_or_else(|| Error::Corrupted(format!("malformed type name: {name}")))?;
            let inner = DataType::from_name(inner_name)?;
            if inner.is_nullable() {
                return Err(Error::Corrupted(format!(
                    "nested Nullable in type name: {name}"
                )));
            }
            return Ok(DataType::nullable(inner));
        }
        match name {
            "Int8" => Ok(DataType::Int8),
            "Int16" => Ok(DataType::Int16),
            "Int32" => Ok(DataType::Int32),
            "Int64" => Ok(DataType::Int64),
            "UInt8" => Ok(DataType::UInt8),
            "UInt16" => Ok(DataType::UInt16),
            "UInt32" => Ok(DataType::UInt32),
            "UInt64" => Ok(DataType::UInt64),
            "String" => Ok(DataType::String),
            _ => Err(Error::Corrupted(format!("unknown data type name: {name}"))),
        }
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        matches!(self, DataType::Nullable(_))
    }

    /// The wrapped type for `Nullable`, `None` otherwise.
    #[inline]
    pub fn nested_type(&self) -> Option<&DataType> {
        match self {
            DataType::Nullable(inner) => Some(inner),
            _ => None,
        }
    }

    /// Strip the `Nullable` wrapper if present.
    #[inline]
    pub fn remove_nullable(&self) -> &DataType {
        match self {
            DataType::Nullable(inner) => inner,
            other => other,
        }
    }

    #[inline]
    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self,
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64
        )
    }

    #[inline]
    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self,
            DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64
        )
    }

    /// Create an empty column of this type.
    pub fn create_column(&self) -> Column {
        match self {
            DataType::Int8 => Column::Int8(Vec::new()),
            DataType::Int16 => Column::Int16(Vec::new()),
            DataType::Int32 => Column::Int32(Vec::new()),
            DataType::Int64 => Column::Int64(Vec::new()),
            DataType::UInt8 => Column::UInt8(Vec::new()),
            DataType::UInt16 => Column::UInt16(Vec::new()),
            DataType::UInt32 => Column::UInt32(Vec::new()),
            DataType::UInt64 => Column::UInt64(Vec::new()),
            DataType::String => Column::String(StringColumn::default()),
            DataType::Nullable(inner) => {
                Column::Nullable(NullableColumn::new(inner.create_column()))
            }
        }
    }

    /// Create a column holding `rows` copies of `value`.
    pub fn create_column_const(&self, rows: usize, value: &Value) -> Result<Column> {
        let mut column = self.create_column();
        column.insert_many(value, rows)?;
        Ok(column)
    }

    /// The type's own default: zero, empty string, or NULL for nullables.
    pub fn default_value(&self) -> Value {
        match self {
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => Value::Int64(0),
            DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
                Value::UInt64(0)
            }
            DataType::String => Value::String(String::new()),
            DataType::Nullable(_) => Value::Null,
        }
    }
}
