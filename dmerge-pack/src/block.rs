use crate::types::ColId;
use dmerge_data_types::{Column, DataType, Value};

/// Reader/writer-side description of one column: stable id, name, current
/// in-memory type and the DDL-declared default value.
#[derive(Debug, Clone)]
pub struct ColumnDefine {
    pub id: ColId,
    pub name: String,
    pub data_type: DataType,
    pub default_value: Value,
}

impl ColumnDefine {
    pub fn new(id: ColId, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id,
            name: name.into(),
            data_type,
            default_value: Value::Null,
        }
    }

    pub fn with_default(mut self, default_value: Value) -> Self {
        self.default_value = default_value;
        self
    }
}

/// A materialized column together with its type, name and id.
#[derive(Debug, Clone)]
pub struct ColumnWithTypeAndName {
    pub column: Column,
    pub data_type: DataType,
    pub name: String,
    pub column_id: ColId,
}

/// An ordered set of equally-sized columns; the unit rows move around in.
#[derive(Debug, Clone, Default)]
pub struct Block {
    columns: Vec<ColumnWithTypeAndName>,
}

impl Block {
    pub fn new(columns: Vec<ColumnWithTypeAndName>) -> Self {
        Self { columns }
    }

    pub fn insert(&mut self, column: ColumnWithTypeAndName) {
        self.columns.push(column);
    }

    /// Row count, taken from the first column. An empty block has zero rows.
    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.column.len())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[ColumnWithTypeAndName] {
        &self.columns
    }

    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&ColumnWithTypeAndName> {
        self.columns.iter().find(|c| c.name == name)
    }
}
