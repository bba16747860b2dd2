//! Tabular results.

use crate::db2i::driver::NativeColumn;
use crate::db2i::type_info::ColumnType;
use crate::db2i::value::Db2iValue;

/// A named, typed column of a [`TabularResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct TabularColumn {
    pub(crate) name: String,
    pub(crate) column_type: ColumnType,
}

impl TabularColumn {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }
}

/// Rows returned by a statement, with their column layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularResult {
    pub(crate) columns: Vec<TabularColumn>,
    pub(crate) rows: Vec<Vec<Db2iValue>>,
}

impl TabularResult {
    /// Create a result from columns and rows; every row must be as wide as
    /// the column list.
    pub fn new(columns: Vec<TabularColumn>, rows: Vec<Vec<Db2iValue>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self { columns, rows }
    }

    /// A valid result with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a typed result from driver column metadata and text cells.
    pub fn from_native(columns: &[NativeColumn], raw_rows: Vec<Vec<Option<String>>>) -> Self {
        let columns: Vec<TabularColumn> = columns
            .iter()
            .map(|col| TabularColumn::new(col.name.clone(), col.type_info.column_type()))
            .collect();

        let rows = raw_rows
            .into_iter()
            .map(|raw| {
                raw.into_iter()
                    .zip(&columns)
                    .map(|(cell, col)| Db2iValue::decode(cell, col.column_type))
                    .collect()
            })
            .collect();

        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[TabularColumn] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Db2iValue>] {
        &self.rows
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|col| col.name.as_str())
    }

    /// Position of the column called `name`, compared case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The cells of one column, top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Db2iValue> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    pub fn values_without_nulls(&self, index: usize) -> impl Iterator<Item = &Db2iValue> {
        self.column_values(index).filter(|value| !value.is_null())
    }
}
