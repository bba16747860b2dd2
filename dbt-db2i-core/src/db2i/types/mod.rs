//! Native types for columns inferred from sample data.
//!
//! Used when loading tabular data into a relation that has no schema yet:
//! each column's [`ColumnType`] selects a conversion, which may look at the
//! sampled values to size the native type.

use crate::db2i::table::TabularResult;
use crate::db2i::type_info::ColumnType;
use crate::db2i::value::Db2iValue;

/// Width used for a text column with no non-null values.
const DEFAULT_TEXT_LENGTH: usize = 64;
/// Text columns are never narrower than this.
const MIN_TEXT_LENGTH: usize = 16;

/// The native type for column `col_idx`, or `None` if the index is out of range.
pub fn convert_type(table: &TabularResult, col_idx: usize) -> Option<String> {
    let column = table.columns().get(col_idx)?;
    let converted = match column.column_type() {
        ColumnType::Text => convert_text_type(table, col_idx),
        ColumnType::Number => convert_number_type(table, col_idx),
        ColumnType::Boolean => convert_boolean_type(table, col_idx),
        ColumnType::DateTime => convert_datetime_type(table, col_idx),
        ColumnType::Date => convert_date_type(table, col_idx),
        ColumnType::Time => convert_time_type(table, col_idx),
    };
    Some(converted)
}

/// `varchar(n)` where `n` is the widest UTF-8 encoding in the column,
/// floored at 16 bytes.
pub fn convert_text_type(table: &TabularResult, col_idx: usize) -> String {
    let max_len = table
        .values_without_nulls(col_idx)
        .map(|value| match value {
            Db2iValue::Text(s) => s.len(),
            other => other.to_string().len(),
        })
        .max()
        .unwrap_or(DEFAULT_TEXT_LENGTH);
    format!("varchar({})", max_len.max(MIN_TEXT_LENGTH))
}

pub fn convert_datetime_type(_table: &TabularResult, _col_idx: usize) -> String {
    "timestamp".to_string()
}

// No native boolean on every supported release
pub fn convert_boolean_type(_table: &TabularResult, _col_idx: usize) -> String {
    "decimal(1)".to_string()
}

/// `float` if any value has a fractional part, otherwise `int`.
pub fn convert_number_type(table: &TabularResult, col_idx: usize) -> String {
    if table
        .values_without_nulls(col_idx)
        .any(Db2iValue::has_fraction)
    {
        "float".to_string()
    } else {
        "int".to_string()
    }
}

pub fn convert_time_type(_table: &TabularResult, _col_idx: usize) -> String {
    "time".to_string()
}

pub fn convert_date_type(_table: &TabularResult, _col_idx: usize) -> String {
    "date".to_string()
}
