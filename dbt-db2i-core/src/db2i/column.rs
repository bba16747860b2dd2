//! Column descriptors and their Db2 for i type syntax.

use std::fmt;

/// Dialect-neutral labels and the native type each one stands for.
pub const TYPE_LABELS: &[(&str, &str)] = &[
    ("STRING", "VARCHAR(4000)"),
    ("TIMESTAMP", "TIMESTAMP"),
    ("FLOAT", "DECFLOAT"),
    ("INTEGER", "INTEGER"),
];

/// Native type names that are always strings.
const STRING_DATATYPES: &[&str] = &["char", "nchar", "varchar", "nvarchar"];
/// Native type names that are always numeric.
const NUMBER_DATATYPES: &[&str] = &["decimal", "decfloat"];

const GENERIC_STRING_DATATYPES: &[&str] = &["text", "character varying", "character", "varchar"];
const GENERIC_NUMERIC_DATATYPES: &[&str] = &["numeric", "decimal"];
const INTEGER_DATATYPES: &[&str] = &[
    "smallint", "integer", "bigint", "smallserial", "serial", "bigserial", "int2", "int4", "int8",
];
const FLOAT_DATATYPES: &[&str] = &[
    "real", "float4", "float", "double precision", "float8", "double",
];
const TIMESTAMP_DATATYPES: &[&str] = &["timestamp", "date", "time"];

/// Size assumed for a string column whose width is unknown.
const DEFAULT_STRING_SIZE: u32 = 256;

/// Coarse classification of a column's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    String,
    Numeric,
    Timestamp,
    Other,
}

/// Translate a dialect-neutral label to its native type; other names pass
/// through unchanged.
pub fn translate_type(dtype: &str) -> String {
    let upper = dtype.to_ascii_uppercase();
    TYPE_LABELS
        .iter()
        .find(|(label, _)| *label == upper)
        .map(|(_, native)| native.to_string())
        .unwrap_or_else(|| dtype.to_string())
}

/// Render `TYPE(size)`, or the bare type when the size is unknown.
pub fn string_type(dtype: &str, size: Option<u32>) -> String {
    match size {
        Some(size) => format!("{}({})", dtype, size),
        None => dtype.to_string(),
    }
}

/// Render `TYPE(precision,scale)`, or the bare type when either is unknown.
pub fn numeric_type(dtype: &str, precision: Option<u32>, scale: Option<u32>) -> String {
    match (precision, scale) {
        (Some(precision), Some(scale)) => format!("{}({},{})", dtype, precision, scale),
        _ => dtype.to_string(),
    }
}

fn is_one_of(dtype: &str, names: &[&str]) -> bool {
    let lower = dtype.to_ascii_lowercase();
    names.contains(&lower.as_str())
}

/// A column of an existing relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Db2iColumn {
    pub(crate) column: String,
    pub(crate) dtype: String,
    pub(crate) char_size: Option<u32>,
    pub(crate) numeric_precision: Option<u32>,
    pub(crate) numeric_scale: Option<u32>,
}

impl Db2iColumn {
    pub fn new(column: impl Into<String>, dtype: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            dtype: dtype.into(),
            char_size: None,
            numeric_precision: None,
            numeric_scale: None,
        }
    }

    /// A column whose type is given as a label (`STRING`, `FLOAT`, ...) or a
    /// native type name.
    pub fn create(name: impl Into<String>, label_or_dtype: &str) -> Self {
        Self::new(name, translate_type(label_or_dtype))
    }

    /// Parse a raw catalog type such as `varchar(20)` or `decimal(10,2)`.
    pub fn from_description(name: impl Into<String>, raw_data_type: &str) -> Self {
        let raw = raw_data_type.trim();
        let Some((dtype, rest)) = raw.split_once('(') else {
            return Self::new(name, raw);
        };
        let mut column = Self::new(name, dtype.trim());
        let sizes: Vec<Option<u32>> = rest
            .trim_end_matches(')')
            .split(',')
            .map(|part| part.trim().parse().ok())
            .collect();
        match sizes.as_slice() {
            [size] if column.is_string() => column.char_size = *size,
            [precision] => column.numeric_precision = *precision,
            [precision, scale, ..] => {
                column.numeric_precision = *precision;
                column.numeric_scale = *scale;
            }
            [] => {}
        }
        column
    }

    pub fn with_char_size(mut self, size: u32) -> Self {
        self.char_size = Some(size);
        self
    }

    pub fn with_numeric(mut self, precision: u32, scale: u32) -> Self {
        self.numeric_precision = Some(precision);
        self.numeric_scale = Some(scale);
        self
    }

    pub fn name(&self) -> &str {
        &self.column
    }

    pub fn dtype(&self) -> &str {
        &self.dtype
    }

    pub fn char_size(&self) -> Option<u32> {
        self.char_size
    }

    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.column)
    }

    /// The full type as it would appear in DDL.
    pub fn data_type(&self) -> String {
        if self.is_string() {
            string_type(&self.dtype, self.char_size)
        } else if self.is_numeric() {
            numeric_type(&self.dtype, self.numeric_precision, self.numeric_scale)
        } else {
            self.dtype.clone()
        }
    }

    pub fn is_string(&self) -> bool {
        is_one_of(&self.dtype, STRING_DATATYPES) || is_one_of(&self.dtype, GENERIC_STRING_DATATYPES)
    }

    pub fn is_numeric(&self) -> bool {
        is_one_of(&self.dtype, NUMBER_DATATYPES)
            || is_one_of(&self.dtype, GENERIC_NUMERIC_DATATYPES)
    }

    pub fn is_integer(&self) -> bool {
        is_one_of(&self.dtype, INTEGER_DATATYPES)
    }

    pub fn is_float(&self) -> bool {
        is_one_of(&self.dtype, FLOAT_DATATYPES)
    }

    pub fn is_number(&self) -> bool {
        self.is_integer() || self.is_float() || self.is_numeric()
    }

    pub fn kind(&self) -> ColumnKind {
        if self.is_string() {
            ColumnKind::String
        } else if self.is_number() {
            ColumnKind::Numeric
        } else if is_one_of(&self.dtype, TIMESTAMP_DATATYPES) {
            ColumnKind::Timestamp
        } else {
            ColumnKind::Other
        }
    }

    /// Declared width of a string column, 256 when unknown. `None` for
    /// columns that are not strings.
    pub fn string_size(&self) -> Option<u32> {
        self.is_string()
            .then(|| self.char_size.unwrap_or(DEFAULT_STRING_SIZE))
    }

    /// Whether this string column can be widened to fit `other`.
    pub fn can_expand_to(&self, other: &Db2iColumn) -> bool {
        match (self.string_size(), other.string_size()) {
            (Some(own), Some(theirs)) => own < theirs,
            _ => false,
        }
    }

    /// A literal of this column's type.
    pub fn literal(&self, value: &str) -> String {
        format!("cast({} as {})", value, self.data_type())
    }
}

impl fmt::Display for Db2iColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.data_type())
    }
}
