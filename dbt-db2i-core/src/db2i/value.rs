//! Cell values and statement bindings.

use crate::db2i::type_info::ColumnType;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H.%M.%S", "%H:%M:%S%.f"];
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d-%H.%M.%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// A single cell of a tabular result.
#[derive(Debug, Clone, PartialEq)]
pub enum Db2iValue {
    Null,
    Boolean(bool),
    Integer(i64),
    /// An exact fixed-point number, as read from DECIMAL and NUMERIC columns.
    Decimal(Decimal),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl Db2iValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Db2iValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Db2iValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Db2iValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Db2iValue::Integer(i) => Some(Decimal::from(*i)),
            Db2iValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Whether this is a number with a non-zero fractional part. Trailing
    /// zeros of a decimal's scale do not count.
    pub fn has_fraction(&self) -> bool {
        match self {
            Db2iValue::Decimal(d) => !d.fract().is_zero(),
            Db2iValue::Float(f) => f.is_finite() && f.fract() != 0.0,
            _ => false,
        }
    }

    /// Decode the driver's text rendering of a cell into a typed value.
    ///
    /// Text that does not parse as the column's type is kept as text.
    pub fn decode(raw: Option<String>, column_type: ColumnType) -> Self {
        let Some(raw) = raw else {
            return Db2iValue::Null;
        };
        let trimmed = raw.trim();
        let decoded = match column_type {
            ColumnType::Text => None,
            // Exact forms first; f64 only for exponent notation or digits
            // beyond what a Decimal holds
            ColumnType::Number => trimmed
                .parse::<i64>()
                .map(Db2iValue::Integer)
                .ok()
                .or_else(|| Decimal::from_str_exact(trimmed).ok().map(Db2iValue::Decimal))
                .or_else(|| trimmed.parse::<f64>().ok().map(Db2iValue::Float)),
            ColumnType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "1" | "true" => Some(Db2iValue::Boolean(true)),
                "0" | "false" => Some(Db2iValue::Boolean(false)),
                _ => None,
            },
            ColumnType::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .ok()
                .map(Db2iValue::Date),
            ColumnType::Time => TIME_FORMATS
                .iter()
                .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
                .map(Db2iValue::Time),
            ColumnType::DateTime => TIMESTAMP_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
                .map(Db2iValue::DateTime),
        };
        decoded.unwrap_or(Db2iValue::Text(raw))
    }
}

impl fmt::Display for Db2iValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Db2iValue::Null => f.write_str("NULL"),
            Db2iValue::Boolean(b) => write!(f, "{}", b),
            Db2iValue::Integer(i) => write!(f, "{}", i),
            Db2iValue::Decimal(d) => write!(f, "{}", d),
            Db2iValue::Float(v) => write!(f, "{}", v),
            Db2iValue::Text(s) => f.write_str(s),
            Db2iValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Db2iValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            Db2iValue::DateTime(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.6f")),
        }
    }
}

impl From<bool> for Db2iValue {
    fn from(v: bool) -> Self {
        Db2iValue::Boolean(v)
    }
}

impl From<i64> for Db2iValue {
    fn from(v: i64) -> Self {
        Db2iValue::Integer(v)
    }
}

impl From<Decimal> for Db2iValue {
    fn from(v: Decimal) -> Self {
        Db2iValue::Decimal(v)
    }
}

impl From<f64> for Db2iValue {
    fn from(v: f64) -> Self {
        Db2iValue::Float(v)
    }
}

impl From<&str> for Db2iValue {
    fn from(v: &str) -> Self {
        Db2iValue::Text(v.to_string())
    }
}

impl From<String> for Db2iValue {
    fn from(v: String) -> Self {
        Db2iValue::Text(v)
    }
}

impl<T: Into<Db2iValue>> From<Option<T>> for Db2iValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Db2iValue::Null)
    }
}

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Db2iBinding {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl Db2iBinding {
    /// The literal text sent to the driver, or `None` for SQL NULL.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Db2iBinding::Null => None,
            Db2iBinding::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            Db2iBinding::Int(i) => Some(i.to_string()),
            Db2iBinding::Decimal(d) => Some(d.to_string()),
            Db2iBinding::Float(v) => Some(v.to_string()),
            Db2iBinding::Text(s) => Some(s.clone()),
            Db2iBinding::Date(d) => Some(d.format(DATE_FORMAT).to_string()),
            Db2iBinding::Time(t) => Some(t.format("%H:%M:%S").to_string()),
            Db2iBinding::Timestamp(ts) => Some(ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()),
        }
    }
}

impl From<bool> for Db2iBinding {
    fn from(v: bool) -> Self {
        Db2iBinding::Bool(v)
    }
}

impl From<i32> for Db2iBinding {
    fn from(v: i32) -> Self {
        Db2iBinding::Int(v.into())
    }
}

impl From<i64> for Db2iBinding {
    fn from(v: i64) -> Self {
        Db2iBinding::Int(v)
    }
}

impl From<Decimal> for Db2iBinding {
    fn from(v: Decimal) -> Self {
        Db2iBinding::Decimal(v)
    }
}

impl From<f64> for Db2iBinding {
    fn from(v: f64) -> Self {
        Db2iBinding::Float(v)
    }
}

impl From<&str> for Db2iBinding {
    fn from(v: &str) -> Self {
        Db2iBinding::Text(v.to_string())
    }
}

impl From<String> for Db2iBinding {
    fn from(v: String) -> Self {
        Db2iBinding::Text(v)
    }
}

impl From<NaiveDate> for Db2iBinding {
    fn from(v: NaiveDate) -> Self {
        Db2iBinding::Date(v)
    }
}

impl From<NaiveDateTime> for Db2iBinding {
    fn from(v: NaiveDateTime) -> Self {
        Db2iBinding::Timestamp(v)
    }
}
