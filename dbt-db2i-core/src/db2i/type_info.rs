//! Native type information reported by the driver.

use odbc_api::DataType;
use sqlx_core::type_info::TypeInfo;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// SQL type code the IBM i Access driver reports for DECFLOAT columns.
pub const SQL_DECFLOAT: i16 = -360;

/// Dialect-neutral classification of a tabular column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Text,
    Number,
    Boolean,
    Date,
    Time,
    DateTime,
}

/// Type information for a result column, as described by the driver.
#[derive(Debug, Clone, Eq)]
pub struct Db2iTypeInfo {
    pub(crate) data_type: DataType,
}

impl Db2iTypeInfo {
    pub const fn new(data_type: DataType) -> Self {
        Self { data_type }
    }

    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    pub const fn null() -> Self {
        Self {
            data_type: DataType::Unknown,
        }
    }

    pub const fn integer() -> Self {
        Self {
            data_type: DataType::Integer,
        }
    }

    pub const fn big_int() -> Self {
        Self {
            data_type: DataType::BigInt,
        }
    }

    pub const fn double() -> Self {
        Self {
            data_type: DataType::Double,
        }
    }

    pub const fn date() -> Self {
        Self {
            data_type: DataType::Date,
        }
    }

    pub fn decimal(precision: usize, scale: i16) -> Self {
        Self {
            data_type: DataType::Decimal { precision, scale },
        }
    }

    pub fn varchar(length: usize) -> Self {
        Self {
            data_type: DataType::Varchar {
                length: std::num::NonZero::new(length),
            },
        }
    }

    /// How values of this type are represented in a tabular result.
    pub fn column_type(&self) -> ColumnType {
        let dt = self.data_type;
        if dt.accepts_character_data() {
            ColumnType::Text
        } else if dt.accepts_numeric_data() {
            ColumnType::Number
        } else {
            match dt {
                DataType::Bit => ColumnType::Boolean,
                DataType::Date => ColumnType::Date,
                DataType::Time { .. } => ColumnType::Time,
                DataType::Timestamp { .. } => ColumnType::DateTime,
                _ => ColumnType::Text,
            }
        }
    }
}

impl TypeInfo for Db2iTypeInfo {
    fn is_null(&self) -> bool {
        matches!(self.data_type, DataType::Unknown)
    }

    fn name(&self) -> &str {
        data_type_name(self.data_type)
    }
}

impl Display for Db2iTypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.pad(self.name())
    }
}

impl PartialEq<Db2iTypeInfo> for Db2iTypeInfo {
    fn eq(&self, other: &Db2iTypeInfo) -> bool {
        // Compare by type category, not exact parameters
        std::mem::discriminant(&self.data_type) == std::mem::discriminant(&other.data_type)
    }
}

/// Get the Db2 for i spelling of a driver-reported type.
pub fn data_type_name(dt: DataType) -> &'static str {
    match dt {
        DataType::BigInt => "BIGINT",
        DataType::Binary { .. } => "BINARY",
        DataType::Bit => "SMALLINT",
        DataType::Char { .. } => "CHAR",
        DataType::Date => "DATE",
        DataType::Decimal { .. } => "DECIMAL",
        DataType::Double => "DOUBLE",
        DataType::Float { .. } => "FLOAT",
        DataType::Integer => "INTEGER",
        DataType::LongVarbinary { .. } => "BLOB",
        DataType::LongVarchar { .. } => "CLOB",
        DataType::Numeric { .. } => "NUMERIC",
        DataType::Real => "REAL",
        DataType::SmallInt => "SMALLINT",
        DataType::Time { .. } => "TIME",
        DataType::Timestamp { .. } => "TIMESTAMP",
        DataType::TinyInt => "SMALLINT",
        DataType::Varbinary { .. } => "VARBINARY",
        DataType::Varchar { .. } => "VARCHAR",
        DataType::WChar { .. } => "NCHAR",
        DataType::WLongVarchar { .. } => "DBCLOB",
        DataType::WVarchar { .. } => "NVARCHAR",
        DataType::Unknown => "UNKNOWN",
        DataType::Other { data_type, .. } if data_type.0 == SQL_DECFLOAT => "DECFLOAT",
        DataType::Other { .. } => "OTHER",
    }
}

/// Extension trait for DataType with helper methods
pub trait DataTypeExt {
    /// Check if this is a character/string type
    fn accepts_character_data(self) -> bool;

    /// Check if this is a numeric type
    fn accepts_numeric_data(self) -> bool;
}

impl DataTypeExt for DataType {
    fn accepts_character_data(self) -> bool {
        matches!(
            self,
            DataType::Char { .. }
                | DataType::Varchar { .. }
                | DataType::LongVarchar { .. }
                | DataType::WChar { .. }
                | DataType::WVarchar { .. }
                | DataType::WLongVarchar { .. }
        )
    }

    fn accepts_numeric_data(self) -> bool {
        match self {
            DataType::TinyInt
            | DataType::SmallInt
            | DataType::Integer
            | DataType::BigInt
            | DataType::Real
            | DataType::Float { .. }
            | DataType::Double
            | DataType::Decimal { .. }
            | DataType::Numeric { .. } => true,
            DataType::Other { data_type, .. } => data_type.0 == SQL_DECFLOAT,
            _ => false,
        }
    }
}
