//! Type mapping tests: sampled-data conversion, catalog columns and driver
//! type names.

use dbt_db2i_core::db2i::types::{
    convert_boolean_type, convert_date_type, convert_datetime_type, convert_number_type,
    convert_text_type, convert_time_type, convert_type,
};
use dbt_db2i_core::db2i::{ColumnKind, data_type_name, translate_type};
use dbt_db2i_core::sqlx_core::type_info::TypeInfo;
use dbt_db2i_core::{
    ColumnType, Db2iBinding, Db2iColumn, Db2iTypeInfo, Db2iValue, TabularColumn, TabularResult,
};
use dbt_db2i_core::NativeColumn;
use dbt_db2i_core::db2i::decode_text_cell;
use odbc_api::DataType;
use odbc_api::sys::SqlDataType;
use rust_decimal::Decimal;
use std::str::FromStr;

fn single_column(column_type: ColumnType, values: Vec<Db2iValue>) -> TabularResult {
    TabularResult::new(
        vec![TabularColumn::new("c", column_type)],
        values.into_iter().map(|value| vec![value]).collect(),
    )
}

#[test]
fn test_text_width_is_widest_utf8_length() {
    let table = single_column(
        ColumnType::Text,
        vec!["short".into(), "a much longer piece of text".into(), Db2iValue::Null],
    );
    assert_eq!(convert_text_type(&table, 0), "varchar(27)");

    // Multi-byte characters count by encoded length
    let table = single_column(ColumnType::Text, vec!["ééééééééééé".into()]);
    assert_eq!(convert_text_type(&table, 0), "varchar(22)");
}

#[test]
fn test_text_width_has_floor_of_16() {
    let table = single_column(ColumnType::Text, vec!["a".into(), "bc".into()]);
    assert_eq!(convert_text_type(&table, 0), "varchar(16)");
}

#[test]
fn test_text_width_of_all_null_column() {
    let table = single_column(ColumnType::Text, vec![Db2iValue::Null, Db2iValue::Null]);
    assert_eq!(convert_text_type(&table, 0), "varchar(64)");

    let table = single_column(ColumnType::Text, vec![]);
    assert_eq!(convert_text_type(&table, 0), "varchar(64)");
}

#[test]
fn test_number_type_depends_on_fractions() {
    let ints = single_column(ColumnType::Number, vec![1i64.into(), 2.0f64.into(), Db2iValue::Null]);
    assert_eq!(convert_number_type(&ints, 0), "int");

    let floats = single_column(ColumnType::Number, vec![1i64.into(), 2.5f64.into()]);
    assert_eq!(convert_number_type(&floats, 0), "float");
}

#[test]
fn test_wide_decimal_keeps_its_fraction() {
    let table = TabularResult::from_native(
        &[NativeColumn::new("AMT", Db2iTypeInfo::decimal(31, 2))],
        vec![vec![Some("12345678901234567.89".to_string())]],
    );
    assert_eq!(
        table.rows()[0][0],
        Db2iValue::Decimal(Decimal::from_str("12345678901234567.89").unwrap())
    );
    assert_eq!(table.rows()[0][0].to_string(), "12345678901234567.89");
    assert_eq!(convert_number_type(&table, 0), "float");
}

#[test]
fn test_decimal_trailing_zeros_are_not_a_fraction() {
    let table = TabularResult::from_native(
        &[NativeColumn::new("QTY", Db2iTypeInfo::decimal(11, 2))],
        vec![vec![Some("100.00".to_string())], vec![Some("-7.0".to_string())], vec![None]],
    );
    assert!(matches!(table.rows()[0][0], Db2iValue::Decimal(_)));
    assert_eq!(convert_number_type(&table, 0), "int");
}

#[test]
fn test_text_cells_are_kept_whole_without_a_limit() {
    let long = "é".repeat(3000);
    assert_eq!(decode_text_cell(long.as_bytes(), None).unwrap(), long);
    assert_eq!(decode_text_cell(b"abcd", Some(4)).unwrap(), "abcd");
}

#[test]
fn test_text_cell_over_limit_is_an_error() {
    let err = decode_text_cell("ééé".as_bytes(), Some(5)).unwrap_err();
    assert!(!err.is_database_error());
    assert!(err.to_string().contains("6 bytes exceeds the maximum text size of 5 bytes"));
}

#[test]
fn test_fixed_conversions() {
    let table = single_column(ColumnType::Boolean, vec![true.into()]);
    assert_eq!(convert_boolean_type(&table, 0), "decimal(1)");
    assert_eq!(convert_datetime_type(&table, 0), "timestamp");
    assert_eq!(convert_date_type(&table, 0), "date");
    assert_eq!(convert_time_type(&table, 0), "time");
}

#[test]
fn test_convert_type_dispatches_on_column_type() {
    let table = TabularResult::new(
        vec![
            TabularColumn::new("flag", ColumnType::Boolean),
            TabularColumn::new("loaded_at", ColumnType::DateTime),
            TabularColumn::new("amount", ColumnType::Number),
        ],
        vec![vec![true.into(), Db2iValue::Null, 9.75f64.into()]],
    );
    assert_eq!(convert_type(&table, 0).as_deref(), Some("decimal(1)"));
    assert_eq!(convert_type(&table, 1).as_deref(), Some("timestamp"));
    assert_eq!(convert_type(&table, 2).as_deref(), Some("float"));
    assert_eq!(convert_type(&table, 3), None);
}

#[test]
fn test_decode_cells_by_column_type() {
    assert_eq!(Db2iValue::decode(Some(" 42 ".into()), ColumnType::Number), Db2iValue::Integer(42));
    assert_eq!(
        Db2iValue::decode(Some("4.50".into()), ColumnType::Number),
        Db2iValue::Decimal(Decimal::new(450, 2))
    );
    // Exponent notation is only representable as a float
    assert_eq!(
        Db2iValue::decode(Some("1.5E3".into()), ColumnType::Number),
        Db2iValue::Float(1500.0)
    );
    assert_eq!(Db2iValue::decode(Some("1".into()), ColumnType::Boolean), Db2iValue::Boolean(true));
    assert_eq!(Db2iValue::decode(None, ColumnType::Text), Db2iValue::Null);
    assert!(matches!(
        Db2iValue::decode(Some("2024-01-31-12.30.00.000000".into()), ColumnType::DateTime),
        Db2iValue::DateTime(_)
    ));
    // Unparseable cells are kept as text
    assert_eq!(
        Db2iValue::decode(Some("n/a".into()), ColumnType::Number),
        Db2iValue::Text("n/a".into())
    );
}

#[test]
fn test_binding_text() {
    assert_eq!(Db2iBinding::Bool(true).to_text().as_deref(), Some("1"));
    assert_eq!(
        Db2iBinding::from(Decimal::new(-1205, 2)).to_text().as_deref(),
        Some("-12.05")
    );
    assert_eq!(Db2iBinding::Null.to_text(), None);
    let ts = chrono::NaiveDate::from_ymd_opt(2024, 1, 31)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap();
    assert_eq!(
        Db2iBinding::from(ts).to_text().as_deref(),
        Some("2024-01-31 12:30:00.000000")
    );
}

#[test]
fn test_type_labels() {
    assert_eq!(translate_type("STRING"), "VARCHAR(4000)");
    assert_eq!(translate_type("float"), "DECFLOAT");
    assert_eq!(translate_type("INTEGER"), "INTEGER");
    assert_eq!(translate_type("TIMESTAMP"), "TIMESTAMP");
    assert_eq!(translate_type("SMALLINT"), "SMALLINT");

    let column = Db2iColumn::create("amount", "FLOAT");
    assert_eq!(column.dtype(), "DECFLOAT");
    assert!(column.is_numeric());
}

#[test]
fn test_column_data_type_rendering() {
    assert_eq!(Db2iColumn::new("name", "VARCHAR").with_char_size(20).data_type(), "VARCHAR(20)");
    assert_eq!(Db2iColumn::new("name", "VARCHAR").data_type(), "VARCHAR");
    assert_eq!(
        Db2iColumn::new("amount", "DECIMAL").with_numeric(10, 2).data_type(),
        "DECIMAL(10,2)"
    );
    assert_eq!(Db2iColumn::new("id", "INTEGER").data_type(), "INTEGER");
    assert_eq!(
        Db2iColumn::new("name", "nvarchar").with_char_size(5).to_string(),
        "name nvarchar(5)"
    );
}

#[test]
fn test_column_from_description() {
    let column = Db2iColumn::from_description("name", "varchar(20)");
    assert_eq!(column.dtype(), "varchar");
    assert_eq!(column.char_size(), Some(20));
    assert_eq!(column.data_type(), "varchar(20)");

    let column = Db2iColumn::from_description("amount", "decimal(10, 2)");
    assert_eq!(column.data_type(), "decimal(10,2)");

    let column = Db2iColumn::from_description("created", "timestamp");
    assert_eq!(column.kind(), ColumnKind::Timestamp);
}

#[test]
fn test_column_classification() {
    assert_eq!(Db2iColumn::new("a", "CHAR").kind(), ColumnKind::String);
    assert_eq!(Db2iColumn::new("a", "DECFLOAT").kind(), ColumnKind::Numeric);
    assert_eq!(Db2iColumn::new("a", "BIGINT").kind(), ColumnKind::Numeric);
    assert_eq!(Db2iColumn::new("a", "DOUBLE").kind(), ColumnKind::Numeric);
    assert_eq!(Db2iColumn::new("a", "BLOB").kind(), ColumnKind::Other);
    assert!(Db2iColumn::new("a", "INTEGER").is_integer());
    assert!(!Db2iColumn::new("a", "INTEGER").is_numeric());
}

#[test]
fn test_string_expansion() {
    let narrow = Db2iColumn::new("a", "VARCHAR").with_char_size(10);
    let wide = Db2iColumn::new("a", "VARCHAR").with_char_size(100);
    let unsized_col = Db2iColumn::new("a", "VARCHAR");
    assert!(narrow.can_expand_to(&wide));
    assert!(!wide.can_expand_to(&narrow));
    assert_eq!(unsized_col.string_size(), Some(256));
    assert_eq!(Db2iColumn::new("a", "INTEGER").string_size(), None);
    assert_eq!(narrow.literal("'x'"), "cast('x' as VARCHAR(10))");
}

#[test]
fn test_driver_type_names() {
    assert_eq!(data_type_name(DataType::Bit), "SMALLINT");
    assert_eq!(data_type_name(DataType::LongVarchar { length: None }), "CLOB");
    let decfloat = DataType::Other {
        data_type: SqlDataType(-360),
        column_size: None,
        decimal_digits: 0,
    };
    assert_eq!(data_type_name(decfloat), "DECFLOAT");
    assert_eq!(Db2iTypeInfo::new(decfloat).column_type(), ColumnType::Number);

    assert_eq!(Db2iTypeInfo::varchar(10).name(), "VARCHAR");
    assert_eq!(Db2iTypeInfo::varchar(10), Db2iTypeInfo::varchar(200));
    assert!(Db2iTypeInfo::null().is_null());
    assert_eq!(Db2iTypeInfo::date().column_type(), ColumnType::Date);
    assert_eq!(Db2iTypeInfo::decimal(10, 2).column_type(), ColumnType::Number);
}
