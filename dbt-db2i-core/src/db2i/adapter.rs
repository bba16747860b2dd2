//! The adapter surface consulted by the host engine.

use crate::db2i::column::Db2iColumn;
use crate::db2i::diff::rows_different_sql;
use crate::db2i::error::{Db2iError, Db2iResult};
use crate::db2i::relation::{Db2iRelation, quote_identifier};
use crate::db2i::table::TabularResult;
use crate::db2i::types;
use crate::db2i::value::Db2iValue;
use crate::db2i::{AdapterResponse, Db2iConnectionManager};
use rust_decimal::prelude::ToPrimitive;

/// Dialect helpers layered over one worker's connection manager.
#[derive(Debug)]
pub struct Db2iAdapter {
    manager: Db2iConnectionManager,
}

impl Db2iAdapter {
    pub fn new(manager: Db2iConnectionManager) -> Self {
        Self { manager }
    }

    pub fn connections(&mut self) -> &mut Db2iConnectionManager {
        &mut self.manager
    }

    pub fn into_inner(self) -> Db2iConnectionManager {
        self.manager
    }

    pub fn execute(
        &mut self,
        sql: &str,
        auto_begin: bool,
        fetch: bool,
    ) -> Db2iResult<(AdapterResponse, TabularResult)> {
        self.manager.execute(sql, auto_begin, fetch)
    }

    pub fn date_function() -> &'static str {
        "current_timestamp"
    }

    pub fn quote(identifier: &str) -> String {
        quote_identifier(identifier)
    }

    /// Native type for a column of sampled data.
    pub fn convert_type(table: &TabularResult, col_idx: usize) -> Option<String> {
        types::convert_type(table, col_idx)
    }

    /// Check that the database answers at all.
    pub fn debug_query(&mut self) -> Db2iResult<()> {
        self.execute("select 1 as one from sysibm.sysdummy1", false, false)?;
        Ok(())
    }

    pub fn timestamp_add_sql(add_to: &str, number: i64, interval: &str) -> String {
        format!("{} - {} {}", add_to, number, interval)
    }

    pub fn string_add_sql(add_to: &str, value: &str, location: &str) -> Db2iResult<String> {
        match location {
            "append" => Ok(format!("{} || '{}'", add_to, value)),
            "prepend" => Ok(format!("'{}' || {}", value, add_to)),
            other => Err(Db2iError::internal(format!(
                "Got an unexpected location value of \"{}\"",
                other
            ))),
        }
    }

    /// Columns of `relation` in ordinal order, read from the catalog.
    pub fn get_columns_in_relation(
        &mut self,
        relation: &Db2iRelation,
    ) -> Db2iResult<Vec<Db2iColumn>> {
        let schema = relation
            .schema()
            .or_else(|| self.manager.credentials().get_schema())
            .ok_or_else(|| {
                Db2iError::internal(format!("relation {} has no schema", relation))
            })?;
        let identifier = relation.identifier().ok_or_else(|| {
            Db2iError::internal(format!("relation {} has no identifier", relation))
        })?;
        let quoting = relation.quote_policy();
        let sql = format!(
            "select column_name, data_type, length, numeric_precision, numeric_scale \
             from qsys2.syscolumns \
             where table_schema = {} and table_name = {} \
             order by ordinal_position",
            catalog_literal(schema, quoting.schema),
            catalog_literal(identifier, quoting.identifier),
        );

        let (_, table) = self.execute(&sql, false, true)?;
        columns_from_catalog(&table)
    }

    /// SQL reporting how the rows of `relation_a` and `relation_b` differ.
    ///
    /// Without `column_names` the columns of `relation_a` are used; the two
    /// relations are assumed to share them.
    pub fn get_rows_different_sql(
        &mut self,
        relation_a: &Db2iRelation,
        relation_b: &Db2iRelation,
        column_names: Option<&[String]>,
        except_operator: &str,
    ) -> Db2iResult<String> {
        let names: Vec<String> = match column_names {
            Some(names) => names.to_vec(),
            None => self
                .get_columns_in_relation(relation_a)?
                .into_iter()
                .map(|column| column.column)
                .collect(),
        };
        Ok(rows_different_sql(
            relation_a,
            relation_b,
            &names,
            except_operator,
        ))
    }
}

/// A catalog lookup literal. Unquoted names are stored upper case.
fn catalog_literal(name: &str, quoted: bool) -> String {
    let name = if quoted {
        name.to_string()
    } else {
        name.to_uppercase()
    };
    format!("'{}'", name.replace('\'', "''"))
}

fn columns_from_catalog(table: &TabularResult) -> Db2iResult<Vec<Db2iColumn>> {
    let index = |name: &str| {
        table.column_index(name).ok_or_else(|| {
            Db2iError::internal(format!("catalog query returned no {} column", name))
        })
    };
    let name_idx = index("column_name")?;
    let type_idx = index("data_type")?;
    let length_idx = index("length")?;
    let precision_idx = index("numeric_precision")?;
    let scale_idx = index("numeric_scale")?;

    Ok(table
        .rows()
        .iter()
        .map(|row| {
            let mut column = Db2iColumn::new(
                row[name_idx].to_string().trim_end(),
                row[type_idx].to_string().trim_end(),
            );
            if column.is_string() {
                column.char_size = as_u32(&row[length_idx]);
            } else if column.is_numeric() {
                column.numeric_precision = as_u32(&row[precision_idx]);
                column.numeric_scale = as_u32(&row[scale_idx]);
            }
            column
        })
        .collect())
}

fn as_u32(value: &Db2iValue) -> Option<u32> {
    match value {
        Db2iValue::Integer(i) => u32::try_from(*i).ok(),
        Db2iValue::Decimal(d) => d.trunc().to_u32(),
        Db2iValue::Float(f) if *f >= 0.0 => Some(*f as u32),
        Db2iValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}
