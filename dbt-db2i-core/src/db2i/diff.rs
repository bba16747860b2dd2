//! SQL comparing the contents of two relations.

use crate::db2i::relation::{Db2iRelation, quote_identifier};

/// Build a query returning one row: `row_count_difference` (rows in `a`
/// minus rows in `b`) and `num_mismatched` (rows present on only one side).
///
/// Columns are quoted and sorted, so the same inputs always produce the same
/// text. `except_operator` is inserted verbatim.
pub fn rows_different_sql<S: AsRef<str>>(
    relation_a: &Db2iRelation,
    relation_b: &Db2iRelation,
    column_names: &[S],
    except_operator: &str,
) -> String {
    let mut names: Vec<String> = column_names
        .iter()
        .map(|name| quote_identifier(name.as_ref()))
        .collect();
    names.sort();
    let columns = names.join(", ");

    format!(
        r#"with diff_count as (
    SELECT
        1 as id,
        COUNT(*) as num_missing FROM (
            (SELECT {columns} FROM {relation_a} {except_op}
             SELECT {columns} FROM {relation_b})
             UNION ALL
            (SELECT {columns} FROM {relation_b} {except_op}
             SELECT {columns} FROM {relation_a})
        ) as a
), table_a as (
    SELECT COUNT(*) as num_rows FROM {relation_a}
), table_b as (
    SELECT COUNT(*) as num_rows FROM {relation_b}
), row_count_diff as (
    select
        1 as id,
        table_a.num_rows - table_b.num_rows as difference
    from table_a, table_b
)
select
    row_count_diff.difference as row_count_difference,
    diff_count.num_missing as num_mismatched
from row_count_diff
join diff_count on row_count_diff.id = diff_count.id"#,
        columns = columns,
        relation_a = relation_a,
        relation_b = relation_b,
        except_op = except_operator,
    )
}
