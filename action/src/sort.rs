//! Topological ordering of tables by foreign-key dependency.

use std::cmp::Ordering;
use std::sync::Arc;

use germ_schema::Table;

/// Order tables so a table comes before any table whose foreign key points at
/// it: targets first, referencing tables after, the order insertions need.
/// With `reversed` the order flips (deletion order).
///
/// This is a partial order: pairs with no foreign-key relation in either
/// direction keep their relative input order (the sort is stable). Table
/// names compare case-insensitively.
pub fn sort_tables_by_foreign_keys(tables: &[Arc<Table>], reversed: bool) -> Vec<Arc<Table>> {
    let mut sorted = tables.to_vec();
    sorted.sort_by(|a, b| {
        if references(a, b) {
            // a holds a foreign key into b, so b must come first
            Ordering::Greater
        } else if references(b, a) {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    });
    if reversed {
        sorted.reverse();
    }
    sorted
}

fn references(from: &Table, to: &Table) -> bool {
    from.foreign_keys
        .iter()
        .any(|fk| fk.target_table.eq_ignore_ascii_case(&to.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use germ_schema::{Column, ColumnType, ForeignKeyDef};

    fn table(name: &str, fk_targets: &[&str]) -> Arc<Table> {
        Arc::new(Table {
            name: name.to_string(),
            columns: vec![Column::new("id", ColumnType::Integer).primary_key()],
            foreign_keys: fk_targets
                .iter()
                .map(|t| ForeignKeyDef {
                    name: format!("fk_{}_{}", name, t),
                    source_columns: vec![format!("{}_id", t)],
                    target_table: t.to_string(),
                })
                .collect(),
            constraints: vec![],
        })
    }

    #[test]
    fn test_target_sorts_before_referencing_table() {
        // GIVEN - A references B
        let a = table("A", &["B"]);
        let b = table("B", &[]);

        // WHEN
        let sorted = sort_tables_by_foreign_keys(&[a, b], false);

        // THEN
        let names: Vec<&str> = sorted.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_reversed_flips_the_order()  {
        let a = table("A", &["B"]);
        let b = table("B", &[]);

        let sorted = sort_tables_by_foreign_keys(&[a, b], true);

        let names: Vec<&str> = sorted.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_unrelated_tables_keep_input_order() {
        let x = table("X", &[]);
        let y = table("Y", &[]);
        let z = table("Z", &[]);

        let sorted = sort_tables_by_foreign_keys(&[x, y, z], false);

        let names: Vec<&str> = sorted.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_comparison_ignores_name_case() {
        let a = table("Orders", &["users"]);
        let b = table("Users", &[]);

        let sorted = sort_tables_by_foreign_keys(&[a, b], false);

        let names: Vec<&str> = sorted.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Users", "Orders"]);
    }
}
