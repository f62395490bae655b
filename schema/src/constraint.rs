//! Table-level constraints.
//!
//! A constraint is evaluated against one row plus the rows inserted before it
//! in the same sequence. Rows are abstracted as column→raw-value lookups so
//! the evaluation stays independent of how genes are stored.

use serde::{Deserialize, Serialize};

/// Column→value view of one pending insertion. The values are the raw string
/// projections of the row's genes.
pub trait ColumnValues {
    /// Raw value of `column`, or None when the row does not set it.
    fn value_of(&self, column: &str) -> Option<String>;
}

impl ColumnValues for std::collections::HashMap<String, String> {
    fn value_of(&self, column: &str) -> Option<String> {
        self.get(column).cloned()
    }
}

/// A predicate over one row and its predecessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TableConstraint {
    /// The combination of these columns must be unique across rows of the
    /// table.
    UniqueTogether { columns: Vec<String> },
    /// An integer column must stay within an inclusive range.
    Range { column: String, min: i64, max: i64 },
    /// A column's raw value must be one of the listed constants.
    AllowedValues {
        column: String,
        values: Vec<String>,
    },
}

impl TableConstraint {
    /// Columns involved in this constraint; when the constraint is violated,
    /// the offending gene is chosen among these.
    pub fn relevant_columns(&self) -> &[String] {
        match self {
            TableConstraint::UniqueTogether { columns } => columns,
            TableConstraint::Range { column, .. } => std::slice::from_ref(column),
            TableConstraint::AllowedValues { column, .. } => std::slice::from_ref(column),
        }
    }

    /// Evaluate against `row` and the same-table rows strictly before it.
    /// A column the row does not set never violates.
    pub fn evaluate(&self, row: &dyn ColumnValues, previous: &[&dyn ColumnValues]) -> bool {
        match self {
            TableConstraint::UniqueTogether { columns } => {
                let key = match combined_key(row, columns) {
                    Some(key) => key,
                    None => return true,
                };
                !previous
                    .iter()
                    .any(|p| combined_key(*p, columns).as_deref() == Some(key.as_str()))
            }
            TableConstraint::Range { column, min, max } => match row.value_of(column) {
                Some(raw) => match raw.parse::<i64>() {
                    Ok(value) => (*min..=*max).contains(&value),
                    // Non-numeric content is a typing problem, not a range
                    // violation.
                    Err(_) => true,
                },
                None => true,
            },
            TableConstraint::AllowedValues { column, values } => match row.value_of(column) {
                Some(raw) => values.iter().any(|v| *v == raw),
                None => true,
            },
        }
    }
}

fn combined_key(row: &dyn ColumnValues, columns: &[String]) -> Option<String> {
    let mut parts = Vec::with_capacity(columns.len());
    for column in columns {
        parts.push(row.value_of(column)?);
    }
    Some(parts.join("__"))
}
