//! Schema validation errors.

use thiserror::Error;

/// Result type for schema construction.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building or validating a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Duplicate table: {name}")]
    DuplicateTable { name: String },

    #[error("Duplicate column: {column} on table {table}")]
    DuplicateColumn { table: String, column: String },

    #[error("Table {table} has no columns")]
    EmptyTable { table: String },

    #[error("Foreign key {name} on table {table} targets unknown table {target}")]
    UnknownTargetTable {
        table: String,
        name: String,
        target: String,
    },

    #[error("Unknown column {column} referenced by {context} on table {table}")]
    UnknownColumn {
        table: String,
        column: String,
        context: String,
    },
}

impl SchemaError {
    pub fn duplicate_table(name: impl Into<String>) -> Self {
        Self::DuplicateTable { name: name.into() }
    }

    pub fn duplicate_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::DuplicateColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn unknown_column(
        table: impl Into<String>,
        column: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
            context: context.into(),
        }
    }
}
