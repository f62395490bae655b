//! SchemaBuilder for constructing an immutable Schema.

use std::sync::Arc;

use crate::{Column, ForeignKeyDef, Schema, SchemaError, SchemaResult, Table, TableConstraint};

/// Builder for constructing an immutable Schema.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    tables: Vec<Table>,
}

impl SchemaBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a table definition.
    pub fn add_table(&mut self, name: impl Into<String>) -> TableBuilder<'_> {
        TableBuilder {
            builder: self,
            table: Table {
                name: name.into(),
                columns: Vec::new(),
                foreign_keys: Vec::new(),
                constraints: Vec::new(),
            },
        }
    }

    /// Validate all definitions and produce the schema.
    pub fn build(self) -> SchemaResult<Schema> {
        for table in &self.tables {
            if self
                .tables
                .iter()
                .filter(|t| t.name.eq_ignore_ascii_case(&table.name))
                .count()
                > 1
            {
                return Err(SchemaError::duplicate_table(&table.name));
            }
            if table.columns.is_empty() {
                return Err(SchemaError::EmptyTable {
                    table: table.name.clone(),
                });
            }

            for fk in &table.foreign_keys {
                if !self
                    .tables
                    .iter()
                    .any(|t| t.name.eq_ignore_ascii_case(&fk.target_table))
                {
                    return Err(SchemaError::UnknownTargetTable {
                        table: table.name.clone(),
                        name: fk.name.clone(),
                        target: fk.target_table.clone(),
                    });
                }
                for column in &fk.source_columns {
                    if table.column(column).is_none() {
                        return Err(SchemaError::unknown_column(
                            &table.name,
                            column,
                            format!("foreign key {}", fk.name),
                        ));
                    }
                }
            }

            for constraint in &table.constraints {
                for column in constraint.relevant_columns() {
                    if table.column(column).is_none() {
                        return Err(SchemaError::unknown_column(
                            &table.name,
                            column,
                            "table constraint",
                        ));
                    }
                }
            }
        }

        Ok(Schema::new(self.tables.into_iter().map(Arc::new).collect()))
    }
}

/// Builder for one table definition.
pub struct TableBuilder<'b> {
    builder: &'b mut SchemaBuilder,
    table: Table,
}

impl<'b> TableBuilder<'b> {
    /// Add a column.
    pub fn column(mut self, column: Column) -> Self {
        self.table.columns.push(column);
        self
    }

    /// Declare a foreign key from `source_columns` to the primary key of
    /// `target_table`.
    pub fn foreign_key(
        mut self,
        name: impl Into<String>,
        source_columns: impl IntoIterator<Item = impl Into<String>>,
        target_table: impl Into<String>,
    ) -> Self {
        self.table.foreign_keys.push(ForeignKeyDef {
            name: name.into(),
            source_columns: source_columns.into_iter().map(Into::into).collect(),
            target_table: target_table.into(),
        });
        self
    }

    /// Attach a table-level constraint.
    pub fn constraint(mut self, constraint: TableConstraint) -> Self {
        self.table.constraints.push(constraint);
        self
    }

    /// Finish this table, validating local column uniqueness.
    pub fn done(self) -> SchemaResult<&'b mut SchemaBuilder> {
        for column in &self.table.columns {
            if self
                .table
                .columns
                .iter()
                .filter(|c| c.name == column.name)
                .count()
                > 1
            {
                return Err(SchemaError::duplicate_column(&self.table.name, &column.name));
            }
        }
        self.builder.tables.push(self.table);
        Ok(self.builder)
    }
}
