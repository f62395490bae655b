//! Table and column definitions.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::TableConstraint;

/// Value domain of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    Text,
    Date,
    Time,
    Timestamp,
    /// One of a fixed set of string constants.
    Enumeration(Vec<String>),
}

/// A column within a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Value domain.
    pub column_type: ColumnType,
    /// Whether this column is part of the primary key.
    pub primary_key: bool,
    /// Whether the database assigns the value on insertion.
    pub auto_increment: bool,
    /// Whether values must be unique across rows.
    pub unique: bool,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Minimum numeric value constraint.
    pub min: Option<i64>,
    /// Maximum numeric value constraint.
    pub max: Option<i64>,
    /// Minimum text length constraint.
    pub length_min: Option<usize>,
    /// Maximum text length constraint.
    pub length_max: Option<usize>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            primary_key: false,
            auto_increment: false,
            unique: false,
            nullable: false,
            min: None,
            max: None,
            length_min: None,
            length_max: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        if min.is_some() {
            self.min = min;
        }
        if max.is_some() {
            self.max = max;
        }
        self
    }

    pub fn with_length(mut self, min: usize, max: usize) -> Self {
        self.length_min = Some(min);
        self.length_max = Some(max);
        self
    }
}

/// A declared foreign key: one or more source columns referencing the primary
/// key of a target table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyDef {
    /// Constraint name.
    pub name: String,
    /// Columns on the owning table that hold the reference.
    pub source_columns: Vec<String>,
    /// Table whose primary key is referenced.
    pub target_table: String,
}

/// Immutable metadata for one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Ordered column definitions.
    pub columns: Vec<Column>,
    /// Declared foreign keys.
    pub foreign_keys: Vec<ForeignKeyDef>,
    /// Table-level constraints.
    pub constraints: Vec<TableConstraint>,
}

impl Table {
    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns that form the primary key, in declaration order.
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    /// Whether any primary-key column is database-assigned. Such keys cannot
    /// collide by construction.
    pub fn has_auto_increment_primary_key(&self) -> bool {
        self.columns.iter().any(|c| c.primary_key && c.auto_increment)
    }

    /// The foreign key (if any) that `column` is a source of.
    pub fn foreign_key_for_column(&self, column: &str) -> Option<&ForeignKeyDef> {
        self.foreign_keys
            .iter()
            .find(|fk| fk.source_columns.iter().any(|c| c == column))
    }

    /// Whether `column` participates in a declared foreign key.
    pub fn is_foreign_key_column(&self, column: &str) -> bool {
        self.foreign_key_for_column(column).is_some()
    }
}

/// An immutable set of tables produced by one schema-load session.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: Vec<Arc<Table>>,
    by_name: HashMap<String, usize>,
}

impl Schema {
    pub(crate) fn new(tables: Vec<Arc<Table>>) -> Self {
        let by_name = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.to_lowercase(), i))
            .collect();
        Self { tables, by_name }
    }

    /// Look up a table by name, case-insensitively (SQL identifiers are
    /// case-preserving but compared without case).
    pub fn table(&self, name: &str) -> Option<&Arc<Table>> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&i| &self.tables[i])
    }

    /// All tables, in declaration order.
    pub fn tables(&self) -> &[Arc<Table>] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
