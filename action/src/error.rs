//! Action construction errors.

use thiserror::Error;

/// Result type for insertion building.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors raised while synthesizing insert actions from schema metadata.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Unknown table: {name}")]
    UnknownTable { name: String },

    /// A chain of non-nullable foreign keys loops back onto a table already
    /// being expanded. Such a schema cannot be seeded row-by-row.
    #[error("Cyclic non-nullable foreign key: {table} -> {target}")]
    CyclicForeignKey { table: String, target: String },
}

impl BuildError {
    pub fn unknown_table(name: impl Into<String>) -> Self {
        Self::UnknownTable { name: name.into() }
    }
}
