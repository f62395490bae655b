//! Repair errors.
//!
//! These are configuration or schema faults: the repair engine cannot
//! proceed and the caller should abandon this candidate. Expected data
//! problems (exhausted repair attempts) are signalled through return values,
//! not errors; engine bugs (repair index regression) panic.

use germ_action::BuildError;
use thiserror::Error;

/// Result type for repair operations.
pub type RepairResult<T> = Result<T, RepairError>;

/// Errors raised by foreign-key repair.
#[derive(Debug, Error)]
pub enum RepairError {
    /// A missing foreign-key target had to be synthesized but no insertion
    /// builder was supplied.
    #[error("No insertion builder available to create a row for table {table}")]
    NoInsertionBuilder { table: String },

    /// A synthesized sequence still lacks a primary key for the target
    /// table.
    #[error("Failed to create a primary key for target table {table}")]
    ForeignKeyTargetMissing { table: String },

    /// The first action of a synthesized sequence carries a non-nullable
    /// unbound foreign key; such a sequence can never verify.
    #[error("Invalid insertion: unresolved foreign key at position {index}")]
    InvalidInsertion { index: usize },

    /// The rebinding sweep finished but verification still fails.
    #[error("Foreign key repair failed to produce a consistent sequence")]
    ForeignKeyRepairFailed,

    /// Synthesizing the target row failed.
    #[error(transparent)]
    Build(#[from] BuildError),
}
