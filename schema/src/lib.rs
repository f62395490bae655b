//! GERM schema metadata.
//!
//! Read-only table metadata supplied by a schema provider: tables, columns
//! with their flags and value domains, declared foreign keys, and table-level
//! constraints. Gene trees are built from this metadata and verified against
//! it; the metadata itself never changes after `SchemaBuilder::build`.

mod builder;
mod constraint;
mod error;
mod types;

pub use builder::*;
pub use constraint::*;
pub use error::*;
pub use types::*;
