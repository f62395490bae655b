//! GERM database actions.
//!
//! An insert action is one pending row insertion: a reference to immutable
//! table metadata plus the top-level genes bound to its columns. This crate
//! builds actions from schema metadata (including recursive synthesis of
//! foreign-key target rows) and orders tables topologically by their foreign
//! keys.

mod action;
mod builder;
mod error;
mod sort;
mod translate;

pub use action::*;
pub use builder::*;
pub use error::*;
pub use sort::*;
pub use translate::*;
