//! GERM consistency checking and repair.
//!
//! Structure mutation can leave an insert-action sequence violating schema
//! constraints: dangling or unbound foreign keys, colliding unique columns or
//! primary keys, broken table constraints. The checker finds violations
//! without mutating anything; the repair engine re-randomizes offending genes
//! under a bounded attempt budget and truncates the sequence when an action
//! cannot be made consistent with its prefix.
//!
//! The two entry points a structure mutator needs are
//! [`verify_actions`] and [`repair_broken_actions`].

mod checker;
mod error;
mod repair;

pub use checker::*;
pub use error::*;
pub use repair::*;
