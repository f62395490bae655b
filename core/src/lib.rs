//! GERM Core Types
//!
//! This crate provides the foundational services used throughout the GERM
//! system:
//! - Identity types for relational genes (UniqueId, IdGenerator)
//! - Seeded randomness (the Randomness service injected into all
//!   randomization and tie-breaking operations)
//! - Deduplicated warn logging (unique_warn)

mod id;
mod logging;
mod rng;

pub use id::*;
pub use logging::*;
pub use rng::*;
