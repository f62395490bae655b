//! Gene error types.

use thiserror::Error;

/// Result type for gene operations.
pub type GeneResult<T> = Result<T, GeneError>;

/// Errors that can occur during gene operations.
///
/// These are recoverable data errors. Programming errors (structural child
/// mutation on a childless gene, repair-index regression) panic instead.
#[derive(Debug, Error)]
pub enum GeneError {
    /// A value operation was invoked across incompatible gene variants.
    #[error("Gene type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// An enum index is outside the value list.
    #[error("Invalid enum index {index} for {size} values")]
    InvalidIndex { index: usize, size: usize },

    /// A collection insertion would exceed the declared maximum size.
    #[error("Collection {name} is at its maximum size {limit}")]
    MaxSizeReached { name: String, limit: usize },

    /// A collection removal would undershoot the declared minimum size.
    #[error("Collection {name} is at its minimum size {limit}")]
    MinSizeReached { name: String, limit: usize },

    /// A map insertion collides with an existing key.
    #[error("Map {name} already contains an equal key")]
    DuplicateKey { name: String },

    /// An element index is out of bounds.
    #[error("Element index {index} out of bounds for {name} with {size} elements")]
    ElementOutOfBounds {
        name: String,
        index: usize,
        size: usize,
    },

    /// Two genes of the same kind disagree on arity or template shape.
    #[error("Gene {name} cannot copy values from a differently shaped gene")]
    ShapeMismatch { name: String },
}

impl GeneError {
    pub fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch { expected, actual }
    }

    pub fn max_size_reached(name: impl Into<String>, limit: usize) -> Self {
        Self::MaxSizeReached {
            name: name.into(),
            limit,
        }
    }

    pub fn min_size_reached(name: impl Into<String>, limit: usize) -> Self {
        Self::MinSizeReached {
            name: name.into(),
            limit,
        }
    }

    pub fn duplicate_key(name: impl Into<String>) -> Self {
        Self::DuplicateKey { name: name.into() }
    }
}
