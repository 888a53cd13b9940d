//! Error types for the entity model

use thiserror::Error;

/// Errors raised synchronously by model mutators
///
/// The entity layer only rejects malformed arguments. Decode failures of cached
/// path forms degrade to an empty path, and graph wiring problems (missing
/// bindings, dangling component references, cycles) surface in the execution
/// engine rather than here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Ordinals of mapping attribute path instances must be zero or positive
    #[error("only positive integer values are allowed for ordinals, got {0}")]
    NegativeOrdinal(i64),
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;
