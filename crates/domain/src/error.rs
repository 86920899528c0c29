//! Unified error types for the domain layer
//!
//! Value objects and entities validate on construction and report failures
//! through [`DomainError`], so adapters never have to pass raw strings around.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., empty prompt, missing image)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for values that break a construction rule.
    ///
    /// # Example
    /// ```ignore
    /// if prompt.trim().is_empty() {
    ///     return Err(DomainError::validation("Prompt cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// Used by `FromStr` implementations when the input does not name a
    /// known variant, e.g. an unknown style id.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
