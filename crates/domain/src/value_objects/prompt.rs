//! Validated prompt text
//!
//! A prompt describes the transformation to apply to the uploaded image.
//! It is valid by construction:
//! - Non-empty after trimming
//! - At most [`MAX_PROMPT_LENGTH`] characters
//! - Trimmed of leading/trailing whitespace

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum number of characters accepted in a prompt.
pub const MAX_PROMPT_LENGTH: usize = 500;

/// A validated transformation prompt (non-empty, <=500 chars, trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PromptText(String);

impl PromptText {
    /// Create a new validated prompt.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if:
    /// - The prompt is empty after trimming
    /// - The prompt exceeds 500 characters after trimming
    pub fn new(prompt: impl Into<String>) -> Result<Self, DomainError> {
        let prompt = prompt.into();
        let trimmed = prompt.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Prompt cannot be empty"));
        }
        let length = trimmed.chars().count();
        if length > MAX_PROMPT_LENGTH {
            return Err(DomainError::validation(format!(
                "Prompt cannot exceed {} characters (got {})",
                MAX_PROMPT_LENGTH, length
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the prompt as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Characters still available before hitting the limit.
    pub fn remaining(&self) -> usize {
        MAX_PROMPT_LENGTH.saturating_sub(self.0.chars().count())
    }
}

impl fmt::Display for PromptText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PromptText {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PromptText> for String {
    fn from(prompt: PromptText) -> String {
        prompt.0
    }
}
