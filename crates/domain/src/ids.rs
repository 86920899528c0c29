//! Identifier newtypes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Unique id of a generated image, stable across persistence round trips.
///
/// New ids are UUID v4 strings. Any non-empty string is accepted when
/// parsing, because earlier builds stored epoch-millisecond timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GenerationId(String);

impl GenerationId {
    pub fn new() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GenerationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GenerationId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::parse("Generation id cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl TryFrom<String> for GenerationId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GenerationId> for String {
    fn from(value: GenerationId) -> Self {
        value.0
    }
}

impl From<Uuid> for GenerationId {
    fn from(value: Uuid) -> Self {
        Self::from_uuid(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique_uuids() {
        let id = GenerationId::new();
        assert_ne!(id, GenerationId::new());
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn parses_its_own_display_form() {
        let id = GenerationId::new();
        let parsed: GenerationId = id.to_string().parse().expect("valid id");
        assert_eq!(parsed, id);
    }

    #[test]
    fn accepts_timestamp_ids_from_older_builds() {
        let id: GenerationId = "1712345678901".parse().expect("timestamp id");
        assert_eq!(id.as_str(), "1712345678901");
    }

    #[test]
    fn rejects_blank_ids() {
        let err = "  ".parse::<GenerationId>().unwrap_err();
        assert!(matches!(err, DomainError::Parse(_)));

        let err = serde_json::from_str::<GenerationId>("\"\"").unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }
}
