//! Generation request and result entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{ImageRef, PromptText, StyleId};
use crate::GenerationId;

/// What the user submitted: source image, transformation prompt and style.
///
/// Validated when built; the controller never re-checks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    source_image: ImageRef,
    prompt: PromptText,
    style: StyleId,
}

impl GenerationRequest {
    pub fn new(source_image: ImageRef, prompt: PromptText, style: StyleId) -> Self {
        Self {
            source_image,
            prompt,
            style,
        }
    }

    /// Build a request from raw form input.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the image is missing or the
    /// prompt is blank/too long, and `DomainError::Parse` for an unknown style.
    pub fn from_input(
        source_image: Option<&str>,
        prompt: &str,
        style: &str,
    ) -> Result<Self, DomainError> {
        let source_image = source_image
            .ok_or_else(|| DomainError::validation("An image must be uploaded first"))
            .and_then(ImageRef::new)?;
        let prompt = PromptText::new(prompt)?;
        let style = style.parse()?;
        Ok(Self::new(source_image, prompt, style))
    }

    pub fn source_image(&self) -> &ImageRef {
        &self.source_image
    }

    pub fn prompt(&self) -> &PromptText {
        &self.prompt
    }

    pub fn style(&self) -> StyleId {
        self.style
    }
}

/// A completed generation, as shown in the history.
///
/// Field names on the wire match the payload browsers already have stored
/// under the history key, so old entries keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub id: GenerationId,
    #[serde(rename = "imageUrl")]
    pub generated_image: ImageRef,
    #[serde(rename = "originalImageUrl")]
    pub source_image: ImageRef,
    pub prompt: String,
    pub style: StyleId,
    /// Unix epoch milliseconds on the wire
    #[serde(rename = "createdAt", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl GenerationResult {
    /// Create the result of a successful attempt for `request`.
    pub fn for_request(
        request: &GenerationRequest,
        id: GenerationId,
        generated_image: ImageRef,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            generated_image,
            source_image: request.source_image().clone(),
            prompt: request.prompt().to_string(),
            style: request.style(),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request() -> GenerationRequest {
        GenerationRequest::from_input(Some("data:image/jpeg;base64,QUJD"), "neon city", "cyberpunk")
            .expect("valid request")
    }

    #[test]
    fn from_input_requires_an_image() {
        let err = GenerationRequest::from_input(None, "neon city", "cyberpunk").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn from_input_requires_a_prompt() {
        let err = GenerationRequest::from_input(Some("https://x/y.png"), "   ", "vintage")
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn from_input_rejects_unknown_style() {
        let err = GenerationRequest::from_input(Some("https://x/y.png"), "sunset", "baroque")
            .unwrap_err();
        assert!(matches!(err, DomainError::Parse(_)));
    }

    #[test]
    fn result_copies_request_fields() {
        let request = request();
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).single().expect("valid ts");
        let generated = ImageRef::new("https://images.example.com/out.jpg").expect("valid");
        let result = GenerationResult::for_request(&request, GenerationId::new(), generated, now);

        assert_eq!(result.prompt, "neon city");
        assert_eq!(result.style, StyleId::Cyberpunk);
        assert_eq!(&result.source_image, request.source_image());
        assert_eq!(result.created_at, now);
    }

    #[test]
    fn result_uses_legacy_field_names() {
        let request = request();
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).single().expect("valid ts");
        let generated = ImageRef::new("https://images.example.com/out.jpg").expect("valid");
        let result = GenerationResult::for_request(&request, GenerationId::new(), generated, now);

        let value = serde_json::to_value(&result).expect("serialize");
        assert_eq!(value["imageUrl"], "https://images.example.com/out.jpg");
        assert_eq!(value["originalImageUrl"], "data:image/jpeg;base64,QUJD");
        assert_eq!(value["style"], "cyberpunk");
        assert_eq!(value["createdAt"], 1_700_000_000_123_i64);

        let back: GenerationResult = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, result);
    }
}
