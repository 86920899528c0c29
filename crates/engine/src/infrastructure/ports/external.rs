//! External service port traits (image generation, upload encoding).

use aistudio_domain::{GenerationRequest, GenerationResult, ImageRef};
use async_trait::async_trait;
use std::path::Path;

use super::error::{GenerationError, ImageEncodeError};

/// Backend that turns a request into a generated image.
///
/// `attempt` is the zero-based attempt index within one logical request,
/// so a backend can vary its behavior (latency, failure classification)
/// across retries.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
        attempt: u32,
    ) -> Result<GenerationResult, GenerationError>;
}

/// Converts an uploaded file's bytes into a displayable image handle.
#[cfg_attr(test, mockall::automock)]
pub trait ImageEncoderPort: Send + Sync {
    fn encode(&self, bytes: &[u8]) -> Result<ImageRef, ImageEncodeError>;

    fn encode_file(&self, path: &Path) -> Result<ImageRef, ImageEncodeError> {
        let bytes = std::fs::read(path).map_err(|e| ImageEncodeError::Io(e.to_string()))?;
        self.encode(&bytes)
    }
}
