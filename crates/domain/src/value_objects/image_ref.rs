//! Displayable image handle
//!
//! An `ImageRef` is whatever a front end can put in an `<img src>`: a
//! `data:` URL produced by the image encoder, or a remote http(s) URL
//! returned by the generation backend.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

const DATA_URL_PREFIX: &str = "data:";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap an image handle.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the handle is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::validation("Image reference cannot be empty"));
        }
        Ok(Self(value))
    }

    /// Build a base64 `data:` URL for encoded image bytes.
    pub fn data_url(mime_type: &str, base64_payload: &str) -> Self {
        Self(format!("data:{};base64,{}", mime_type, base64_payload))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_url(&self) -> bool {
        self.0.starts_with(DATA_URL_PREFIX)
    }

    /// MIME type of a `data:` URL (`None` for remote URLs).
    pub fn mime_type(&self) -> Option<&str> {
        let rest = self.0.strip_prefix(DATA_URL_PREFIX)?;
        let header = rest.split(',').next()?;
        let mime = header.split(';').next()?;
        (!mime.is_empty()).then_some(mime)
    }

    /// Base64 payload of a `data:` URL (`None` for remote URLs).
    pub fn base64_payload(&self) -> Option<&str> {
        let rest = self.0.strip_prefix(DATA_URL_PREFIX)?;
        let (header, payload) = rest.split_once(',')?;
        header.ends_with(";base64").then_some(payload)
    }

    /// Short form for log lines; data URLs can be megabytes long.
    pub fn summary(&self) -> String {
        match self.mime_type() {
            Some(mime) => format!("<{} data url, {} bytes>", mime, self.0.len()),
            None => self.0.clone(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ImageRef {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ImageRef> for String {
    fn from(image: ImageRef) -> String {
        image.0
    }
}
