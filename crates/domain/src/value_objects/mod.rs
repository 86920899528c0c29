//! Value objects - validated by construction.

mod image_ref;
mod prompt;
mod style;

pub use image_ref::ImageRef;
pub use prompt::{PromptText, MAX_PROMPT_LENGTH};
pub use style::StyleId;
