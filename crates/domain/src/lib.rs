//! AI Studio domain types.
//!
//! Pure values with no I/O: identifiers, validated value objects, the
//! request/result entities and the generation lifecycle state.

pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{
    GenerationEvent, GenerationPhase, GenerationRequest, GenerationResult, GenerationState,
};
pub use error::DomainError;
pub use ids::GenerationId;
pub use value_objects::{ImageRef, PromptText, StyleId, MAX_PROMPT_LENGTH};
