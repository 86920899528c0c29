//! Domain entities.

mod generation;
mod generation_state;

pub use generation::{GenerationRequest, GenerationResult};
pub use generation_state::{GenerationEvent, GenerationPhase, GenerationState};
