//! Use cases - User story orchestration.
//!
//! - `generation` - request lifecycle: attempts, retry with backoff, abort
//! - `history` - bounded ledger of successful generations

pub mod generation;
pub mod history;

pub use generation::{GenerationController, GenerationOutcome};
pub use history::HistoryLedger;
