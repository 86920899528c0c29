//! AI Studio engine library.
//!
//! ## Structure
//!
//! - `use_cases/` - generation lifecycle and history ledger
//! - `infrastructure/` - external dependency implementations (ports + adapters)
//! - `app` - application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::{App, AppError};
