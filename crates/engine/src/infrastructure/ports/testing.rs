//! Testability ports for injecting time and randomness.

use chrono::{DateTime, Utc};
use uuid::Uuid;

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RandomPort: Send + Sync {
    /// Uniform value in `[0.0, 1.0)`.
    fn random_f64(&self) -> f64;
    /// Uniform value in `min..=max`.
    fn gen_range(&self, min: usize, max: usize) -> usize;
    fn gen_uuid(&self) -> Uuid;
}
