//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Image generation (mock today, a real backend later)
//! - Key-value persistence (file on desktop, memory in tests)
//! - Upload encoding (decode/downscale/re-encode)
//! - Clock/Random (for testing)

mod error;
mod external;
mod storage;
mod testing;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{GenerationService, ImageEncoderPort};

// =============================================================================
// Storage Ports
// =============================================================================
pub use storage::StoragePort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use external::MockImageEncoderPort;
#[cfg(test)]
pub use storage::MockStoragePort;
#[cfg(test)]
pub use testing::{MockClockPort, MockRandomPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::{GenerationError, ImageEncodeError, StorageError};
