//! Generation use cases: the request lifecycle and its retry policy.

mod controller;
mod retry;

pub use controller::{
    GenerationController, GenerationControllerError, GenerationHandle, GenerationOutcome,
};
pub use retry::{BackoffPolicy, RetryPolicy, MAX_RETRIES};
