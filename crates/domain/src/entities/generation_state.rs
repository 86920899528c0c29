//! Generation lifecycle state
//!
//! The observable state of a generation request is a single value that
//! only changes through [`GenerationState::apply`]. Every event except
//! `Started` is ignored once the state is idle, which is what keeps a late
//! attempt outcome from overwriting a terminal (or aborted) state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    #[default]
    Idle,
    Running,
}

/// Transitions driven by the generation controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    /// A new request was accepted
    Started,
    /// A transient failure will be retried
    RetryScheduled { retry_count: u32, max_retries: u32 },
    /// An attempt produced a result
    Succeeded,
    /// Terminal failure, no further attempts
    Failed { message: String },
    /// User cancelled the request
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationState {
    pub phase: GenerationPhase,
    pub is_aborted: bool,
    pub retry_count: u32,
    pub error: Option<String>,
}

impl GenerationState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.phase == GenerationPhase::Running
    }

    /// Informational message shown while a transient failure is retried.
    pub fn retry_message(retry_count: u32, max_retries: u32) -> String {
        format!(
            "Model overloaded, retrying... ({}/{})",
            retry_count, max_retries
        )
    }

    /// Pure transition function.
    pub fn apply(&self, event: GenerationEvent) -> Self {
        match event {
            GenerationEvent::Started => Self {
                phase: GenerationPhase::Running,
                is_aborted: false,
                retry_count: 0,
                error: None,
            },
            _ if !self.is_running() => self.clone(),
            GenerationEvent::RetryScheduled {
                retry_count,
                max_retries,
            } => Self {
                phase: GenerationPhase::Running,
                is_aborted: false,
                retry_count,
                error: Some(Self::retry_message(retry_count, max_retries)),
            },
            GenerationEvent::Succeeded => Self {
                phase: GenerationPhase::Idle,
                is_aborted: false,
                retry_count: 0,
                error: None,
            },
            GenerationEvent::Failed { message } => Self {
                phase: GenerationPhase::Idle,
                is_aborted: false,
                retry_count: self.retry_count,
                error: Some(message),
            },
            GenerationEvent::Aborted => Self {
                phase: GenerationPhase::Idle,
                is_aborted: true,
                retry_count: self.retry_count,
                error: None,
            },
        }
    }
}
