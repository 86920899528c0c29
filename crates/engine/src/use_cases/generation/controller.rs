//! Generation request lifecycle.
//!
//! One logical request at a time is driven through attempts against the
//! [`GenerationService`], retried with backoff while the model reports it is
//! overloaded, and finished by success, terminal failure or abort.
//!
//! Every state transition is committed under the `active` lock after
//! re-checking the run's cancellation token. `abort()` cancels that token
//! under the same lock, so once it returns no outcome of the aborted run can
//! reach the state or the history.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use aistudio_domain::{GenerationEvent, GenerationRequest, GenerationResult, GenerationState};

use super::retry::RetryPolicy;
use crate::infrastructure::ports::{GenerationError, GenerationService};
use crate::use_cases::history::HistoryLedger;

/// Buffered transitions per `transitions()` receiver before it lags.
const TRANSITION_BUFFER: usize = 32;

/// Message recorded when the generation service panics mid-attempt.
const SERVICE_PANICKED: &str = "Generation service panicked";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationControllerError {
    #[error("generation already in progress")]
    AlreadyRunning,
}

/// How a request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Succeeded(GenerationResult),
    Failed { message: String, retry_count: u32 },
    Aborted { retry_count: u32 },
}

/// Handle to a started request.
#[derive(Debug)]
pub struct GenerationHandle {
    task: JoinHandle<GenerationOutcome>,
}

impl GenerationHandle {
    /// Wait for the request to finish.
    pub async fn outcome(self) -> GenerationOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Generation task ended unexpectedly");
                let message = if e.is_panic() {
                    SERVICE_PANICKED.to_string()
                } else {
                    e.to_string()
                };
                GenerationOutcome::Failed {
                    message,
                    retry_count: 0,
                }
            }
        }
    }
}

#[derive(Clone)]
pub struct GenerationController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    service: Arc<dyn GenerationService>,
    history: Arc<HistoryLedger>,
    policy: RetryPolicy,
    state_tx: watch::Sender<GenerationState>,
    transitions_tx: broadcast::Sender<GenerationState>,
    /// Token of the running request; `None` while idle.
    active: Mutex<Option<CancellationToken>>,
}

impl GenerationController {
    pub fn new(
        service: Arc<dyn GenerationService>,
        history: Arc<HistoryLedger>,
        policy: RetryPolicy,
    ) -> Self {
        let (state_tx, _) = watch::channel(GenerationState::idle());
        let (transitions_tx, _) = broadcast::channel(TRANSITION_BUFFER);
        Self {
            inner: Arc::new(ControllerInner {
                service,
                history,
                policy,
                state_tx,
                transitions_tx,
                active: Mutex::new(None),
            }),
        }
    }

    /// Start driving `request` on a new tokio task.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// `AlreadyRunning` while another request is in flight; the running
    /// request is left untouched.
    pub fn start(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationHandle, GenerationControllerError> {
        let token = {
            let mut active = self.inner.lock_active();
            if active.is_some() {
                tracing::warn!("Rejected generation start, another request is running");
                return Err(GenerationControllerError::AlreadyRunning);
            }
            let token = CancellationToken::new();
            *active = Some(token.clone());
            self.inner.transition(GenerationEvent::Started);
            token
        };

        tracing::info!(
            style = %request.style(),
            prompt_chars = request.prompt().as_str().chars().count(),
            source_image = %request.source_image().summary(),
            max_retries = self.inner.policy.max_retries(),
            "Generation started"
        );

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { inner.run(request, token).await });
        Ok(GenerationHandle { task })
    }

    /// Cancel the running request, if any. Returns whether one was running.
    ///
    /// The state becomes aborted immediately; the in-flight attempt is
    /// dropped and its eventual outcome ignored.
    pub fn abort(&self) -> bool {
        let mut active = self.inner.lock_active();
        let Some(token) = active.take() else {
            tracing::debug!("Abort requested while idle");
            return false;
        };
        token.cancel();
        self.inner.transition(GenerationEvent::Aborted);

        tracing::info!(
            retry_count = self.inner.state_tx.borrow().retry_count,
            "Generation aborted"
        );
        true
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> GenerationState {
        self.inner.state_tx.borrow().clone()
    }

    /// Receiver of the latest state. Intermediate states may be skipped by
    /// a slow reader; use [`Self::transitions`] to see each one.
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.inner.state_tx.subscribe()
    }

    /// Stream of every state transition from now on, in order.
    ///
    /// A receiver that falls more than a few dozen transitions behind gets
    /// `RecvError::Lagged`.
    pub fn transitions(&self) -> broadcast::Receiver<GenerationState> {
        self.inner.transitions_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock_active().is_some()
    }

    pub fn policy(&self) -> RetryPolicy {
        self.inner.policy
    }
}

impl ControllerInner {
    fn lock_active(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, event: GenerationEvent) {
        self.state_tx.send_if_modified(|state| {
            let next = state.apply(event);
            if next == *state {
                return false;
            }
            // No receivers is fine
            let _ = self.transitions_tx.send(next.clone());
            *state = next;
            true
        });
    }

    /// Apply `event` for the run owning `token`, running `effect` first.
    ///
    /// Returns `false` without touching anything when the run was aborted.
    fn commit(
        &self,
        token: &CancellationToken,
        event: GenerationEvent,
        terminal: bool,
        effect: impl FnOnce(),
    ) -> bool {
        let mut active = self.lock_active();
        if token.is_cancelled() {
            tracing::debug!(?event, "Discarding outcome of aborted generation");
            return false;
        }
        effect();
        self.transition(event);
        if terminal {
            *active = None;
        }
        true
    }

    async fn run(&self, request: GenerationRequest, token: CancellationToken) -> GenerationOutcome {
        let max_retries = self.policy.max_retries();
        let mut retry_count = 0;
        let _panic_guard = PanicGuard {
            inner: self,
            token: &token,
        };

        loop {
            let attempt = tokio::select! {
                biased;
                _ = token.cancelled() => return GenerationOutcome::Aborted { retry_count },
                attempt = self.service.generate(&request, retry_count) => attempt,
            };

            match attempt {
                Ok(result) => return self.finish_success(&token, result, retry_count),
                Err(e) if e.is_retryable() && retry_count < max_retries => {
                    let next = retry_count + 1;
                    let scheduled = GenerationEvent::RetryScheduled {
                        retry_count: next,
                        max_retries,
                    };
                    if !self.commit(&token, scheduled, false, || {}) {
                        return GenerationOutcome::Aborted { retry_count };
                    }
                    retry_count = next;

                    let delay = self.policy.delay_before(retry_count);
                    tracing::warn!(
                        retry_count,
                        max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "Generation attempt failed, retrying..."
                    );

                    tokio::select! {
                        biased;
                        _ = token.cancelled() => return GenerationOutcome::Aborted { retry_count },
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(e) => return self.finish_failure(&token, e, retry_count),
            }
        }
    }

    fn finish_success(
        &self,
        token: &CancellationToken,
        result: GenerationResult,
        retry_count: u32,
    ) -> GenerationOutcome {
        let committed = self.commit(token, GenerationEvent::Succeeded, true, || {
            self.history.add(result.clone());
        });
        if !committed {
            return GenerationOutcome::Aborted { retry_count };
        }

        tracing::info!(
            generation_id = %result.id,
            attempts = retry_count + 1,
            "Generation succeeded"
        );
        GenerationOutcome::Succeeded(result)
    }

    fn finish_failure(
        &self,
        token: &CancellationToken,
        error: GenerationError,
        retry_count: u32,
    ) -> GenerationOutcome {
        let message = error.to_string();
        let failed = GenerationEvent::Failed {
            message: message.clone(),
        };
        if !self.commit(token, failed, true, || {}) {
            return GenerationOutcome::Aborted { retry_count };
        }

        tracing::error!(
            error = %error,
            retry_count,
            retryable = error.is_retryable(),
            "Generation failed"
        );
        GenerationOutcome::Failed {
            message,
            retry_count,
        }
    }
}

/// Ends the run as failed if the attempt loop unwinds, so a panicking
/// service cannot leave the controller stuck in `Running`.
struct PanicGuard<'a> {
    inner: &'a ControllerInner,
    token: &'a CancellationToken,
}

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            return;
        }
        let failed = GenerationEvent::Failed {
            message: SERVICE_PANICKED.to_string(),
        };
        if self.inner.commit(self.token, failed, true, || {}) {
            tracing::error!("Generation service panicked, request failed");
        }
    }
}
