//! Application state and composition.

use std::path::Path;
use std::sync::Arc;

use aistudio_domain::{DomainError, GenerationRequest, PromptText, StyleId};

use crate::infrastructure::{
    clock::{SystemClock, SystemRandom},
    image_encoder::JpegDataUrlEncoder,
    mock_generation::MockGenerationService,
    ports::{GenerationService, ImageEncodeError, ImageEncoderPort, StoragePort},
    settings::StudioSettings,
    storage::FileStorage,
};
use crate::use_cases::generation::GenerationController;
use crate::use_cases::history::{HistoryLedger, HISTORY_STORAGE_KEY};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error(transparent)]
    Upload(#[from] ImageEncodeError),
}

/// Main application state.
///
/// Owns the history ledger and the generation controller that feeds it.
pub struct App {
    pub settings: StudioSettings,
    pub history: Arc<HistoryLedger>,
    pub controller: GenerationController,
    encoder: Arc<dyn ImageEncoderPort>,
}

impl App {
    pub fn new(
        settings: StudioSettings,
        storage: Arc<dyn StoragePort>,
        service: Arc<dyn GenerationService>,
        encoder: Arc<dyn ImageEncoderPort>,
    ) -> Self {
        let history = Arc::new(HistoryLedger::load(
            storage,
            HISTORY_STORAGE_KEY,
            settings.history_capacity,
        ));
        let controller = GenerationController::new(service, history.clone(), settings.retry);

        Self {
            settings,
            history,
            controller,
            encoder,
        }
    }

    /// Wire the production adapters: file storage, the simulated model and
    /// the JPEG upload encoder.
    pub fn from_settings(settings: StudioSettings) -> Self {
        let storage = match &settings.storage_path {
            Some(path) => FileStorage::open(path),
            None => FileStorage::open_default(),
        };
        tracing::info!(path = %storage.path().display(), "Using file storage");

        let service = MockGenerationService::new(Arc::new(SystemClock), Arc::new(SystemRandom))
            .with_failure_rate(settings.mock_failure_rate)
            .with_latency(settings.mock_latency);
        tracing::info!(
            failure_rate = service.failure_rate(),
            latency = ?settings.mock_latency,
            backoff = settings.retry.backoff().name(),
            max_retries = settings.retry.max_retries(),
            "Generation service configured"
        );

        Self::new(
            settings,
            Arc::new(storage),
            Arc::new(service),
            Arc::new(JpegDataUrlEncoder::new()),
        )
    }

    /// Validate form input and encode the uploaded image into a request.
    ///
    /// Prompt and style are checked first so a bad form never pays for
    /// decoding the upload.
    pub fn prepare_request(
        &self,
        image_path: &Path,
        prompt: &str,
        style: &str,
    ) -> Result<GenerationRequest, AppError> {
        let prompt = PromptText::new(prompt)?;
        let style: StyleId = style.parse()?;
        let image = self.encoder.encode_file(image_path)?;
        tracing::debug!(image = %image.summary(), "Upload encoded");

        Ok(GenerationRequest::new(image, prompt, style))
    }
}
