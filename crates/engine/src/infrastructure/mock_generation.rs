//! Simulated image model.
//!
//! Stands in for a real inference backend: waits a latency that grows with
//! the attempt index, fails at random, and otherwise answers with a photo
//! from a fixed stock pool. Swappable behind [`GenerationService`].

use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use aistudio_domain::{GenerationId, GenerationRequest, GenerationResult, ImageRef};

use crate::infrastructure::ports::{ClockPort, GenerationError, GenerationService, RandomPort};

/// Stock photos returned as "generated" images.
pub const MOCK_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?w=400&h=400&fit=crop",
    "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=400&h=400&fit=crop",
    "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=400&h=400&fit=crop",
    "https://images.unsplash.com/photo-1541701494587-cb58502866ab?w=400&h=400&fit=crop",
    "https://images.unsplash.com/photo-1742201408321-64ddd59d1ca3?q=80&w=465&auto=format&fit=crop&ixlib=rb-4.1.0&ixid=M3wxMjA3fDB8MHxwaG90by1wYWdlfHx8fGVufDB8fHx8fA%3D%3D",
    "https://images.unsplash.com/photo-1756244834590-b1a32e94df40?w=500&auto=format&fit=crop&q=60&ixlib=rb-4.1.0&ixid=M3wxMjA3fDB8MHxmZWF0dXJlZC1waG90b3MtZmVlZHw3OXx8fGVufDB8fHx8fA%3D%3D",
    "https://images.unsplash.com/photo-1756877468830-9fbf44ee34a8?w=500&auto=format&fit=crop&q=60&ixlib=rb-4.1.0&ixid=M3wxMjA3fDB8MHxmZWF0dXJlZC1waG90b3MtZmVlZHw5MHx8fGVufDB8fHx8fA%3D%3D",
    "https://images.unsplash.com/photo-1605092262243-28c74cfc74c7?w=500&auto=format&fit=crop&q=60&ixlib=rb-4.1.0&ixid=M3wxMjA3fDB8MHxzZWFyY2h8MTd8fHdhcnxlbnwwfHwwfHx8MA%3D%3D",
    "https://plus.unsplash.com/premium_photo-1661962542692-4fe7a4ad6b54?w=500&auto=format&fit=crop&q=60&ixlib=rb-4.1.0&ixid=M3wxMjA3fDB8MHxzZWFyY2h8Nnx8aW5kaWF8ZW58MHx8MHx8fDA%3D",
    "https://images.unsplash.com/photo-1520106212299-d99c443e4568?w=500&auto=format&fit=crop&q=60&ixlib=rb-4.1.0&ixid=M3wxMjA3fDB8MHxzZWFyY2h8NXx8cnVzc2lhfGVufDB8fDB8fHww",
    "https://plus.unsplash.com/premium_photo-1661964177687-57387c2cbd14?w=500&auto=format&fit=crop&q=60&ixlib=rb-4.1.0&ixid=M3wxMjA3fDB8MHxzZWFyY2h8MXx8amFwYW58ZW58MHx8MHx8fDA%3D",
];

pub const DEFAULT_FAILURE_RATE: f64 = 0.2;

/// Attempts below this index fail as overloaded, later ones as terminal.
const OVERLOADED_ATTEMPTS: u32 = 3;

/// How simulated latency grows with the attempt index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatencyProfile {
    /// `min(1000 * 2^attempt, 8000)` ms
    #[default]
    Exponential,
    /// `min(1000 + attempt * 500, 3000)` ms
    Linear,
}

impl LatencyProfile {
    pub fn latency(&self, attempt: u32) -> Duration {
        let millis = match self {
            Self::Exponential => 2u64
                .checked_pow(attempt)
                .map_or(u64::MAX, |factor| factor.saturating_mul(1000))
                .min(8000),
            Self::Linear => 1000u64
                .saturating_add(u64::from(attempt).saturating_mul(500))
                .min(3000),
        };
        Duration::from_millis(millis)
    }
}

impl FromStr for LatencyProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exponential" => Ok(Self::Exponential),
            "linear" => Ok(Self::Linear),
            other => Err(format!("unknown latency profile: {other}")),
        }
    }
}

pub struct MockGenerationService {
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
    failure_rate: f64,
    latency: LatencyProfile,
}

impl MockGenerationService {
    pub fn new(clock: Arc<dyn ClockPort>, random: Arc<dyn RandomPort>) -> Self {
        Self {
            clock,
            random,
            failure_rate: DEFAULT_FAILURE_RATE,
            latency: LatencyProfile::default(),
        }
    }

    /// Probability in `[0, 1]` that an attempt fails. Out-of-range values are clamped.
    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = if failure_rate.is_nan() {
            DEFAULT_FAILURE_RATE
        } else {
            failure_rate.clamp(0.0, 1.0)
        };
        self
    }

    pub fn with_latency(mut self, latency: LatencyProfile) -> Self {
        self.latency = latency;
        self
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    fn pick_image(&self) -> Result<ImageRef, GenerationError> {
        let last = MOCK_IMAGES.len().saturating_sub(1);
        let index = self.random.gen_range(0, last).min(last);
        let url = MOCK_IMAGES
            .get(index)
            .ok_or_else(|| GenerationError::other("Stock image pool is empty"))?;
        ImageRef::new(*url).map_err(GenerationError::other)
    }
}

#[async_trait]
impl GenerationService for MockGenerationService {
    async fn generate(
        &self,
        request: &GenerationRequest,
        attempt: u32,
    ) -> Result<GenerationResult, GenerationError> {
        let delay = self.latency.latency(attempt);
        tracing::debug!(
            attempt,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            style = %request.style(),
            "Simulating model call"
        );
        tokio::time::sleep(delay).await;

        if self.random.random_f64() < self.failure_rate {
            return Err(if attempt < OVERLOADED_ATTEMPTS {
                GenerationError::overloaded("Model overloaded")
            } else {
                GenerationError::other("Maximum retries exceeded")
            });
        }

        let image = self.pick_image()?;
        let id = GenerationId::from_uuid(self.random.gen_uuid());
        Ok(GenerationResult::for_request(
            request,
            id,
            image,
            self.clock.now(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{MockClockPort, MockRandomPort};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn request() -> GenerationRequest {
        GenerationRequest::from_input(Some("data:image/jpeg;base64,QUJD"), "neon city", "cyberpunk")
            .expect("valid request")
    }

    fn always_failing_random() -> MockRandomPort {
        let mut random = MockRandomPort::new();
        random.expect_random_f64().return_const(0.0);
        random
    }

    #[test]
    fn exponential_latency_doubles_and_caps() {
        let profile = LatencyProfile::Exponential;
        let millis: Vec<u128> = (0..6).map(|a| profile.latency(a).as_millis()).collect();
        assert_eq!(millis, vec![1000, 2000, 4000, 8000, 8000, 8000]);
        assert_eq!(profile.latency(u32::MAX), Duration::from_millis(8000));
    }

    #[test]
    fn linear_latency_grows_and_caps() {
        let profile = LatencyProfile::Linear;
        let millis: Vec<u128> = (0..6).map(|a| profile.latency(a).as_millis()).collect();
        assert_eq!(millis, vec![1000, 1500, 2000, 2500, 3000, 3000]);
        assert_eq!(profile.latency(u32::MAX), Duration::from_millis(3000));
    }

    #[test]
    fn latency_profile_parses_case_insensitively() {
        assert_eq!("Linear".parse::<LatencyProfile>(), Ok(LatencyProfile::Linear));
        assert_eq!(
            " exponential ".parse::<LatencyProfile>(),
            Ok(LatencyProfile::Exponential)
        );
        assert!("quadratic".parse::<LatencyProfile>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn early_failures_are_overloaded() {
        let service = MockGenerationService::new(
            Arc::new(MockClockPort::new()),
            Arc::new(always_failing_random()),
        );

        for attempt in 0..3 {
            let err = service.generate(&request(), attempt).await.unwrap_err();
            assert_eq!(err, GenerationError::overloaded("Model overloaded"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failure_after_third_retry_is_terminal() {
        let service = MockGenerationService::new(
            Arc::new(MockClockPort::new()),
            Arc::new(always_failing_random()),
        );

        let err = service.generate(&request(), 3).await.unwrap_err();
        assert_eq!(err, GenerationError::other("Maximum retries exceeded"));
        assert!(!err.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn success_returns_stock_image_for_request() {
        let now = Utc
            .timestamp_millis_opt(1_700_000_000_000)
            .single()
            .expect("valid ts");
        let uuid = Uuid::new_v4();

        let mut random = MockRandomPort::new();
        random.expect_random_f64().return_const(0.9);
        random
            .expect_gen_range()
            .withf(|min, max| *min == 0 && *max == MOCK_IMAGES.len() - 1)
            .return_const(2usize);
        random.expect_gen_uuid().return_const(uuid);

        let service = MockGenerationService::new(Arc::new(FixedClock(now)), Arc::new(random));
        let result = service.generate(&request(), 0).await.expect("success");

        assert_eq!(result.id, GenerationId::from_uuid(uuid));
        assert_eq!(result.generated_image.as_str(), MOCK_IMAGES[2]);
        assert_eq!(result.source_image.as_str(), "data:image/jpeg;base64,QUJD");
        assert_eq!(result.prompt, "neon city");
        assert_eq!(result.created_at, now);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_the_profile_latency() {
        let service = MockGenerationService::new(
            Arc::new(MockClockPort::new()),
            Arc::new(always_failing_random()),
        )
        .with_latency(LatencyProfile::Linear);

        let started = tokio::time::Instant::now();
        let _ = service.generate(&request(), 2).await;
        assert!(started.elapsed() >= Duration::from_millis(2000));
    }

    #[test]
    fn failure_rate_is_clamped() {
        let service = MockGenerationService::new(
            Arc::new(MockClockPort::new()),
            Arc::new(MockRandomPort::new()),
        );
        assert_eq!(service.failure_rate(), DEFAULT_FAILURE_RATE);

        let service = service.with_failure_rate(1.5);
        assert_eq!(service.failure_rate(), 1.0);
        let service = service.with_failure_rate(-0.1);
        assert_eq!(service.failure_rate(), 0.0);
    }
}
