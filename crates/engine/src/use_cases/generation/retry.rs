//! Retry policy for generation attempts.

use std::str::FromStr;
use std::time::Duration;

/// Retries after the initial attempt. Fixed: the request lifecycle and the
/// simulated model both assume it.
pub const MAX_RETRIES: u32 = 3;

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// `min(base * 2^(k-1), cap)` before retry `k`
    Exponential { base: Duration, cap: Duration },
    /// `min(base + k * increment, cap)` before retry `k`
    Linear {
        base: Duration,
        increment: Duration,
        cap: Duration,
    },
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::exponential()
    }
}

impl BackoffPolicy {
    pub fn exponential() -> Self {
        Self::Exponential {
            base: Duration::from_millis(1000),
            cap: Duration::from_millis(8000),
        }
    }

    pub fn linear() -> Self {
        Self::Linear {
            base: Duration::from_millis(1000),
            increment: Duration::from_millis(500),
            cap: Duration::from_millis(3000),
        }
    }

    /// Delay to wait before retry number `retry` (1-based). Overflow saturates to the cap.
    pub fn delay_before(&self, retry: u32) -> Duration {
        match *self {
            Self::Exponential { base, cap } => 2u32
                .checked_pow(retry.saturating_sub(1))
                .and_then(|factor| base.checked_mul(factor))
                .map_or(cap, |delay| delay.min(cap)),
            Self::Linear {
                base,
                increment,
                cap,
            } => increment
                .checked_mul(retry)
                .and_then(|step| base.checked_add(step))
                .map_or(cap, |delay| delay.min(cap)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Exponential { .. } => "exponential",
            Self::Linear { .. } => "linear",
        }
    }
}

impl FromStr for BackoffPolicy {
    type Err = String;

    /// Parses the schedule name into its default timings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exponential" => Ok(Self::exponential()),
            "linear" => Ok(Self::linear()),
            other => Err(format!("unknown backoff policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: BackoffPolicy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(BackoffPolicy::default())
    }
}

impl RetryPolicy {
    pub fn new(backoff: BackoffPolicy) -> Self {
        Self {
            max_retries: MAX_RETRIES,
            backoff,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff(&self) -> BackoffPolicy {
        self.backoff
    }

    pub fn delay_before(&self, retry: u32) -> Duration {
        self.backoff.delay_before(retry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(policy: BackoffPolicy, retries: std::ops::RangeInclusive<u32>) -> Vec<u128> {
        retries.map(|k| policy.delay_before(k).as_millis()).collect()
    }

    #[test]
    fn exponential_schedule() {
        assert_eq!(
            millis(BackoffPolicy::exponential(), 1..=5),
            vec![1000, 2000, 4000, 8000, 8000]
        );
    }

    #[test]
    fn linear_schedule() {
        assert_eq!(
            millis(BackoffPolicy::linear(), 1..=5),
            vec![1500, 2000, 2500, 3000, 3000]
        );
    }

    #[test]
    fn huge_retry_numbers_saturate_to_cap() {
        assert_eq!(
            BackoffPolicy::exponential().delay_before(u32::MAX),
            Duration::from_millis(8000)
        );
        assert_eq!(
            BackoffPolicy::linear().delay_before(u32::MAX),
            Duration::from_millis(3000)
        );
    }

    #[test]
    fn default_policy_allows_three_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.backoff(), BackoffPolicy::exponential());
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!("LINEAR".parse::<BackoffPolicy>(), Ok(BackoffPolicy::linear()));
        assert_eq!("exponential".parse::<BackoffPolicy>(), Ok(BackoffPolicy::exponential()));
        assert!("fibonacci".parse::<BackoffPolicy>().is_err());
    }
}
