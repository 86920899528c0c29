//! Environment-driven studio settings.
//!
//! | Variable                        | Default                          |
//! |---------------------------------|----------------------------------|
//! | `AISTUDIO_STORAGE_PATH`         | platform config dir              |
//! | `AISTUDIO_HISTORY_CAPACITY`     | 5                                |
//! | `AISTUDIO_BACKOFF`              | `exponential` (or `linear`)      |
//! | `AISTUDIO_BACKOFF_BASE_MS`      | 1000                             |
//! | `AISTUDIO_BACKOFF_INCREMENT_MS` | 500 (linear only)                |
//! | `AISTUDIO_BACKOFF_CAP_MS`       | 8000 exponential / 3000 linear   |
//! | `AISTUDIO_MOCK_FAILURE_RATE`    | 0.2                              |
//! | `AISTUDIO_MOCK_LATENCY`         | `exponential` (or `linear`)      |
//!
//! Invalid values are logged and replaced by the default.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::infrastructure::mock_generation::{LatencyProfile, DEFAULT_FAILURE_RATE};
use crate::use_cases::generation::{BackoffPolicy, RetryPolicy};
use crate::use_cases::history::DEFAULT_HISTORY_CAPACITY;

#[derive(Debug, Clone, PartialEq)]
pub struct StudioSettings {
    /// Storage file override; `None` uses the platform config directory.
    pub storage_path: Option<PathBuf>,
    pub history_capacity: usize,
    pub retry: RetryPolicy,
    pub mock_failure_rate: f64,
    pub mock_latency: LatencyProfile,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            storage_path: None,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            retry: RetryPolicy::default(),
            mock_failure_rate: DEFAULT_FAILURE_RATE,
            mock_latency: LatencyProfile::default(),
        }
    }
}

impl StudioSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup` (the environment in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let storage_path = lookup("AISTUDIO_STORAGE_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let history_capacity = parse_var::<usize>(&lookup, "AISTUDIO_HISTORY_CAPACITY")
            .filter(|capacity| {
                let valid = *capacity > 0;
                if !valid {
                    tracing::warn!("AISTUDIO_HISTORY_CAPACITY must be at least 1, using default");
                }
                valid
            })
            .unwrap_or(defaults.history_capacity);

        let mock_failure_rate = parse_var::<f64>(&lookup, "AISTUDIO_MOCK_FAILURE_RATE")
            .filter(|rate| {
                let valid = (0.0..=1.0).contains(rate);
                if !valid {
                    tracing::warn!(rate, "AISTUDIO_MOCK_FAILURE_RATE must be within 0..=1, using default");
                }
                valid
            })
            .unwrap_or(defaults.mock_failure_rate);

        let mock_latency = parse_var::<LatencyProfile>(&lookup, "AISTUDIO_MOCK_LATENCY")
            .unwrap_or(defaults.mock_latency);

        Self {
            storage_path,
            history_capacity,
            retry: RetryPolicy::new(backoff_from_lookup(&lookup)),
            mock_failure_rate,
            mock_latency,
        }
    }
}

fn backoff_from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> BackoffPolicy {
    let base_ms = parse_var::<u64>(lookup, "AISTUDIO_BACKOFF_BASE_MS");
    let cap_ms = parse_var::<u64>(lookup, "AISTUDIO_BACKOFF_CAP_MS");
    let millis = |override_ms: Option<u64>, default: Duration| {
        override_ms.map(Duration::from_millis).unwrap_or(default)
    };

    match parse_var::<BackoffPolicy>(lookup, "AISTUDIO_BACKOFF").unwrap_or_default() {
        BackoffPolicy::Exponential { base, cap } => BackoffPolicy::Exponential {
            base: millis(base_ms, base),
            cap: millis(cap_ms, cap),
        },
        BackoffPolicy::Linear {
            base,
            increment,
            cap,
        } => BackoffPolicy::Linear {
            base: millis(base_ms, base),
            increment: millis(
                parse_var::<u64>(lookup, "AISTUDIO_BACKOFF_INCREMENT_MS"),
                increment,
            ),
            cap: millis(cap_ms, cap),
        },
    }
}

/// Parse an optional variable, warning (and returning `None`) when it is malformed.
fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "Invalid setting, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> StudioSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StudioSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let settings = settings(&[]);
        assert_eq!(settings, StudioSettings::default());
        assert_eq!(settings.history_capacity, 5);
        assert_eq!(settings.retry.max_retries(), 3);
        assert_eq!(settings.retry.backoff(), BackoffPolicy::exponential());
        assert_eq!(settings.mock_latency, LatencyProfile::Exponential);
    }

    #[test]
    fn linear_backoff_with_overrides() {
        let settings = settings(&[
            ("AISTUDIO_BACKOFF", "linear"),
            ("AISTUDIO_BACKOFF_BASE_MS", "200"),
            ("AISTUDIO_BACKOFF_INCREMENT_MS", "100"),
        ]);
        assert_eq!(
            settings.retry.backoff(),
            BackoffPolicy::Linear {
                base: Duration::from_millis(200),
                increment: Duration::from_millis(100),
                cap: Duration::from_millis(3000),
            }
        );
    }

    #[test]
    fn exponential_cap_override() {
        let settings = settings(&[("AISTUDIO_BACKOFF_CAP_MS", "2500")]);
        assert_eq!(
            settings.retry.backoff(),
            BackoffPolicy::Exponential {
                base: Duration::from_millis(1000),
                cap: Duration::from_millis(2500),
            }
        );
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let settings = settings(&[
            ("AISTUDIO_HISTORY_CAPACITY", "0"),
            ("AISTUDIO_BACKOFF", "random"),
            ("AISTUDIO_BACKOFF_BASE_MS", "soon"),
            ("AISTUDIO_MOCK_FAILURE_RATE", "1.5"),
            ("AISTUDIO_MOCK_LATENCY", "instant"),
        ]);
        assert_eq!(settings, StudioSettings::default());
    }

    #[test]
    fn reads_storage_and_mock_overrides() {
        let settings = settings(&[
            ("AISTUDIO_STORAGE_PATH", " /tmp/studio.json "),
            ("AISTUDIO_HISTORY_CAPACITY", "8"),
            ("AISTUDIO_MOCK_FAILURE_RATE", "0"),
            ("AISTUDIO_MOCK_LATENCY", "linear"),
        ]);
        assert_eq!(settings.storage_path, Some(PathBuf::from("/tmp/studio.json")));
        assert_eq!(settings.history_capacity, 8);
        assert_eq!(settings.mock_failure_rate, 0.0);
        assert_eq!(settings.mock_latency, LatencyProfile::Linear);
    }

    #[test]
    fn blank_storage_path_is_ignored() {
        let settings = settings(&[("AISTUDIO_STORAGE_PATH", "  ")]);
        assert_eq!(settings.storage_path, None);
    }
}
