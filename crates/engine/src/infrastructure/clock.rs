//! Clock and random implementations.

use crate::infrastructure::ports::{ClockPort, RandomPort};
use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

/// System clock - uses real time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System random - thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRandom;

impl RandomPort for SystemRandom {
    fn random_f64(&self) -> f64 {
        rand::thread_rng().gen()
    }

    fn gen_range(&self, min: usize, max: usize) -> usize {
        if min >= max {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_f64_stays_in_unit_interval() {
        let random = SystemRandom;
        for _ in 0..100 {
            let value = random.random_f64();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn gen_range_is_inclusive_and_tolerates_empty_span() {
        let random = SystemRandom;
        for _ in 0..100 {
            assert!(random.gen_range(2, 4) <= 4);
            assert!(random.gen_range(2, 4) >= 2);
        }
        assert_eq!(random.gen_range(3, 3), 3);
        assert_eq!(random.gen_range(5, 1), 5);
    }
}
