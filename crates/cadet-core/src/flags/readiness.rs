//! Bounded wait for a flag provider to become ready.
//!
//! The provider is polled at a fixed interval for at most `max_attempts`
//! polls. The wait never fails: once the ceiling is reached the caller
//! proceeds and resolution falls back to defaults if the provider is still
//! not serving.

use std::time::Duration;

use cadet_types::config::FlagSettings;

use super::provider::FlagProvider;

/// How often and how long to poll for readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl ReadinessPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Upper bound on the time spent waiting. Saturates at `Duration::MAX`.
    pub fn ceiling(&self) -> Duration {
        self.interval
            .checked_mul(self.max_attempts)
            .unwrap_or(Duration::MAX)
    }
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self::new(10, Duration::from_millis(500))
    }
}

impl From<&FlagSettings> for ReadinessPolicy {
    fn from(settings: &FlagSettings) -> Self {
        Self::new(settings.readiness_attempts, settings.readiness_interval())
    }
}

/// Result of a readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The provider reported ready on poll number `attempts`.
    Ready { attempts: u32 },
    /// The ceiling was reached without the provider becoming ready.
    TimedOut { attempts: u32 },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready { .. })
    }
}

/// Poll `provider` until it is ready or the policy's attempts are spent.
///
/// Sleeps between polls (never busy-spins). With `max_attempts == 0` the
/// provider is checked once and no time is spent waiting.
pub async fn wait_for_ready<P: FlagProvider>(provider: &P, policy: &ReadinessPolicy) -> Readiness {
    if policy.max_attempts == 0 {
        return if provider.is_ready() {
            Readiness::Ready { attempts: 0 }
        } else {
            Readiness::TimedOut { attempts: 0 }
        };
    }

    for attempt in 1..=policy.max_attempts {
        if provider.is_ready() {
            return Readiness::Ready { attempts: attempt };
        }
        tokio::time::sleep(policy.interval).await;
    }

    Readiness::TimedOut {
        attempts: policy.max_attempts,
    }
}
