//! Readiness Gate use case
//!
//! Bounded polling of an external dependency before anything that needs it
//! is started. Exhausting the budget is fatal to startup.

use crate::ports::readiness_probe::ReadinessProbe;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while waiting for a dependency
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("{dependency} did not become ready after {attempts} attempts{}", last_error_suffix(.last_error))]
    DependencyUnavailable {
        dependency: String,
        attempts: u32,
        last_error: Option<String>,
    },
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    last_error
        .as_ref()
        .map(|e| format!(" (last error: {})", e))
        .unwrap_or_default()
}

/// Polls a [`ReadinessProbe`] up to `max_attempts` times, sleeping
/// `interval` between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessGate {
    max_attempts: u32,
    interval: Duration,
}

impl ReadinessGate {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

    /// A zero attempt budget is treated as one attempt.
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the probe reports ready.
    ///
    /// Returns the number of attempts it took.
    pub async fn wait_until_ready<P: ReadinessProbe + ?Sized>(
        &self,
        probe: &P,
    ) -> Result<u32, ReadinessError> {
        let dependency = probe.dependency();
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match probe.probe().await {
                Ok(true) => {
                    info!(%dependency, attempt, "Dependency is ready");
                    return Ok(attempt);
                }
                Ok(false) => {
                    debug!(%dependency, attempt, "Dependency not ready yet");
                }
                Err(e) => {
                    debug!(%dependency, attempt, error = %e, "Readiness probe failed");
                    last_error = Some(e.to_string());
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        Err(ReadinessError::DependencyUnavailable {
            dependency,
            attempts: self.max_attempts,
            last_error,
        })
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::readiness_probe::ProbeError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails `failures` times (alternating `false` and errors), then succeeds
    struct FlakyProbe {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyProbe {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReadinessProbe for FlakyProbe {
        fn dependency(&self) -> String {
            "model host".to_string()
        }

        async fn probe(&self) -> Result<bool, ProbeError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call > self.failures {
                Ok(true)
            } else if call % 2 == 0 {
                Ok(false)
            } else {
                Err(ProbeError("connection refused".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_ready_after_failures() {
        let probe = FlakyProbe::new(5);
        let gate = ReadinessGate::new(10, Duration::from_millis(1));

        let attempts = gate.wait_until_ready(&probe).await.unwrap();
        assert_eq!(attempts, 6);
        assert_eq!(probe.calls(), 6);
    }

    #[tokio::test]
    async fn test_exhausted_budget() {
        let probe = FlakyProbe::new(5);
        let gate = ReadinessGate::new(3, Duration::from_millis(1));

        let err = gate.wait_until_ready(&probe).await.unwrap_err();
        let ReadinessError::DependencyUnavailable {
            dependency,
            attempts,
            last_error,
        } = err;
        assert_eq!(dependency, "model host");
        assert_eq!(attempts, 3);
        assert_eq!(last_error.as_deref(), Some("connection refused"));
        assert_eq!(probe.calls(), 3);
    }

    #[tokio::test]
    async fn test_immediately_ready_does_not_sleep() {
        let probe = FlakyProbe::new(0);
        let gate = ReadinessGate::new(3, Duration::from_secs(3600));

        let attempts = tokio::time::timeout(Duration::from_secs(1), gate.wait_until_ready(&probe))
            .await
            .expect("gate slept before the first attempt")
            .unwrap();
        assert_eq!(attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_between_attempts_only() {
        let probe = FlakyProbe::new(10);
        let gate = ReadinessGate::new(4, Duration::from_secs(1));

        let start = tokio::time::Instant::now();
        assert!(gate.wait_until_ready(&probe).await.is_err());
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(ReadinessGate::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[test]
    fn test_error_message() {
        let err = ReadinessError::DependencyUnavailable {
            dependency: "ollama at http://localhost:11434".into(),
            attempts: 30,
            last_error: None,
        };
        assert_eq!(
            err.to_string(),
            "ollama at http://localhost:11434 did not become ready after 30 attempts"
        );
    }
}
