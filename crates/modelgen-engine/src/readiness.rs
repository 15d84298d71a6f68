//! Waiting for the database to accept connections

use crate::error::PipelineError;
use crate::pipeline::PipelineState;
use modelgen_catalog::ReadinessProbe;
use modelgen_core::ReadinessSettings;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Bounded connect-and-disconnect poll
#[derive(Debug, Clone)]
pub struct ReadinessPoller {
    interval: Duration,
    max_attempts: u32,
}

impl ReadinessPoller {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self { interval, max_attempts }
    }

    pub fn from_settings(settings: &ReadinessSettings) -> Self {
        Self::new(settings.interval(), settings.max_attempts)
    }

    /// Probe every interval until one attempt succeeds.
    ///
    /// Each attempt is preceded by one interval, giving a freshly started
    /// container time to boot. Returns the number of attempts used.
    /// Cancellation interrupts both the wait and a probe in flight and is
    /// reported as `Cancelled(reached)`.
    pub async fn wait_ready<P>(
        &self,
        probe: &P,
        cancel: &CancellationToken,
        reached: PipelineState,
    ) -> Result<u32, PipelineError>
    where
        P: ReadinessProbe + ?Sized,
    {
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=self.max_attempts {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PipelineError::Cancelled(reached)),
                outcome = async {
                    tokio::time::sleep(self.interval).await;
                    probe.probe().await
                } => outcome,
            };

            match outcome {
                Ok(()) => {
                    tracing::debug!("Database ready after {} attempt(s)", attempt);
                    return Ok(attempt);
                }
                Err(e) => {
                    tracing::debug!("Readiness attempt {}/{} failed: {}", attempt, self.max_attempts, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(PipelineError::ReadinessTimeout {
            attempts: self.max_attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelgen_catalog::MockProbe;

    fn fast_poller(max_attempts: u32) -> ReadinessPoller {
        ReadinessPoller::new(Duration::from_millis(1), max_attempts)
    }

    #[tokio::test]
    async fn returns_after_first_success() {
        let probe = MockProbe::ready_after(3);
        let attempts = fast_poller(10)
            .wait_ready(&probe, &CancellationToken::new(), PipelineState::ContainerStarted)
            .await
            .unwrap();

        assert_eq!(attempts, 4);
        assert_eq!(probe.attempts(), 4);
    }

    #[tokio::test]
    async fn times_out_after_max_attempts() {
        let probe = MockProbe::never_ready();
        let result = fast_poller(5)
            .wait_ready(&probe, &CancellationToken::new(), PipelineState::ContainerStarted)
            .await;

        match result {
            Err(PipelineError::ReadinessTimeout { attempts, last_error }) => {
                assert_eq!(attempts, 5);
                assert!(last_error.contains("attempt 5"));
            }
            other => panic!("Expected ReadinessTimeout, got {:?}", other),
        }
        assert_eq!(probe.attempts(), 5);
    }

    #[tokio::test]
    async fn stops_when_cancelled() {
        let probe = MockProbe::never_ready();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = fast_poller(5)
            .wait_ready(&probe, &cancel, PipelineState::ContainerStarted)
            .await;

        assert!(matches!(
            result,
            Err(PipelineError::Cancelled(PipelineState::ContainerStarted))
        ));
        assert_eq!(probe.attempts(), 0);
    }

    #[tokio::test]
    async fn cancel_interrupts_interval_without_probing() {
        let probe = MockProbe::never_ready();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let poller = ReadinessPoller::new(Duration::from_secs(30), 3);
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            poller.wait_ready(&probe, &cancel, PipelineState::DatabaseReady),
        )
        .await
        .expect("cancellation should end the wait promptly");

        assert!(matches!(
            result,
            Err(PipelineError::Cancelled(PipelineState::DatabaseReady))
        ));
        assert_eq!(probe.attempts(), 0);
    }

    #[test]
    fn from_settings_uses_configured_bounds() {
        let poller = ReadinessPoller::from_settings(&ReadinessSettings::default());
        assert_eq!(poller.interval, Duration::from_secs(1));
        assert_eq!(poller.max_attempts, 60);
    }
}
