//! Sequential, per-attempt bounded probe execution.

use serde_json::Value;
use std::future::Future;
use tokio::time::{sleep, timeout, Duration, Instant};
use tracing::{debug, error, warn};

use crate::error::ProbeError;
use crate::policy::RetryPolicy;
use crate::probe::ProbeReading;
use crate::types::{AttemptOutcome, CapabilityKind, ProbeAttempt};

/// Everything the executor observed for one capability.
#[derive(Debug, Clone)]
pub struct RetryReport {
    pub attempts: Vec<ProbeAttempt>,
    /// The reading of the attempt that resolved in time, if any did.
    pub reading: Option<ProbeReading>,
}

impl RetryReport {
    pub fn timed_out(&self) -> bool {
        self.attempts
            .iter()
            .any(|attempt| attempt.outcome == AttemptOutcome::Timeout)
    }

    pub fn last_detail(&self) -> Option<&Value> {
        self.attempts.last().and_then(|attempt| attempt.detail.as_ref())
    }
}

/// Run `probe` under `policy` until it resolves or attempts run out.
///
/// Each attempt is spawned so a panicking probe is isolated, and bounded by
/// `policy.timeout_ms`. A timed-out attempt is abandoned: the task keeps
/// running detached and its late result is dropped. Attempt N+1 never starts
/// before attempt N has resolved or timed out. Never fails.
pub async fn run_with_policy<F, Fut>(
    kind: CapabilityKind,
    policy: RetryPolicy,
    mut probe: F,
) -> RetryReport
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ProbeReading, ProbeError>> + Send + 'static,
{
    let max_attempts = policy.max_attempts.max(1);
    let bound = Duration::from_millis(policy.timeout_ms);
    let mut attempts = Vec::with_capacity(max_attempts as usize);

    for ordinal in 1..=max_attempts {
        let started = Instant::now();
        let handle = tokio::spawn(probe());
        let result = timeout(bound, handle).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let (outcome, detail) = match result {
            Ok(Ok(Ok(reading))) => {
                let outcome = if reading.is_success() {
                    AttemptOutcome::Success
                } else {
                    AttemptOutcome::Failure
                };
                debug!(
                    "{} probe attempt {}/{} resolved: {:?}",
                    kind, ordinal, max_attempts, outcome
                );
                attempts.push(ProbeAttempt {
                    attempt: ordinal,
                    outcome,
                    detail: Some(reading.raw.clone()),
                    elapsed_ms,
                });
                return RetryReport {
                    attempts,
                    reading: Some(reading),
                };
            }
            Ok(Ok(Err(err))) => {
                warn!(
                    "{} probe attempt {}/{} failed: {}",
                    kind, ordinal, max_attempts, err
                );
                (AttemptOutcome::Error, Value::String(err.to_string()))
            }
            Ok(Err(join_err)) => {
                if join_err.is_panic() {
                    error!("{} probe attempt {}/{} panicked", kind, ordinal, max_attempts);
                    (AttemptOutcome::Error, Value::from("probe panicked"))
                } else {
                    error!("{} probe attempt {}/{} cancelled", kind, ordinal, max_attempts);
                    (AttemptOutcome::Error, Value::from("probe cancelled"))
                }
            }
            Err(_) => {
                warn!(
                    "{} probe attempt {}/{} timed out after {}ms",
                    kind, ordinal, max_attempts, policy.timeout_ms
                );
                (
                    AttemptOutcome::Timeout,
                    Value::String(format!("timed out after {}ms", policy.timeout_ms)),
                )
            }
        };

        attempts.push(ProbeAttempt {
            attempt: ordinal,
            outcome,
            detail: Some(detail),
            elapsed_ms,
        });

        if ordinal < max_attempts && policy.retry_delay_ms > 0 {
            sleep(Duration::from_millis(policy.retry_delay_ms)).await;
        }
    }

    RetryReport {
        attempts,
        reading: None,
    }
}
