//! Retrying model calls under a [`RetryPolicy`].
//!
//! Each attempt is bracketed by [`ProviderOperationHooks`] callbacks so the
//! observability crate can log and count retries without the provider knowing.

use std::future::Future;
use std::time::Duration;

use rcommon::RetryPolicy;

use crate::{ProviderError, ProviderId};

/// Callbacks fired around provider attempts. Every method defaults to a no-op.
pub trait ProviderOperationHooks: Send + Sync {
    fn on_attempt_start(&self, _provider: ProviderId, _operation: &str, _attempt: u32) {}

    /// Fired after a retryable failure, before sleeping for `delay`.
    fn on_retry_scheduled(
        &self,
        _provider: ProviderId,
        _operation: &str,
        _attempt: u32,
        _delay: Duration,
        _error: &ProviderError,
    ) {
    }

    fn on_success(&self, _provider: ProviderId, _operation: &str, _attempts: u32) {}

    /// Fired once with the error that is about to be returned.
    fn on_failure(
        &self,
        _provider: ProviderId,
        _operation: &str,
        _attempts: u32,
        _error: &ProviderError,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl ProviderOperationHooks for NoopOperationHooks {}

/// Runs `execute` until it succeeds, fails with a non-retryable error, or the
/// policy runs out of attempts.
///
/// `sleep` is injected so callers pick their timer and tests can skip waiting.
/// An error returned after more than one attempt has the attempt count
/// appended to its message.
pub async fn execute_with_retry<T, Op, OpFuture, Sleep, SleepFuture>(
    provider: ProviderId,
    operation: &str,
    policy: &RetryPolicy,
    hooks: &dyn ProviderOperationHooks,
    mut execute: Op,
    mut sleep: Sleep,
) -> Result<T, ProviderError>
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<T, ProviderError>>,
    Sleep: FnMut(Duration) -> SleepFuture,
    SleepFuture: Future<Output = ()>,
{
    let mut attempt = 1;
    let mut error = loop {
        hooks.on_attempt_start(provider, operation, attempt);

        let error = match execute(attempt).await {
            Ok(value) => {
                hooks.on_success(provider, operation, attempt);
                return Ok(value);
            }
            Err(error) => error,
        };

        if !policy.should_retry(attempt, error.retryable) {
            break error;
        }

        let delay = policy.backoff_for_attempt(attempt);
        hooks.on_retry_scheduled(provider, operation, attempt, delay, &error);
        sleep(delay).await;
        attempt += 1;
    };

    if attempt > 1 {
        error.message = format!("{} (gave up after {attempt} attempts)", error.message);
    }
    hooks.on_failure(provider, operation, attempt, &error);
    Err(error)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::ProviderErrorKind;

    #[derive(Default)]
    struct EventLog(Mutex<Vec<String>>);

    impl EventLog {
        fn push(&self, event: String) {
            self.0.lock().expect("event lock").push(event);
        }

        fn events(&self) -> Vec<String> {
            self.0.lock().expect("event lock").clone()
        }
    }

    impl ProviderOperationHooks for EventLog {
        fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
            self.push(format!("start:{provider}:{operation}:{attempt}"));
        }

        fn on_retry_scheduled(
            &self,
            _provider: ProviderId,
            _operation: &str,
            attempt: u32,
            delay: Duration,
            error: &ProviderError,
        ) {
            self.push(format!("retry:{attempt}:{}ms:{}", delay.as_millis(), error.kind));
        }

        fn on_success(&self, _provider: ProviderId, _operation: &str, attempts: u32) {
            self.push(format!("success:{attempts}"));
        }

        fn on_failure(
            &self,
            _provider: ProviderId,
            _operation: &str,
            attempts: u32,
            error: &ProviderError,
        ) {
            self.push(format!("failure:{attempts}:{}", error.kind));
        }
    }

    #[tokio::test]
    async fn gateway_warmup_is_retried_with_backoff() {
        let policy = RetryPolicy::new(3);
        let log = EventLog::default();
        let sleeps = Mutex::new(Vec::new());

        let result = execute_with_retry(
            ProviderId::OpenAi,
            "complete",
            &policy,
            &log,
            |attempt| async move {
                match attempt {
                    1 => Err(ProviderError::from_status(503, "model loading")),
                    2 => Err(ProviderError::from_status(504, "gateway timeout")),
                    _ => Ok("There are 120 employees."),
                }
            },
            |delay| {
                sleeps.lock().expect("sleep lock").push(delay);
                async {}
            },
        )
        .await;

        assert_eq!(result.expect("third attempt succeeds"), "There are 120 employees.");
        assert_eq!(
            sleeps.into_inner().expect("sleep lock"),
            vec![Duration::from_millis(200), Duration::from_millis(400)]
        );
        assert_eq!(
            log.events(),
            vec![
                "start:openai:complete:1",
                "retry:1:200ms:unavailable",
                "start:openai:complete:2",
                "retry:2:400ms:timeout",
                "start:openai:complete:3",
                "success:3",
            ]
        );
    }

    #[tokio::test]
    async fn bad_requests_fail_on_the_first_attempt() {
        let log = EventLog::default();

        let error = execute_with_retry::<(), _, _, _, _>(
            ProviderId::OpenAi,
            "complete",
            &RetryPolicy::new(5),
            &log,
            |_| async { Err(ProviderError::invalid_request("temperature out of range")) },
            |_| async {},
        )
        .await
        .expect_err("invalid requests are final");

        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
        assert_eq!(error.message, "temperature out of range");
        assert_eq!(log.events().last().map(String::as_str), Some("failure:1:invalid_request"));
    }

    #[tokio::test]
    async fn exhausted_retries_report_the_attempt_count() {
        let error = execute_with_retry::<(), _, _, _, _>(
            ProviderId::OpenAi,
            "complete",
            &RetryPolicy::new(2),
            &NoopOperationHooks,
            |_| async { Err(ProviderError::rate_limited("slow down")) },
            |_| async {},
        )
        .await
        .expect_err("rate limit persists");

        assert!(error.retryable);
        assert_eq!(error.message, "slow down (gave up after 2 attempts)");
    }
}
