//! Shared utilities for use cases.
//!
//! Contains the cancellable call-with-retry loop used for both NLU
//! capability calls and tool-service calls.

use crate::config::RetryPolicy;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Result of a retried operation
#[derive(Debug)]
pub(crate) enum RetryOutcome<T, E> {
    Succeeded { value: T, attempts: u32 },
    Failed { error: E, attempts: u32 },
    Cancelled,
}

/// Check if cancellation has been requested.
pub(crate) fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().is_some_and(|t| t.is_cancelled())
}

async fn cancellable<F: Future>(token: &Option<CancellationToken>, future: F) -> Option<F::Output> {
    match token {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                output = future => Some(output),
            }
        }
        None => Some(future.await),
    }
}

/// Run `op` with a per-attempt timeout, retrying errors `is_transient`
/// accepts with exponential backoff.
///
/// `op` receives the 1-based attempt number. Cancellation aborts the
/// in-flight attempt or backoff sleep immediately and is never retried.
pub(crate) async fn call_with_retry<T, E, F, Fut>(
    label: &str,
    policy: &RetryPolicy,
    token: &Option<CancellationToken>,
    is_transient: impl Fn(&E) -> bool,
    on_timeout: impl Fn() -> E,
    mut op: F,
) -> RetryOutcome<T, E>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        if is_cancelled(token) {
            return RetryOutcome::Cancelled;
        }

        let result = match cancellable(token, tokio::time::timeout(policy.timeout, op(attempt))).await {
            None => return RetryOutcome::Cancelled,
            Some(Ok(result)) => result,
            Some(Err(_elapsed)) => Err(on_timeout()),
        };

        match result {
            Ok(value) => {
                debug!("{} succeeded on attempt {}", label, attempt);
                return RetryOutcome::Succeeded {
                    value,
                    attempts: attempt,
                };
            }
            Err(error) if is_transient(&error) && attempt < max_attempts => {
                let delay = policy.backoff_for(attempt);
                warn!(
                    "{} attempt {}/{} failed: {} (retrying in {:?})",
                    label, attempt, max_attempts, error, delay
                );
                if cancellable(token, tokio::time::sleep(delay)).await.is_none() {
                    return RetryOutcome::Cancelled;
                }
                attempt += 1;
            }
            Err(error) => {
                warn!("{} failed after {} attempt(s): {}", label, attempt, error);
                return RetryOutcome::Failed {
                    error,
                    attempts: attempt,
                };
            }
        }
    }
}
