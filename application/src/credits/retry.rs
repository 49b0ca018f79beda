use std::future::Future;

use crate::config::RetryPolicy;
use crate::error::{AppError, AppResult};
use crate::ports::outgoing::delay::DelayPort;

/// Runs a ledger write, retrying transient store failures with linear backoff.
///
/// Business outcomes such as `InsufficientCredits` or `NotFound` are returned
/// on the first attempt. When the retry budget runs out the last transient
/// error is reported as `LedgerWriteFailed`. Every attempt must write the
/// same row ids, since a failed acknowledgement can follow a landed write.
pub async fn with_ledger_retry<T, F, Fut>(
    policy: RetryPolicy,
    delay: &dyn DelayPort,
    operation: &str,
    mut attempt_write: F,
) -> AppResult<T>
where
    T: Send,
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = AppResult<T>> + Send,
{
    let mut retries = 0_u32;
    loop {
        match attempt_write().await {
            Err(err) if err.is_transient() => {
                if retries >= policy.max_retries {
                    tracing::error!(
                        operation,
                        attempts = retries + 1,
                        error = %err,
                        "Ledger write failed after exhausting retries"
                    );
                    return Err(AppError::LedgerWriteFailed {
                        message: format!("{operation} failed after {} attempts", retries + 1),
                    });
                }
                retries += 1;
                tracing::warn!(operation, retry = retries, error = %err, "Retrying ledger write");
                delay.sleep(policy.backoff * retries).await;
            }
            result => return result,
        }
    }
}
