//! Retry policy for remote engine failures.
//!
//! The pipeline reports each remote call as a single-attempt outcome;
//! retrying is an application decision. Only failures the pipeline marks
//! retryable are retried, with exponential backoff between attempts.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use medibridge_core::config::RetryConfig;
use medibridge_pipeline::PipelineError;

/// Run `op` until it succeeds, fails non-retryably, or exhausts the
/// configured attempts. Delays double after each failure, starting at
/// `base_delay_ms`.
pub async fn with_retries<T, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    mut op: F,
) -> Result<T, PipelineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                let delay =
                    Duration::from_millis(config.base_delay_ms << (attempt - 1).min(16));
                warn!(
                    operation,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "retrying after failure"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
