use std::future::Future;

use tokio::time::sleep;

use crate::config::RetryPolicy;

use super::{FetchResult, RetryClass};

/// Run `operation` until it succeeds, fails terminally, or the attempt budget is spent.
///
/// The operation receives the 1-based attempt number. Only failures classed
/// as [`RetryClass::WithBackoff`] are retried.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> FetchResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    log::info!("{label} succeeded on attempt {attempt}/{max_attempts}");
                }
                return Ok(value);
            }
            Err(err) if err.retry_class() == RetryClass::Never => {
                log::warn!("{label} failed without retry ({}): {err}", err.kind());
                return Err(err);
            }
            Err(err) if attempt >= max_attempts => {
                log::warn!("{label} failed after {max_attempts} attempts: {err}");
                return Err(err);
            }
            Err(err) => {
                let delay = policy.delay_after(attempt);
                log::warn!(
                    "{label} attempt {attempt}/{max_attempts} failed ({err}); retrying in {delay:?}"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
