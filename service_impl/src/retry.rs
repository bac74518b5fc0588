use std::future::Future;
use std::time::Duration;

use dao::DaoError;
use service::ServiceError;

/// Retries a repository operation on `DaoError::Transient` with jittered
/// exponential backoff (`10ms * 2^attempt + rand(0..=10ms)`), up to
/// `max_retries` times, then surfaces the failure as
/// `ServiceError::Retryable` rather than looping forever.
pub async fn with_retry<T, F, Fut>(max_retries: u32, mut operation: F) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DaoError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(DaoError::Transient) if attempt < max_retries => {
                let backoff_ms = 10u64.saturating_mul(1 << attempt);
                let jitter_ms = jitter(10);
                tokio::time::sleep(Duration::from_millis(backoff_ms + jitter_ms)).await;
                attempt += 1;
            }
            Err(DaoError::Transient) => return Err(ServiceError::Retryable),
            Err(other) => return Err(ServiceError::Repository(other)),
        }
    }
}

/// Cheap jitter source. Not cryptographic; only spreads retries out so
/// concurrent callers don't all wake up on the same tick.
fn jitter(max_ms: u64) -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    (nanos as u64) % (max_ms + 1)
}
