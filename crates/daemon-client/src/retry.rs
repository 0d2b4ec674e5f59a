use std::future::Future;
use std::time::Duration;

use core::CoreError;

/// Retry budget shared by the Status, Command and File services (§4.E/F/G):
/// 2 attempts, 10ms delay between them.
pub const ATTEMPTS: u32 = 2;
pub const DELAY: Duration = Duration::from_millis(10);

/// Retries `f` up to [`ATTEMPTS`] times, but only for connection-layer
/// failures (surfaced here as [`CoreError::Dial`]); any other error —
/// in particular a frame/parse failure — returns immediately, matching the
/// spec's "parsing errors are not retried" rule.
pub async fn retry_connection<T, F, Fut>(mut f: F) -> Result<T, CoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    let mut last_err = None;
    for attempt in 1..=ATTEMPTS {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err @ CoreError::Dial(_)) => {
                last_err = Some(err);
                if attempt < ATTEMPTS {
                    tokio::time::sleep(DELAY).await;
                }
            }
            Err(other) => return Err(other),
        }
    }
    Err(last_err.expect("loop always runs at least once"))
}
