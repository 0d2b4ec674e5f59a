use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Error wrapper returned by [`retry`] once every attempt has failed.
///
/// Carries the number of attempts made so callers (and tests) can confirm
/// the retry budget was honored without re-deriving it from logs.
#[derive(Debug)]
pub struct RetryError<E> {
    pub attempts: u32,
    pub last: E,
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "operation failed after {} attempt(s): {}",
            self.attempts, self.last
        )
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryError<E> {}

/// Runs `fn` up to `attempts` times, sleeping `delay` between attempts but
/// never after the last one, returning as soon as `fn` succeeds.
///
/// `attempts` must be at least 1; `0` is treated as `1` so every caller
/// gets at least a single attempt regardless of misconfiguration, matching
/// the spec's invariant 2 precondition `attempts >= 1`.
///
/// This is the single retry primitive used by the Status, Command and
/// File services (§4.E/F/G), each of which retries only connection-layer
/// failures and never a parsing error or a mid-transfer failure — that
/// distinction is the caller's job: pass a closure that only returns `Err`
/// for retryable failures.
pub async fn retry<T, E, F, Fut>(attempts: u32, delay: Duration, mut f: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = attempts.max(1);
    let mut last_err = None;
    for attempt in 1..=attempts {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                last_err = Some(err);
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
    Err(RetryError {
        attempts,
        // `attempts >= 1` guarantees the loop ran at least once.
        last: last_err.expect("retry loop always sets last_err on failure"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn succeeds_immediately_without_sleeping() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = Arc::clone(&calls);
        let result: Result<_, RetryError<&str>> = retry(3, Duration::from_secs(30), move || {
            let calls = Arc::clone(&calls2);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &str>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_exactly_attempts_times_then_fails() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = Arc::clone(&calls);
        let result: Result<(), _> = retry(3, Duration::from_millis(1), move || {
            let calls = Arc::clone(&calls2);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>("boom")
            }
        })
        .await;
        let err = result.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn succeeds_on_final_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = Arc::clone(&calls);
        let result = retry(3, Duration::from_millis(1), move || {
            let calls = Arc::clone(&calls2);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err("not yet")
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let result: Result<(), RetryError<&str>> = retry(0, Duration::from_millis(1), || async {
            Err("fail")
        })
        .await;
        assert_eq!(result.unwrap_err().attempts, 1);
    }
}
