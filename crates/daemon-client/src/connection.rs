use std::sync::Arc;

use core::CoreError;
use net::{NodePool, PooledConnection};
use wire::WireError;

/// [`WireError::Io`] is a genuine socket failure (the connection dropped
/// mid read/write) rather than a framing/parsing problem, so it becomes
/// [`CoreError::Dial`] — the one variant `retry_connection` retries —
/// instead of [`CoreError::Frame`]. [`WireError::EndMarkerMismatch`] and
/// [`WireError::Malformed`] stay [`CoreError::Frame`], since those mean the
/// bytes that did arrive don't decode, not that the connection is bad
/// (§4.E/F/G "parsing errors are not retried").
pub(crate) fn wire_err_to_core(err: WireError) -> CoreError {
    match err {
        WireError::Io(io_err) => CoreError::Dial(io_err.to_string()),
        other @ (WireError::EndMarkerMismatch { .. } | WireError::Malformed(_)) => {
            CoreError::Frame(other.to_string())
        }
    }
}

pub(crate) async fn acquire(pool: &Arc<NodePool>) -> Result<PooledConnection, CoreError> {
    pool.acquire().await.map_err(Into::into)
}
