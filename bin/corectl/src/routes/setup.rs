use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use enroll::HostContext;

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /gdaemon/setup/{token}` (§6). Renders the daemon-install one-liner
/// the node pastes into its shell once the setup token checks out.
pub async fn setup(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Result<String, ApiError> {
    let host_ctx = host_context(&headers);
    let script = state.setup_service.setup(&token, &host_ctx).await?;
    Ok(script)
}

fn host_context(headers: &HeaderMap) -> HostContext {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    HostContext {
        host: header("host"),
        forwarded_host: header("x-forwarded-host"),
        forwarded_proto: header("x-forwarded-proto"),
    }
}
