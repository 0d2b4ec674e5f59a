use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Response};
use axum::response::IntoResponse;
use core::{CoreError, NodeId};
use daemon_client::FileService;
use net::{NodePool, TlsDialer};
use wire::Mode;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/dedicated_servers/{id}/logs.zip` (§6, §4.J, §8 S7).
pub async fn logs_zip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<NodeId>,
) -> Result<impl IntoResponse, ApiError> {
    let node = state
        .nodes
        .find_by_id(id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("node {id}")))?;

    let dial_config = state.config_maker.build(&node, Mode::Files).await?;
    let pool = state
        .pools
        .get_or_create(node.id, || NodePool::new(TlsDialer::new(), dial_config))
        .await;
    let files = FileService::new(pool);

    let zip = bundle::build_logs_zip(&files, &state.settings.remote_log_dir).await?;
    Ok(Response::builder()
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"node-{id}-logs.zip\""),
        )
        .body(Body::from(zip))
        .expect("response headers are valid"))
}
