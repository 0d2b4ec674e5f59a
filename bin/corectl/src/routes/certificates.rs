use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Response};
use axum::response::IntoResponse;
use bundle::CertificateBundle;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/dedicated_servers/certificates.zip` (§6, §4.J).
pub async fn certificates_zip(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let bundle = CertificateBundle::new(Arc::clone(&state.cert_service));
    let zip = bundle.build().await?;
    Ok(Response::builder()
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"certificates.zip\"",
        )
        .body(Body::from(zip))
        .expect("static response headers are valid"))
}
