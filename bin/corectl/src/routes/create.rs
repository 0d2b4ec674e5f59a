use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use core::OsTag;
use enroll::CreateRequest;

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /gdaemon/create/{token}` (§6, §4.I Create).
///
/// The path segment exists for the route's RESTful shape but the token
/// that is actually checked comes from the multipart `token` field, per
/// the specification's "Reads `token` field and compares" wording — a
/// caller that posts a mismatched path token and form token is judged on
/// the form value.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Path(_path_token): Path<String>,
    multipart: Multipart,
) -> Result<String, ApiError> {
    let request = parse_request(multipart).await?;
    let response = state.create_service.create(request).await?;
    Ok(response.body)
}

async fn parse_request(mut multipart: Multipart) -> Result<CreateRequest, ApiError> {
    let mut token = None;
    let mut csr_pem = Vec::new();
    let mut addresses = Vec::new();
    let mut port = None;
    let mut os = OsTag::Linux;
    let mut name = None;
    let mut provider = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError(core::CoreError::Validation(e.to_string())))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "token" => {
                token = Some(text(field).await?);
            }
            "gdaemon_server_cert" => {
                csr_pem = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError(core::CoreError::Validation(e.to_string())))?
                    .to_vec();
            }
            "ip[]" => {
                addresses.push(text(field).await?);
            }
            "gdaemon_port" => {
                let raw = text(field).await?;
                port = Some(
                    raw.parse::<u16>()
                        .map_err(|_| ApiError(core::CoreError::Validation(format!("gdaemon_port {raw:?} is not a valid port"))))?,
                );
            }
            "os" => {
                os = parse_os(&text(field).await?);
            }
            "name" => {
                name = Some(text(field).await?);
            }
            "provider" => {
                provider = Some(text(field).await?);
            }
            _ => {}
        }
    }

    Ok(CreateRequest {
        token: token.unwrap_or_default(),
        csr_pem,
        addresses,
        port,
        os,
        name,
        provider,
    })
}

async fn text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError(core::CoreError::Validation(e.to_string())))
}

fn parse_os(raw: &str) -> OsTag {
    match raw.to_ascii_lowercase().as_str() {
        "windows" => OsTag::Windows,
        "linux" => OsTag::Linux,
        _ => OsTag::Other,
    }
}
