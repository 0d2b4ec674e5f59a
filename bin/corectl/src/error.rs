use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use core::{CoreError, CoreErrorKind};

/// Wraps [`CoreError`] so the route handlers can return it directly and
/// have axum map it onto the status codes from the specification's error
/// table (§7): not-found to 404, validation to 422, forbidden/invalid
/// setup token to 403, unauthorized/invalid create token to 401,
/// everything else to a 500 that still logs the underlying cause.
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl From<enroll::EnrollError> for ApiError {
    fn from(err: enroll::EnrollError) -> Self {
        Self(err.into())
    }
}

impl From<ca::CaError> for ApiError {
    fn from(err: ca::CaError) -> Self {
        Self(err.into())
    }
}

impl From<bundle::BundleError> for ApiError {
    fn from(err: bundle::BundleError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            CoreErrorKind::NotFound => StatusCode::NOT_FOUND,
            CoreErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            CoreErrorKind::Forbidden => StatusCode::FORBIDDEN,
            CoreErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            CoreErrorKind::Cancelled => StatusCode::INTERNAL_SERVER_ERROR,
            CoreErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}
