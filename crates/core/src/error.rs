use std::fmt;

/// Umbrella error type returned at the boundary of every core service.
///
/// Each component crate (`wire`, `net`, `ca`, `enroll`) defines its own
/// narrower `thiserror` enum for the failures it can produce internally,
/// and converts into this type at its public API surface. The HTTP
/// bootstrap binary maps each variant onto the status codes from the
/// specification's error table (§7): [`CoreError::NotFound`] to 404,
/// [`CoreError::Validation`] to 422, [`CoreError::InvalidSetupToken`] to
/// 403, [`CoreError::InvalidCreateToken`] to 401, everything else to 500
/// while still logging the underlying cause.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// BINN decode failure or a missing/incorrect frame end marker.
    #[error("frame error: {0}")]
    Frame(String),

    /// The mTLS socket could not be opened, the handshake failed, or an
    /// established connection failed mid read/write — anything the retry
    /// helpers should treat as "redial and try again" rather than a
    /// framing/parsing failure.
    #[error("dial error connecting to node: {0}")]
    Dial(String),

    /// The daemon rejected the post-handshake login.
    #[error("authentication rejected by daemon: {0}")]
    Auth(String),

    /// The daemon answered with a non-OK status code.
    #[error("daemon reported error ({code}): {info}")]
    Daemon {
        /// Raw status code reported by the daemon (see wire::StatusCode).
        code: i64,
        /// Daemon-supplied human readable message, preserved verbatim.
        info: String,
    },

    /// Expected `ReadyToTransfer` mid file-operation but got something else.
    #[error("daemon was not ready to transfer: {0}")]
    NotReady(String),

    /// The caller's context/future was cancelled before completion.
    #[error("operation cancelled")]
    Cancelled,

    /// Bad input caught before any I/O was attempted.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced node, certificate, or root PEM does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The `/gdaemon/setup/{token}` token did not match.
    #[error("invalid setup token")]
    InvalidSetupToken,

    /// The `/gdaemon/create/{token}` token did not match.
    #[error("invalid create token")]
    InvalidCreateToken,

    /// Opaque I/O or internal failure; the cause is preserved for logging
    /// but deliberately not rendered to callers (surfaced as a 500).
    #[error("internal error")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CoreError {
    /// Wraps an arbitrary I/O or third-party error as an opaque internal
    /// failure, logging the underlying cause at the call site.
    pub fn internal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        tracing::error!(error = %err, "internal error");
        CoreError::Internal(Box::new(err))
    }

    /// Coarse classification used by callers that need to branch (e.g. the
    /// HTTP layer choosing a status code) without matching every variant.
    #[must_use]
    pub fn kind(&self) -> CoreErrorKind {
        match self {
            CoreError::NotFound(_) => CoreErrorKind::NotFound,
            CoreError::Validation(_) => CoreErrorKind::Validation,
            CoreError::InvalidSetupToken => CoreErrorKind::Forbidden,
            CoreError::InvalidCreateToken => CoreErrorKind::Unauthorized,
            CoreError::Cancelled => CoreErrorKind::Cancelled,
            _ => CoreErrorKind::Internal,
        }
    }
}

/// Coarse error classification mirroring the recovery-policy column of the
/// specification's error table (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorKind {
    NotFound,
    Validation,
    Forbidden,
    Unauthorized,
    Cancelled,
    Internal,
}

impl fmt::Display for CoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CoreErrorKind::NotFound => "not-found",
            CoreErrorKind::Validation => "validation-error",
            CoreErrorKind::Forbidden => "forbidden",
            CoreErrorKind::Unauthorized => "unauthorized",
            CoreErrorKind::Cancelled => "context-cancelled",
            CoreErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_classifies_as_not_found() {
        let err = CoreError::NotFound("node 7".into());
        assert_eq!(err.kind(), CoreErrorKind::NotFound);
    }

    #[test]
    fn daemon_error_classifies_as_internal() {
        let err = CoreError::Daemon { code: 1, info: "boom".into() };
        assert_eq!(err.kind(), CoreErrorKind::Internal);
    }
}
