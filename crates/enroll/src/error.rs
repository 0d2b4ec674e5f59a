/// Enrollment-specific failures, distinct from [`core::CoreError`] so this
/// crate has no dependency on the HTTP layer; `corectl` converts at its
/// boundary (§4.I, §7).
#[derive(Debug, thiserror::Error)]
pub enum EnrollError {
    /// `/gdaemon/setup/{token}` didn't match `DAEMON_SETUP_TOKEN` or the
    /// cached `node-auto-setup-token` value.
    #[error("invalid setup token")]
    InvalidSetupToken,

    /// `/gdaemon/create/{token}` didn't match the cached `node-create-token`.
    #[error("invalid create token")]
    InvalidCreateToken,

    /// Bad input caught before any I/O (missing/empty CSR file, bad port).
    #[error("validation error: {0}")]
    Validation(String),

    /// CSR parsing or signing failed.
    #[error("certificate error: {0}")]
    Certificate(#[from] ca::CaError),

    /// Repository/file-store failure underneath the enrollment flow.
    #[error(transparent)]
    Core(#[from] core::CoreError),
}

impl From<EnrollError> for core::CoreError {
    fn from(err: EnrollError) -> Self {
        match err {
            EnrollError::InvalidSetupToken => core::CoreError::InvalidSetupToken,
            EnrollError::InvalidCreateToken => core::CoreError::InvalidCreateToken,
            EnrollError::Validation(msg) => core::CoreError::Validation(msg),
            EnrollError::Certificate(err) => err.into(),
            EnrollError::Core(err) => err,
        }
    }
}
