/// Certificate-service failures, distinct from [`core::CoreError`] so this
/// crate has no dependency on the network/HTTP layers; callers convert at
/// their boundary.
#[derive(Debug, thiserror::Error)]
pub enum CaError {
    #[error("certificate generation failed: {0}")]
    Generation(#[source] rcgen::Error),

    #[error("invalid CSR: {0}")]
    InvalidCsr(#[source] rcgen::Error),

    #[error("invalid PEM material: {0}")]
    InvalidPem(String),

    #[error("root CA storage error: {0}")]
    Storage(#[from] core::CoreError),
}

impl From<CaError> for core::CoreError {
    fn from(err: CaError) -> Self {
        match err {
            CaError::Storage(inner) => inner,
            other => core::CoreError::Validation(other.to_string()),
        }
    }
}
