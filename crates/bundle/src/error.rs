/// Bundle-assembly failures, distinct from [`core::CoreError`] so this
/// crate has no dependency on the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("certificate error: {0}")]
    Certificate(#[from] ca::CaError),

    #[error("zip assembly failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("i/o error while assembling bundle: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] core::CoreError),
}

impl From<BundleError> for core::CoreError {
    fn from(err: BundleError) -> Self {
        match err {
            BundleError::Core(err) => err,
            other => core::CoreError::internal(other),
        }
    }
}
