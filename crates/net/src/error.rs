/// Failure kinds the dialer and pool can surface, matching the spec's
/// dial-timeout/handshake-failure/bad-cert/login-rejected taxonomy (§4.B).
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("dial timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("tcp connect failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("tls handshake failed: {0}")]
    Handshake(#[source] std::io::Error),

    #[error("invalid certificate material: {0}")]
    BadCert(String),

    #[error("daemon rejected login: code={code} info={info}")]
    LoginRejected { code: i64, info: String },

    #[error("wire protocol error: {0}")]
    Wire(#[from] wire::WireError),

    #[error("i/o error on established connection: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection pool is empty for this node")]
    PoolExhausted,
}

impl From<NetError> for core::CoreError {
    fn from(err: NetError) -> Self {
        match err {
            NetError::LoginRejected { code, info } => {
                core::CoreError::Auth(format!("login rejected (code={code}): {info}"))
            }
            other => core::CoreError::Dial(other.to_string()),
        }
    }
}
