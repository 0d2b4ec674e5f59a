use std::time::Duration;

use wire::Mode;

/// Everything the dialer needs to open one mTLS connection and log in,
/// as produced by the Config Maker (§4.D).
#[derive(Debug, Clone)]
pub struct DialConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// PEM of the daemon's own server certificate; used as the sole trust
    /// anchor since the daemon is its own CA for itself in this protocol.
    pub server_cert_pem: Vec<u8>,
    pub client_cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
    pub timeout: Duration,
    pub mode: Mode,
    /// Optional SHA-256 fingerprint the handshake must match, on top of
    /// (not instead of) the spec's required skip-verify trust model (§9
    /// open question, §4.B supplement). `None` preserves the spec's literal
    /// `InsecureSkipVerify=true` behavior.
    pub pinned_fingerprint: Option<[u8; 32]>,
}

impl DialConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire::Mode;

    #[test]
    fn addr_joins_host_and_port() {
        let config = DialConfig {
            host: "10.0.0.5".into(),
            port: 31717,
            username: String::new(),
            password: String::new(),
            server_cert_pem: Vec::new(),
            client_cert_pem: Vec::new(),
            key_pem: Vec::new(),
            timeout: DialConfig::DEFAULT_TIMEOUT,
            mode: Mode::Cmd,
            pinned_fingerprint: None,
        };
        assert_eq!(config.addr(), "10.0.0.5:31717");
    }
}
