use std::io::Cursor;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use rustls::ClientConfig;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use wire::{read_frame, write_frame, BaseResponse, LoginRequest};

use crate::config::DialConfig;
use crate::error::NetError;
use crate::verifier::SkipVerify;

/// A connected, authenticated socket. Once `dial` returns, the connection's
/// protocol mode is fixed for its lifetime, per the spec's "first
/// successful login fixes the connection's protocol mode" rule (§4.B).
pub type AuthenticatedStream = TlsStream<TcpStream>;

/// Opens `tcp → tls` connections to gdaemon nodes and performs the login
/// handshake that every protocol mode requires before issuing requests.
#[derive(Debug, Clone, Default)]
pub struct TlsDialer;

impl TlsDialer {
    #[must_use]
    pub fn new() -> Self {
        // Idempotent: a binary may construct several dialers, but rustls
        // only lets one process-wide default crypto provider be installed.
        let _ = rustls::crypto::ring::default_provider().install_default();
        Self
    }

    /// Connects to `config.addr()`, completes the TLS handshake using the
    /// client certificate chain in `config`, and logs in for
    /// `config.mode`. Fails with [`NetError::LoginRejected`] if the daemon's
    /// base response code is not `Ok`.
    pub async fn dial(&self, config: &DialConfig) -> Result<AuthenticatedStream, NetError> {
        let tls_config = self.build_client_config(config)?;
        let connector = TlsConnector::from(Arc::new(tls_config));

        let tcp = timeout(config.timeout, TcpStream::connect(config.addr()))
            .await
            .map_err(|_| NetError::Timeout(config.timeout))?
            .map_err(NetError::Connect)?;
        tcp.set_nodelay(true).map_err(NetError::Connect)?;

        // `InsecureSkipVerify` means any name works; nodes are often
        // addressed by raw IP with no meaningful DNS name (§4.B).
        let server_name = ServerName::try_from("gdaemon-node")
            .expect("static server name is a valid DNS-ish name")
            .to_owned();

        let mut stream = timeout(config.timeout, connector.connect(server_name, tcp))
            .await
            .map_err(|_| NetError::Timeout(config.timeout))?
            .map_err(NetError::Handshake)?;

        self.login(&mut stream, config).await?;
        Ok(stream)
    }

    async fn login(
        &self,
        stream: &mut AuthenticatedStream,
        config: &DialConfig,
    ) -> Result<(), NetError> {
        let login = LoginRequest {
            username: config.username.clone(),
            password: config.password.clone(),
            target_mode: config.mode,
        };
        write_frame(stream, &login.to_value()).await?;

        let response = read_frame(stream).await?;
        let base = BaseResponse::from_value(&response)?;
        if !base.is_ok() {
            return Err(NetError::LoginRejected {
                code: base.code,
                info: base.info,
            });
        }
        Ok(())
    }

    fn build_client_config(&self, config: &DialConfig) -> Result<ClientConfig, NetError> {
        let client_certs = parse_certs(&config.client_cert_pem)?;
        let key = parse_private_key(&config.key_pem)?;
        let verifier = SkipVerify::new(config.pinned_fingerprint);

        ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(verifier))
            .with_client_auth_cert(client_certs, key)
            .map_err(|e| NetError::BadCert(e.to_string()))
    }
}

fn parse_certs(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>, NetError> {
    let mut cursor = Cursor::new(pem);
    rustls_pemfile::certs(&mut cursor)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| NetError::BadCert(format!("invalid certificate PEM: {e}")))
}

fn parse_private_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>, NetError> {
    let mut cursor = Cursor::new(pem);
    rustls_pemfile::private_key(&mut cursor)
        .map_err(|e| NetError::BadCert(format!("invalid private key PEM: {e}")))?
        .ok_or_else(|| NetError::BadCert("no private key found in PEM".to_string()))
}

/// Parses the value wire layer's server certificate PEM just to validate
/// it decodes; used by the Config Maker to fail fast before ever dialing.
pub fn validate_server_cert_pem(pem: &[u8]) -> Result<(), NetError> {
    parse_certs(pem).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pem_yields_no_certs_not_an_error() {
        let certs = parse_certs(b"").unwrap();
        assert!(certs.is_empty());
    }

    #[test]
    fn garbage_pem_is_rejected_as_no_private_key() {
        let err = parse_private_key(b"not a pem file").unwrap_err();
        assert!(matches!(err, NetError::BadCert(_)));
    }

    #[test]
    fn validate_server_cert_pem_accepts_well_formed_cert() {
        use rcgen::{CertificateParams, KeyPair};
        let key = KeyPair::generate().unwrap();
        let cert = CertificateParams::new(Vec::<String>::new())
            .unwrap()
            .self_signed(&key)
            .unwrap();
        assert!(validate_server_cert_pem(cert.pem().as_bytes()).is_ok());
    }
}
