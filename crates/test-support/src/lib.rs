//! An in-process TCP+TLS listener speaking just enough of the BINN-over-TLS
//! wire protocol to exercise the dialer, pool, and daemon-client services
//! from integration tests without a real managed node.
//!
//! A [`MockDaemon`] always accepts the login frame and replies `Ok`
//! unconditionally — none of the client services this crate supports
//! re-authenticate mid-connection, so there is nothing interesting to test
//! in the login step itself. Every frame after that is answered by the next
//! [`Step`] in the script the caller supplies.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rcgen::{CertificateParams, KeyPair};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;
use wire::{read_frame, write_frame, Mode, StatusCode, Value};

/// One scripted exchange after the login handshake.
pub enum Step {
    /// Read one request frame, write `response` back.
    Reply(Value),
    /// Read one request frame, write `header` (typically a `ReadyToTransfer`
    /// base response carrying the announced size), then write `bytes`
    /// straight onto the wire with no framing — a download (§4.G FileSend).
    SendBytes(Value, Vec<u8>),
    /// Read one request frame, write `header`, read exactly `len` raw bytes
    /// back, then write `followup` — an upload (§4.G FileSend).
    ReceiveBytes(Value, usize, Value),
}

/// A running mock daemon. Dropping it aborts the accept task.
pub struct MockDaemon {
    pub addr: SocketAddr,
    pub server_cert_pem: Vec<u8>,
    handle: JoinHandle<()>,
}

impl MockDaemon {
    /// Binds to an ephemeral `127.0.0.1` port, accepts exactly one TLS
    /// connection, and runs `steps` against it in order. One [`MockDaemon`]
    /// serves one logical test connection; spin up a fresh one per test.
    pub async fn spawn(steps: Vec<Step>) -> Self {
        let _ = rustls::crypto::ring::default_provider().install_default();

        let (cert_pem, key_pem) = self_signed_identity();
        let server_config = ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(parse_certs(cert_pem.as_bytes()), parse_key(key_pem.as_bytes()))
            .expect("self-signed mock daemon cert/key are well-formed");
        let acceptor = TlsAcceptor::from(Arc::new(server_config));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("binding an ephemeral mock daemon port never fails in tests");
        let addr = listener.local_addr().expect("bound listener has a local address");

        let handle = tokio::spawn(async move {
            let Ok((tcp, _)) = listener.accept().await else {
                return;
            };
            let Ok(mut tls) = acceptor.accept(tcp).await else {
                return;
            };
            let _ = run_script(&mut tls, steps).await;
        });

        Self {
            addr,
            server_cert_pem: cert_pem.into_bytes(),
            handle,
        }
    }

    /// Builds a [`net::DialConfig`] pointing at this daemon, with a freshly
    /// minted (unverified — the dialer's `SkipVerify` never checks it)
    /// client identity.
    #[must_use]
    pub fn dial_config(&self, mode: Mode) -> net::DialConfig {
        let (client_cert_pem, client_key_pem) = self_signed_identity();
        net::DialConfig {
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            username: "test".to_string(),
            password: "test".to_string(),
            server_cert_pem: self.server_cert_pem.clone(),
            client_cert_pem: client_cert_pem.into_bytes(),
            key_pem: client_key_pem.into_bytes(),
            timeout: Duration::from_secs(2),
            mode,
            pinned_fingerprint: None,
        }
    }
}

impl Drop for MockDaemon {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run_script<S>(stream: &mut S, steps: Vec<Step>) -> Result<(), wire::WireError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let _login = read_frame(stream).await?;
    write_frame(stream, &ok_response("ok", None)).await?;

    for step in steps {
        let _request = read_frame(stream).await?;
        match step {
            Step::Reply(response) => {
                write_frame(stream, &response).await?;
            }
            Step::SendBytes(header, bytes) => {
                write_frame(stream, &header).await?;
                stream.write_all(&bytes).await?;
                stream.flush().await?;
            }
            Step::ReceiveBytes(header, len, followup) => {
                write_frame(stream, &header).await?;
                let mut buf = vec![0u8; len];
                stream.read_exact(&mut buf).await?;
                write_frame(stream, &followup).await?;
            }
        }
    }
    Ok(())
}

/// Builds an `[Ok, info, data?]` base response.
#[must_use]
pub fn ok_response(info: &str, data: Option<Value>) -> Value {
    let mut items = vec![Value::Int32(StatusCode::Ok as i32), Value::Str(info.to_string())];
    if let Some(data) = data {
        items.push(data);
    }
    Value::list(items)
}

/// Builds an error base response `[code, info]`.
#[must_use]
pub fn error_response(code: i32, info: &str) -> Value {
    Value::list([Value::Int32(code), Value::Str(info.to_string())])
}

/// Builds a `ReadyToTransfer` base response announcing `size` bytes to follow.
#[must_use]
pub fn ready_to_transfer(size: u64) -> Value {
    Value::list([
        Value::Int32(StatusCode::ReadyToTransfer as i32),
        Value::Str("ready".to_string()),
        Value::UInt64(size),
    ])
}

fn self_signed_identity() -> (String, String) {
    let key = KeyPair::generate().expect("ecdsa key generation never fails in tests");
    let params = CertificateParams::new(Vec::<String>::new()).expect("empty SAN list is always valid");
    let cert = params
        .self_signed(&key)
        .expect("self-signing a freshly generated key never fails");
    (cert.pem(), key.serialize_pem())
}

fn parse_certs(pem: &[u8]) -> Vec<CertificateDer<'static>> {
    rustls_pemfile::certs(&mut Cursor::new(pem))
        .collect::<Result<Vec<_>, _>>()
        .expect("test-generated certificate PEM always parses")
}

fn parse_key(pem: &[u8]) -> PrivateKeyDer<'static> {
    rustls_pemfile::private_key(&mut Cursor::new(pem))
        .expect("test-generated key PEM always parses")
        .expect("test-generated key PEM always contains one key")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_then_single_reply_round_trips() {
        let daemon = MockDaemon::spawn(vec![Step::Reply(ok_response("pong", None))]).await;
        let config = daemon.dial_config(Mode::Status);

        let dialer = net::TlsDialer::new();
        let mut stream = dialer.dial(&config).await.expect("dial succeeds against the mock daemon");

        write_frame(&mut stream, &Value::list([Value::Int32(1)]))
            .await
            .expect("write request frame");
        let response = read_frame(&mut stream).await.expect("read response frame");
        let base = wire::BaseResponse::from_value(&response).unwrap();
        assert!(base.is_ok());
        assert_eq!(base.info, "pong");
    }
}
