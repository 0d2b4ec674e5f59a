use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::ring::default_provider;
use rustls::{DigitallySignedStruct, Error as TlsError, SignatureScheme};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use sha2::{Digest, Sha256};

/// Trusts any certificate presented by the peer, matching the spec's
/// `InsecureSkipVerify=true` requirement (§4.B) — nodes are addressed by
/// raw IP or a non-DNS hostname, so hostname validation isn't meaningful
/// here. When `pinned_fingerprint` is set, the SHA-256 digest of the leaf
/// certificate must match it; this is an opt-in stronger check layered on
/// top of the skip-verify model, not a replacement for it.
#[derive(Debug)]
pub struct SkipVerify {
    pinned_fingerprint: Option<[u8; 32]>,
}

impl SkipVerify {
    #[must_use]
    pub fn new(pinned_fingerprint: Option<[u8; 32]>) -> Self {
        Self { pinned_fingerprint }
    }
}

impl ServerCertVerifier for SkipVerify {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        if let Some(expected) = self.pinned_fingerprint {
            let actual: [u8; 32] = Sha256::digest(end_entity.as_ref()).into();
            if actual != expected {
                return Err(TlsError::General(
                    "server certificate fingerprint does not match pinned value".to_string(),
                ));
            }
        }
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &default_provider().signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &default_provider().signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        default_provider().signature_verification_algorithms.supported_schemes()
    }
}

#[must_use]
pub fn into_arc(verifier: SkipVerify) -> Arc<dyn ServerCertVerifier> {
    Arc::new(verifier)
}
