use std::sync::{Arc, Mutex as StdMutex};

use core::FileStore;
use rand::RngCore;
use rcgen::{
    CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa, KeyIdMethod,
    KeyPair, KeyUsagePurpose, SerialNumber,
};
use time::{Duration, OffsetDateTime};

use crate::error::CaError;
use crate::subject::SubjectOverrides;

const ROOT_CERT_PATH: &str = "certs/root.crt";
const ROOT_KEY_PATH: &str = "certs/root.key";
const VALIDITY: Duration = Duration::days(3650);

/// Result of [`CertificateService::root`]/[`CertificateService::generate`].
#[derive(Debug, Clone)]
pub struct CertAndKey {
    pub cert_pem: String,
    pub key_pem: String,
}

/// Root CA lifecycle, CSR signing, client certificate generation and
/// fingerprinting (§4.H). Backed by a [`FileStore`] rather than the local
/// filesystem directly, matching the spec's storage abstraction (§3).
pub struct CertificateService {
    files: Arc<dyn FileStore>,
    /// Guards root generation so two concurrent first-readers in one
    /// process don't both attempt to persist `certs/root.*` (§9 supplement
    /// — this complements, not replaces, the lazy generate-on-read
    /// semantics the spec requires).
    root_lock: StdMutex<()>,
}

impl CertificateService {
    #[must_use]
    pub fn new(files: Arc<dyn FileStore>) -> Self {
        Self {
            files,
            root_lock: StdMutex::new(()),
        }
    }

    /// Returns the RootCA certificate PEM, generating and persisting a
    /// fresh CA key pair on first call (§4.H Root). Uses `rcgen`'s default
    /// ECDSA P-256 key rather than RSA — `ring`, which backs `rcgen`'s key
    /// generation, cannot generate RSA keys, only sign with ones supplied
    /// externally (see DESIGN.md).
    pub async fn root(&self) -> Result<String, CaError> {
        if self.files.exists(ROOT_CERT_PATH).await {
            let bytes = self.files.read(ROOT_CERT_PATH).await?;
            return String::from_utf8(bytes)
                .map_err(|e| CaError::InvalidPem(e.to_string()));
        }

        // Only one in-process caller performs the generate-and-persist
        // step; a racing second process may still overwrite these files,
        // which the spec explicitly tolerates ("last-writer-wins").
        let _guard = self.root_lock.lock().unwrap_or_else(|p| p.into_inner());
        if self.files.exists(ROOT_CERT_PATH).await {
            let bytes = self.files.read(ROOT_CERT_PATH).await?;
            return String::from_utf8(bytes)
                .map_err(|e| CaError::InvalidPem(e.to_string()));
        }

        let key = KeyPair::generate().map_err(CaError::Generation)?;
        let mut params = CertificateParams::new(Vec::<String>::new()).map_err(CaError::Generation)?;
        params.is_ca = IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
        params.not_before = OffsetDateTime::now_utc();
        params.not_after = OffsetDateTime::now_utc() + VALIDITY;
        params.key_identifier_method = KeyIdMethod::Sha256;
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, "GameAP CA");
        dn.push(DnType::OrganizationName, "GameAP");
        dn.push(DnType::CountryName, "RU");
        params.distinguished_name = dn;

        let cert = params.self_signed(&key).map_err(CaError::Generation)?;
        let cert_pem = cert.pem();
        let key_pem = key.serialize_pem();

        self.files.write(ROOT_CERT_PATH, cert_pem.as_bytes()).await?;
        self.files.write(ROOT_KEY_PATH, key_pem.as_bytes()).await?;

        Ok(cert_pem)
    }

    /// Loads the persisted root cert+key as an `rcgen` issuer pair, used
    /// internally by [`Self::sign`]. Calls [`Self::root`] first so the
    /// lazy-generation rule applies here too.
    async fn load_root(&self) -> Result<(rcgen::Certificate, KeyPair), CaError> {
        let cert_pem = self.root().await?;
        let key_bytes = self.files.read(ROOT_KEY_PATH).await?;
        let key_pem = String::from_utf8(key_bytes).map_err(|e| CaError::InvalidPem(e.to_string()))?;

        let key = KeyPair::from_pem(&key_pem).map_err(CaError::Generation)?;
        let params = CertificateParams::from_ca_cert_pem(&cert_pem).map_err(CaError::Generation)?;
        let cert = params.self_signed(&key).map_err(CaError::Generation)?;
        Ok((cert, key))
    }

    /// Signs a daemon-supplied CSR with the root key (§4.H Sign). `rcgen`
    /// rejects a CSR whose embedded self-signature doesn't verify while
    /// parsing it, satisfying the spec's "verify its self-signature" step.
    pub async fn sign(&self, csr_pem: &str, overrides: &SubjectOverrides) -> Result<String, CaError> {
        let (root_cert, root_key) = self.load_root().await?;

        let mut csr_params =
            rcgen::CertificateSigningRequestParams::from_pem(csr_pem).map_err(CaError::InvalidCsr)?;

        let mut serial_bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut serial_bytes);
        csr_params.params.serial_number = Some(SerialNumber::from_slice(&serial_bytes));
        csr_params.params.not_before = OffsetDateTime::now_utc();
        csr_params.params.not_after = OffsetDateTime::now_utc() + VALIDITY;
        csr_params.params.key_usages = vec![
            KeyUsagePurpose::DigitalSignature,
            KeyUsagePurpose::KeyEncipherment,
        ];
        csr_params.params.extended_key_usages = vec![
            ExtendedKeyUsagePurpose::ServerAuth,
            ExtendedKeyUsagePurpose::ClientAuth,
        ];
        overrides.apply(&mut csr_params.params.distinguished_name);

        let signed = csr_params
            .signed_by(&root_cert, &root_key)
            .map_err(CaError::Generation)?;
        Ok(signed.pem())
    }

    /// Generates a fresh key, builds a CSR, signs it via [`Self::sign`],
    /// persists both PEMs through the [`FileStore`], and returns them
    /// (§4.H Generate).
    pub async fn generate(
        &self,
        cert_path: &str,
        key_path: &str,
        overrides: &SubjectOverrides,
    ) -> Result<CertAndKey, CaError> {
        let key = KeyPair::generate().map_err(CaError::Generation)?;
        let mut params = CertificateParams::new(Vec::<String>::new()).map_err(CaError::Generation)?;
        overrides.apply(&mut params.distinguished_name);

        let csr = params.serialize_request(&key).map_err(CaError::Generation)?;
        let csr_pem = csr.pem().map_err(CaError::Generation)?;

        let cert_pem = self.sign(&csr_pem, overrides).await?;
        let key_pem = key.serialize_pem();

        self.files.write(cert_path, cert_pem.as_bytes()).await?;
        self.files.write(key_path, key_pem.as_bytes()).await?;

        Ok(CertAndKey { cert_pem, key_pem })
    }
}
