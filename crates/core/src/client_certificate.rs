use crate::error::CoreError;

/// Unique identifier of a [`ClientCertificate`].
pub type ClientCertificateId = i64;

/// A client certificate installed on one or more [`Node`](crate::Node)s to
/// authenticate the control plane to each daemon.
///
/// The certificate and key bytes themselves live behind a
/// [`FileStore`](crate::FileStore) at `cert_path`/`key_path`; this struct
/// only carries the row and the paths, matching the spec's separation
/// between the certificate *record* and the certificate *blob* (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCertificate {
    pub id: ClientCertificateId,
    /// SHA-256 fingerprint, hex, uppercase, colon-delimited octets
    /// (e.g. `AA:BB:CC:...`), uniquely identifying the certificate bytes.
    pub fingerprint: String,
    pub expires_at: i64,
    pub cert_path: String,
    pub key_path: String,
    pub passphrase: Option<String>,
}

/// Persistence boundary for [`ClientCertificate`] records.
#[async_trait::async_trait]
pub trait ClientCertificateRepository: Send + Sync {
    async fn insert(&self, cert: ClientCertificate) -> Result<ClientCertificate, CoreError>;
    async fn find_by_id(
        &self,
        id: ClientCertificateId,
    ) -> Result<Option<ClientCertificate>, CoreError>;

    /// Returns the lowest-ID certificate currently on record, used by node
    /// enrollment (§4.I) to reuse an existing client certificate rather
    /// than minting a new one for every node.
    async fn first_by_id_order(&self) -> Result<Option<ClientCertificate>, CoreError>;

    /// Deletes the row and its two on-disk blobs. Implementations must
    /// reject the delete while any [`Node`](crate::Node) still references
    /// `id` (the spec's invariant that a referenced certificate cannot be
    /// destroyed) by returning [`CoreError::Validation`].
    async fn delete(&self, id: ClientCertificateId) -> Result<(), CoreError>;
}
