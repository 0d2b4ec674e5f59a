use std::sync::Arc;
use std::time::Duration;

use ca::{CertificateService, SubjectOverrides};
use core::{
    ClientCertificate, ClientCertificateRepository, FileStore, InstallMethod, Node, NodeId,
    NodeRepository, OsTag, ScriptOverrides, TokenCache,
};
use tracing::info;

use crate::error::EnrollError;
use crate::setup::{CREATE_TOKEN_KEY, CREATE_TOKEN_TTL};
use crate::token::random_base62;

const API_KEY_LEN: usize = 64;
const DEFAULT_LOCATION: &str = "Unknown";
const DEFAULT_WORK_PATH: &str = "/srv/gameap";
const MAX_CSR_BYTES: usize = 10 * 1024 * 1024;

/// The node fields a daemon installer posts to `/gdaemon/create/{token}`
/// (§4.I Create). `csr_pem` is the raw bytes of the `gdaemon_server_cert`
/// multipart file field.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub token: String,
    pub csr_pem: Vec<u8>,
    pub addresses: Vec<String>,
    pub port: Option<u16>,
    pub os: OsTag,
    pub name: Option<String>,
    pub provider: Option<String>,
}

/// Result of a successful [`CreateService::create`] call.
#[derive(Debug, Clone)]
pub struct CreateResponse {
    /// `Success <nodeID> <apiKey>\n<rootCaCertPEM>\n\n<signedServerCertPEM>` (§4.I).
    pub body: String,
    pub node_id: NodeId,
    pub api_key: String,
}

/// Phase 2 of node enrollment: consumes a create token, signs the
/// daemon's CSR, persists the new [`Node`], and returns its credentials
/// (§4.I Create).
pub struct CreateService {
    cache: Arc<dyn TokenCache>,
    certs: Arc<dyn ClientCertificateRepository>,
    nodes: Arc<dyn NodeRepository>,
    cert_service: Arc<CertificateService>,
    files: Arc<dyn FileStore>,
}

impl CreateService {
    #[must_use]
    pub fn new(
        cache: Arc<dyn TokenCache>,
        certs: Arc<dyn ClientCertificateRepository>,
        nodes: Arc<dyn NodeRepository>,
        cert_service: Arc<CertificateService>,
        files: Arc<dyn FileStore>,
    ) -> Self {
        Self {
            cache,
            certs,
            nodes,
            cert_service,
            files,
        }
    }

    pub async fn create(&self, request: CreateRequest) -> Result<CreateResponse, EnrollError> {
        validate(&request)?;
        self.consume_create_token(&request.token).await?;

        let csr_pem = String::from_utf8(request.csr_pem.clone())
            .map_err(|_| EnrollError::Validation("gdaemon_server_cert is not valid UTF-8 PEM".into()))?;
        let signed_pem = self
            .cert_service
            .sign(&csr_pem, &SubjectOverrides::default())
            .await?;

        let api_key = random_base62(API_KEY_LEN);
        let client_certificate_id = self.resolve_client_certificate().await?;

        let server_cert_path = format!("nodes/pending/{}.crt", random_base62(16));
        self.files.write(&server_cert_path, signed_pem.as_bytes()).await?;

        let node = Node {
            id: 0,
            enabled: true,
            name: request.name.unwrap_or_else(|| "gameap-node".to_string()),
            os: request.os,
            location: DEFAULT_LOCATION.to_string(),
            provider: request.provider.unwrap_or_default(),
            addresses: request.addresses,
            ram: None,
            cpu: None,
            work_path: DEFAULT_WORK_PATH.to_string(),
            steamcmd_path: None,
            gdaemon_host: String::new(),
            gdaemon_port: request.port.unwrap_or(Node::DEFAULT_PORT),
            gdaemon_api_key: api_key.clone(),
            gdaemon_login: None,
            gdaemon_password: None,
            gdaemon_server_cert_path: server_cert_path,
            client_certificate_id,
            preferred_install_method: InstallMethod::Auto,
            scripts: ScriptOverrides::default(),
            created_at: 0,
            updated_at: 0,
            deleted_at: None,
        };
        let node = backfill_host(node);
        let node = self.nodes.insert(node).await?;

        let root_pem = self.cert_service.root().await?;
        let body = format!("Success {} {}\n{}\n\n{}", node.id, api_key, root_pem, signed_pem);

        info!(node_id = node.id, "enrolled new node");
        Ok(CreateResponse {
            body,
            node_id: node.id,
            api_key,
        })
    }

    /// Atomically consumes the cached create token, returning
    /// [`EnrollError::InvalidCreateToken`] if it is absent or doesn't match
    /// `token`. On a mismatch the cached value is restored so the cache is
    /// left unchanged for observers (§8 invariant 6 / S6).
    async fn consume_create_token(&self, token: &str) -> Result<(), EnrollError> {
        let Some(cached) = self.cache.take(CREATE_TOKEN_KEY).await else {
            return Err(EnrollError::InvalidCreateToken);
        };
        if cached != token {
            self.cache
                .set(CREATE_TOKEN_KEY, cached, CREATE_TOKEN_TTL)
                .await;
            return Err(EnrollError::InvalidCreateToken);
        }
        Ok(())
    }

    /// Reuses the lowest-ID client certificate if one exists; otherwise
    /// mints and persists a fresh one (§4.I Create).
    async fn resolve_client_certificate(&self) -> Result<core::ClientCertificateId, EnrollError> {
        if let Some(existing) = self.certs.first_by_id_order().await? {
            return Ok(existing.id);
        }

        let suffix = random_base62(16);
        let cert_path = format!("certs/client/{suffix}.crt");
        let key_path = format!("certs/client/{suffix}.key");
        let generated = self
            .cert_service
            .generate(&cert_path, &key_path, &SubjectOverrides::default())
            .await?;
        let fingerprint = ca::fingerprint_display(&generated.cert_pem)?;

        let inserted = self
            .certs
            .insert(ClientCertificate {
                id: 0,
                fingerprint,
                expires_at: 0,
                cert_path,
                key_path,
                passphrase: None,
            })
            .await?;
        Ok(inserted.id)
    }
}

fn validate(request: &CreateRequest) -> Result<(), EnrollError> {
    if request.csr_pem.is_empty() {
        return Err(EnrollError::Validation(
            "gdaemon_server_cert file is required and must not be empty".into(),
        ));
    }
    if request.csr_pem.len() > MAX_CSR_BYTES {
        return Err(EnrollError::Validation(
            "gdaemon_server_cert exceeds the 10 MiB limit".into(),
        ));
    }
    if let Some(port) = request.port {
        if port == 0 {
            return Err(EnrollError::Validation("gdaemon_port must be in 1..=65535".into()));
        }
    }
    Ok(())
}

/// `gdaemon_host` mirrors the node's first configured address, matching
/// S5's expectation that the persisted node's host comes from `ip[]`.
fn backfill_host(mut node: Node) -> Node {
    if let Some(addr) = node.addresses.first() {
        node.gdaemon_host = addr.clone();
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core::{CoreError, InMemoryFileStore, InMemoryTokenCache};
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct FakeCertRepo {
        certs: Mutex<HashMap<i64, ClientCertificate>>,
        next_id: Mutex<i64>,
    }

    #[async_trait]
    impl ClientCertificateRepository for FakeCertRepo {
        async fn insert(&self, mut cert: ClientCertificate) -> Result<ClientCertificate, CoreError> {
            let mut next = self.next_id.lock().await;
            *next += 1;
            cert.id = *next;
            self.certs.lock().await.insert(cert.id, cert.clone());
            Ok(cert)
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<ClientCertificate>, CoreError> {
            Ok(self.certs.lock().await.get(&id).cloned())
        }

        async fn first_by_id_order(&self) -> Result<Option<ClientCertificate>, CoreError> {
            let certs = self.certs.lock().await;
            Ok(certs.values().min_by_key(|c| c.id).cloned())
        }

        async fn delete(&self, id: i64) -> Result<(), CoreError> {
            self.certs.lock().await.remove(&id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeNodeRepo {
        nodes: Mutex<HashMap<i64, Node>>,
        next_id: Mutex<i64>,
    }

    #[async_trait]
    impl NodeRepository for FakeNodeRepo {
        async fn insert(&self, mut node: Node) -> Result<Node, CoreError> {
            let mut next = self.next_id.lock().await;
            *next += 1;
            node.id = *next;
            self.nodes.lock().await.insert(node.id, node.clone());
            Ok(node)
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Node>, CoreError> {
            Ok(self.nodes.lock().await.get(&id).cloned())
        }

        async fn list(&self) -> Result<Vec<Node>, CoreError> {
            Ok(self.nodes.lock().await.values().cloned().collect())
        }

        async fn soft_delete(&self, id: i64, deleted_at: i64) -> Result<(), CoreError> {
            if let Some(node) = self.nodes.lock().await.get_mut(&id) {
                node.deleted_at = Some(deleted_at);
            }
            Ok(())
        }
    }

    fn sample_csr() -> Vec<u8> {
        use rcgen::{CertificateParams, DnType, KeyPair};
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params.distinguished_name.push(DnType::CommonName, "example");
        params
            .serialize_request(&key)
            .unwrap()
            .pem()
            .unwrap()
            .into_bytes()
    }

    async fn service() -> (CreateService, Arc<InMemoryTokenCache>) {
        let cache = Arc::new(InMemoryTokenCache::new());
        cache
            .set(CREATE_TOKEN_KEY, "test-token".into(), Duration::from_secs(60))
            .await;
        let certs = Arc::new(FakeCertRepo::default());
        let nodes = Arc::new(FakeNodeRepo::default());
        let files = Arc::new(InMemoryFileStore::default());
        let cert_service = Arc::new(CertificateService::new(files.clone()));
        let svc = CreateService::new(cache.clone(), certs, nodes, cert_service, files);
        (svc, cache)
    }

    #[tokio::test]
    async fn happy_path_mints_a_node_and_consumes_the_token() {
        let (svc, cache) = service().await;
        let response = svc
            .create(CreateRequest {
                token: "test-token".into(),
                csr_pem: sample_csr(),
                addresses: vec!["10.0.0.1".into()],
                port: Some(9000),
                os: OsTag::Linux,
                name: None,
                provider: None,
            })
            .await
            .unwrap();

        assert!(response.body.starts_with(&format!("Success {} ", response.node_id)));
        assert_eq!(response.api_key.len(), 64);
        assert!(response.body.contains("BEGIN CERTIFICATE"));
        assert_eq!(cache.get(CREATE_TOKEN_KEY).await, None);
    }

    #[tokio::test]
    async fn wrong_token_is_rejected_and_cache_is_unchanged() {
        let (svc, cache) = service().await;
        let err = svc
            .create(CreateRequest {
                token: "wrong".into(),
                csr_pem: sample_csr(),
                addresses: vec!["10.0.0.1".into()],
                port: None,
                os: OsTag::Linux,
                name: None,
                provider: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EnrollError::InvalidCreateToken));
        assert_eq!(cache.get(CREATE_TOKEN_KEY).await.as_deref(), Some("test-token"));
    }

    #[tokio::test]
    async fn second_create_with_same_token_fails() {
        let (svc, _cache) = service().await;
        let request = || CreateRequest {
            token: "test-token".into(),
            csr_pem: sample_csr(),
            addresses: vec!["10.0.0.1".into()],
            port: None,
            os: OsTag::Linux,
            name: None,
            provider: None,
        };
        svc.create(request()).await.unwrap();
        let err = svc.create(request()).await.unwrap_err();
        assert!(matches!(err, EnrollError::InvalidCreateToken));
    }

    #[tokio::test]
    async fn empty_csr_is_a_validation_error() {
        let (svc, _cache) = service().await;
        let err = svc
            .create(CreateRequest {
                token: "test-token".into(),
                csr_pem: Vec::new(),
                addresses: vec!["10.0.0.1".into()],
                port: None,
                os: OsTag::Linux,
                name: None,
                provider: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EnrollError::Validation(_)));
    }

    #[tokio::test]
    async fn zero_port_is_a_validation_error() {
        let (svc, _cache) = service().await;
        let err = svc
            .create(CreateRequest {
                token: "test-token".into(),
                csr_pem: sample_csr(),
                addresses: vec!["10.0.0.1".into()],
                port: Some(0),
                os: OsTag::Linux,
                name: None,
                provider: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EnrollError::Validation(_)));
    }
}
