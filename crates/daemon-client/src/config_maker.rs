use std::sync::Arc;

use core::{ClientCertificateRepository, CoreError, FileStore, Node};
use net::{validate_server_cert_pem, DialConfig};
use wire::Mode;

/// Builds a [`DialConfig`] for a Node and a desired protocol mode (§4.D).
///
/// Reads the daemon's server certificate and the node's client certificate
/// material through the [`FileStore`]/[`ClientCertificateRepository`]
/// traits rather than touching the filesystem directly, so the control
/// plane never assumes local-disk storage for certificate blobs (§3).
pub struct ConfigMaker {
    files: Arc<dyn FileStore>,
    certs: Arc<dyn ClientCertificateRepository>,
}

impl ConfigMaker {
    #[must_use]
    pub fn new(files: Arc<dyn FileStore>, certs: Arc<dyn ClientCertificateRepository>) -> Self {
        Self { files, certs }
    }

    pub async fn build(&self, node: &Node, mode: Mode) -> Result<DialConfig, CoreError> {
        let host = node
            .primary_address()
            .ok_or_else(|| CoreError::Validation(format!("node {} has no addresses", node.id)))?
            .to_string();

        let server_cert_pem = self.files.read(&node.gdaemon_server_cert_path).await?;
        validate_server_cert_pem(&server_cert_pem).map_err(|err| {
            CoreError::Validation(format!(
                "node {} server certificate at {} is invalid: {err}",
                node.id, node.gdaemon_server_cert_path
            ))
        })?;

        let cert = self
            .certs
            .find_by_id(node.client_certificate_id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound(format!(
                    "client certificate {} for node {}",
                    node.client_certificate_id, node.id
                ))
            })?;

        let client_cert_pem = self.files.read(&cert.cert_path).await?;
        let key_pem = self.files.read(&cert.key_path).await?;

        Ok(DialConfig {
            host,
            port: node.gdaemon_port,
            username: node.gdaemon_login.clone().unwrap_or_default(),
            password: node.gdaemon_password.clone().unwrap_or_default(),
            server_cert_pem,
            client_cert_pem,
            key_pem,
            timeout: DialConfig::DEFAULT_TIMEOUT,
            mode,
            pinned_fingerprint: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core::{ClientCertificate, InMemoryFileStore, InstallMethod, OsTag, ScriptOverrides};
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    struct FakeCertRepo {
        certs: Mutex<HashMap<i64, ClientCertificate>>,
    }

    #[async_trait]
    impl ClientCertificateRepository for FakeCertRepo {
        async fn insert(&self, cert: ClientCertificate) -> Result<ClientCertificate, CoreError> {
            self.certs.lock().await.insert(cert.id, cert.clone());
            Ok(cert)
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<ClientCertificate>, CoreError> {
            Ok(self.certs.lock().await.get(&id).cloned())
        }

        async fn first_by_id_order(&self) -> Result<Option<ClientCertificate>, CoreError> {
            Ok(self.certs.lock().await.values().next().cloned())
        }

        async fn delete(&self, id: i64) -> Result<(), CoreError> {
            self.certs.lock().await.remove(&id);
            Ok(())
        }
    }

    fn sample_node() -> Node {
        Node {
            id: 1,
            enabled: true,
            name: "node-1".into(),
            os: OsTag::Linux,
            location: "eu".into(),
            provider: "hetzner".into(),
            addresses: vec!["10.0.0.5".into()],
            ram: None,
            cpu: None,
            work_path: "/srv/gameap".into(),
            steamcmd_path: None,
            gdaemon_host: "10.0.0.5".into(),
            gdaemon_port: Node::DEFAULT_PORT,
            gdaemon_api_key: "key".into(),
            gdaemon_login: Some("gameap".into()),
            gdaemon_password: Some("secret".into()),
            gdaemon_server_cert_path: "nodes/1/server.crt".into(),
            client_certificate_id: 1,
            preferred_install_method: InstallMethod::Auto,
            scripts: ScriptOverrides::default(),
            created_at: 0,
            updated_at: 0,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn builds_dial_config_from_node_and_cert() {
        let files = Arc::new(InMemoryFileStore::default());
        files.write("nodes/1/server.crt", b"server-pem").await.unwrap();
        files.write("certs/1.crt", b"client-pem").await.unwrap();
        files.write("certs/1.key", b"key-pem").await.unwrap();

        let certs = Arc::new(FakeCertRepo {
            certs: Mutex::new(HashMap::from([(
                1,
                ClientCertificate {
                    id: 1,
                    fingerprint: "AA".into(),
                    expires_at: 0,
                    cert_path: "certs/1.crt".into(),
                    key_path: "certs/1.key".into(),
                    passphrase: None,
                },
            )])),
        });

        let maker = ConfigMaker::new(files, certs);
        let config = maker.build(&sample_node(), Mode::Status).await.unwrap();

        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, Node::DEFAULT_PORT);
        assert_eq!(config.server_cert_pem, b"server-pem");
        assert_eq!(config.client_cert_pem, b"client-pem");
        assert_eq!(config.key_pem, b"key-pem");
        assert_eq!(config.mode, Mode::Status);
    }

    #[tokio::test]
    async fn missing_client_certificate_is_not_found() {
        let files = Arc::new(InMemoryFileStore::default());
        files.write("nodes/1/server.crt", b"server-pem").await.unwrap();
        let certs = Arc::new(FakeCertRepo {
            certs: Mutex::new(HashMap::new()),
        });

        let maker = ConfigMaker::new(files, certs);
        let err = maker.build(&sample_node(), Mode::Status).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn node_without_addresses_fails_validation() {
        let files = Arc::new(InMemoryFileStore::default());
        let certs = Arc::new(FakeCertRepo {
            certs: Mutex::new(HashMap::new()),
        });
        let mut node = sample_node();
        node.addresses.clear();

        let maker = ConfigMaker::new(files, certs);
        let err = maker.build(&node, Mode::Status).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
