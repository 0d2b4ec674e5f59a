//! In-memory [`NodeRepository`]/[`ClientCertificateRepository`] stand-ins.
//!
//! The specification treats the relational schema and its ORM-style
//! repository as an external collaborator, out of scope for this core
//! (`spec.md` §1, §3). `corectl` still needs *something* behind those
//! traits to run end-to-end, so it ships these `Mutex<HashMap<_>>`-backed
//! implementations rather than a real database driver — swap them for a
//! `sqlx`/`diesel`-backed crate without touching `core`, `enroll`, or
//! `daemon-client`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use core::{ClientCertificate, ClientCertificateRepository, CoreError, Node, NodeId, NodeRepository};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct InMemoryNodeRepository {
    nodes: Mutex<HashMap<NodeId, Node>>,
    next_id: AtomicI64,
}

#[async_trait]
impl NodeRepository for InMemoryNodeRepository {
    async fn insert(&self, mut node: Node) -> Result<Node, CoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        node.id = id;
        self.nodes.lock().await.insert(id, node.clone());
        Ok(node)
    }

    async fn find_by_id(&self, id: NodeId) -> Result<Option<Node>, CoreError> {
        Ok(self.nodes.lock().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Node>, CoreError> {
        Ok(self.nodes.lock().await.values().cloned().collect())
    }

    async fn soft_delete(&self, id: NodeId, deleted_at: i64) -> Result<(), CoreError> {
        if let Some(node) = self.nodes.lock().await.get_mut(&id) {
            node.deleted_at = Some(deleted_at);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryClientCertificateRepository {
    certs: Mutex<HashMap<core::ClientCertificateId, ClientCertificate>>,
    next_id: AtomicI64,
}

#[async_trait]
impl ClientCertificateRepository for InMemoryClientCertificateRepository {
    async fn insert(&self, mut cert: ClientCertificate) -> Result<ClientCertificate, CoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        cert.id = id;
        self.certs.lock().await.insert(id, cert.clone());
        Ok(cert)
    }

    async fn find_by_id(&self, id: core::ClientCertificateId) -> Result<Option<ClientCertificate>, CoreError> {
        Ok(self.certs.lock().await.get(&id).cloned())
    }

    async fn first_by_id_order(&self) -> Result<Option<ClientCertificate>, CoreError> {
        let certs = self.certs.lock().await;
        Ok(certs.values().min_by_key(|c| c.id).cloned())
    }

    // Does not check for referencing nodes before removing the row — none
    // of the four HTTP routes this binary wires ever call delete, so the
    // spec's "reject delete while referenced" invariant has no exercised
    // path here. A real repository crate must still enforce it.
    async fn delete(&self, id: core::ClientCertificateId) -> Result<(), CoreError> {
        self.certs.lock().await.remove(&id);
        Ok(())
    }
}
