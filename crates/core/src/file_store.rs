use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::CoreError;

/// Abstraction over the blob storage backing certificate PEMs and
/// operator-supplied daemon server-cert paths (§6, "Persisted state").
///
/// Deliberately not tied to the local filesystem: the spec notes the
/// backing store "is not necessarily the local filesystem". Two
/// implementations are provided; real deployments may swap in an
/// object-storage-backed one without touching `ca`, `enroll` or `bundle`.
#[async_trait::async_trait]
pub trait FileStore: Send + Sync {
    async fn read(&self, path: &str) -> Result<Vec<u8>, CoreError>;
    async fn write(&self, path: &str, bytes: &[u8]) -> Result<(), CoreError>;

    /// Best-effort remove. The specification's open question on orphaned
    /// certificate files (§9) says deletion failures are logged and
    /// tolerated rather than propagated, so this returns `()` and logs
    /// internally instead of surfacing an error to callers.
    async fn remove(&self, path: &str);

    async fn exists(&self, path: &str) -> bool;
}

/// Local-disk [`FileStore`] rooted at a base directory, matching the
/// relative paths the spec uses (`certs/root.crt`, `certs/client/*.crt`).
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait::async_trait]
impl FileStore for LocalFileStore {
    async fn read(&self, path: &str) -> Result<Vec<u8>, CoreError> {
        let full = self.resolve(path);
        tokio::fs::read(&full).await.map_err(CoreError::internal)
    }

    async fn write(&self, path: &str, bytes: &[u8]) -> Result<(), CoreError> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(CoreError::internal)?;
        }
        tokio::fs::write(&full, bytes)
            .await
            .map_err(CoreError::internal)
    }

    async fn remove(&self, path: &str) {
        let full = self.resolve(path);
        if let Err(err) = tokio::fs::remove_file(&full).await {
            tracing::warn!(path = %full.display(), error = %err, "best-effort blob removal failed, tolerating orphan");
        }
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::metadata(self.resolve(path)).await.is_ok()
    }
}

/// In-memory [`FileStore`] used by tests and by the mock-daemon harness in
/// `test-support`, so certificate-service and enrollment tests don't touch
/// the real filesystem.
#[derive(Default)]
pub struct InMemoryFileStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryFileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl FileStore for InMemoryFileStore {
    async fn read(&self, path: &str) -> Result<Vec<u8>, CoreError> {
        self.blobs
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("blob '{path}'")))
    }

    async fn write(&self, path: &str, bytes: &[u8]) -> Result<(), CoreError> {
        self.blobs
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn remove(&self, path: &str) {
        self.blobs.lock().unwrap().remove(path);
    }

    async fn exists(&self, path: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(path)
    }
}

/// Convenience used by tests that want a path joined without touching disk.
#[must_use]
pub fn join(base: &str, leaf: &str) -> String {
    Path::new(base).join(leaf).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_store_round_trips() {
        let store = InMemoryFileStore::new();
        store.write("certs/root.crt", b"hello").await.unwrap();
        assert!(store.exists("certs/root.crt").await);
        assert_eq!(store.read("certs/root.crt").await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn in_memory_store_missing_blob_is_not_found() {
        let store = InMemoryFileStore::new();
        let err = store.read("nope").await.unwrap_err();
        assert_eq!(err.kind(), crate::error::CoreErrorKind::NotFound);
    }

    #[tokio::test]
    async fn local_store_writes_and_reads_nested_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        store.write("certs/client/1.crt", b"pem-bytes").await.unwrap();
        assert_eq!(
            store.read("certs/client/1.crt").await.unwrap(),
            b"pem-bytes"
        );
    }
}
