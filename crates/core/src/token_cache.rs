use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::error::CoreError;

/// One-shot, TTL-bearing cache backing the setup/create token handshake
/// (§4.I) and the `node-auto-setup-token` lookup.
///
/// The spec only requires `Get/Set/Delete/Clear(ctx, key, value, ttl?)`
/// semantics with correct behavior "under concurrent enrollment attempts"
/// (§9); [`InMemoryTokenCache`] satisfies that with an atomic
/// delete-on-read `take`, which is what both enrollment phases actually
/// need (a token is checked and consumed in one step, never peeked twice).
#[async_trait::async_trait]
pub trait TokenCache: Send + Sync {
    async fn set(&self, key: &str, value: String, ttl: Duration);
    async fn get(&self, key: &str) -> Option<String>;
    /// Atomically reads and removes the value, so two concurrent callers
    /// racing on the same key can never both observe it present.
    async fn take(&self, key: &str) -> Option<String>;
    async fn delete(&self, key: &str);
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// `dashmap`-backed [`TokenCache`], matching the teacher daemon's own use
/// of `dashmap` for shared session state (its `concurrent-sessions`
/// feature). Expired entries are swept lazily on access and by an optional
/// background task (see [`InMemoryTokenCache::spawn_sweeper`]); either is
/// sufficient for correctness since every read also checks expiry.
#[derive(Default)]
pub struct InMemoryTokenCache {
    entries: Arc<DashMap<String, Entry>>,
}

impl InMemoryTokenCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Spawns a background task that periodically drops expired entries,
    /// so a cache that is only ever written to (never read back, e.g. an
    /// abandoned setup token) doesn't grow unbounded. Purely a memory
    /// hygiene measure — correctness never depends on the sweeper running.
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let entries = Arc::clone(&self.entries);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let now = Instant::now();
                entries.retain(|_, entry| entry.expires_at > now);
            }
        })
    }
}

#[async_trait::async_trait]
impl TokenCache for InMemoryTokenCache {
    async fn set(&self, key: &str, value: String, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn get(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    async fn take(&self, key: &str) -> Option<String> {
        let (_, entry) = self.entries.remove(key)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        Some(entry.value)
    }

    async fn delete(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Helper mirroring the spec's "missing root/cert ⇒ not-found" convention,
/// reused by `enroll` when a required token is absent.
pub fn missing_token(name: &str) -> CoreError {
    CoreError::NotFound(format!("token '{name}'"))
}
