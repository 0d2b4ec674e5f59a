use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use core::NodeId;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::sync::{Mutex, RwLock, Semaphore};
use tracing::debug;

use crate::config::DialConfig;
use crate::dialer::{AuthenticatedStream, TlsDialer};
use crate::error::NetError;

/// Default idle timeout before a pooled connection is destroyed rather
/// than reused (§4.B/§4.C's shared "default timeout" of 10s).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

struct Idle {
    stream: AuthenticatedStream,
    last_used: Instant,
}

/// Bounded pool of authenticated connections for a single node, keyed
/// implicitly by whatever `(NodeId, Mode)` the owning [`PoolRegistry`] used
/// to create it (§4.C: "the current source collapses this by service
/// type rather than by mode — either is acceptable").
pub struct NodePool {
    dialer: TlsDialer,
    config: DialConfig,
    idle: Mutex<VecDeque<Idle>>,
    permits: Semaphore,
    idle_timeout: Duration,
}

impl NodePool {
    pub const MAX_SIZE: usize = 3;

    #[must_use]
    pub fn new(dialer: TlsDialer, config: DialConfig) -> Arc<Self> {
        Arc::new(Self {
            dialer,
            config,
            idle: Mutex::new(VecDeque::new()),
            permits: Semaphore::new(Self::MAX_SIZE),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        })
    }

    /// Acquires a connection, discarding and redialing idle connections
    /// that have sat unused past `idle_timeout`, looping until a fresh or
    /// recently-used connection is returned (§4.C Acquire).
    pub async fn acquire(self: &Arc<Self>) -> Result<PooledConnection, NetError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore is never closed");

        loop {
            let candidate = {
                let mut idle = self.idle.lock().await;
                idle.pop_front()
            };

            match candidate {
                Some(entry) if entry.last_used.elapsed() < self.idle_timeout => {
                    return Ok(PooledConnection {
                        pool: Arc::clone(self),
                        stream: Some(entry.stream),
                        discard: false,
                        _permit: permit,
                    });
                }
                Some(_expired) => {
                    debug!("dropping idle connection past timeout before reacquire");
                    continue;
                }
                None => {
                    let stream = self.dialer.dial(&self.config).await?;
                    return Ok(PooledConnection {
                        pool: Arc::clone(self),
                        stream: Some(stream),
                        discard: false,
                        _permit: permit,
                    });
                }
            }
        }
    }

    async fn release(&self, stream: AuthenticatedStream) {
        let mut idle = self.idle.lock().await;
        idle.push_back(Idle {
            stream,
            last_used: Instant::now(),
        });
    }

    /// Live authenticated + idle connections currently held by this pool.
    pub async fn idle_len(&self) -> usize {
        self.idle.lock().await.len()
    }
}

/// A thin wrapper around a checked-out [`AuthenticatedStream`] implementing
/// the socket interface callers need (`AsyncRead`/`AsyncWrite`); dropping it
/// releases the connection back to the pool rather than closing the
/// underlying socket, which is the pool's job (§4.C).
pub struct PooledConnection {
    pool: Arc<NodePool>,
    stream: Option<AuthenticatedStream>,
    discard: bool,
    _permit: tokio::sync::OwnedSemaphorePermit,
}

impl PooledConnection {
    /// Marks this connection so it is destroyed (log-and-swallow) instead
    /// of returned to the idle queue on drop; callers use this after an
    /// I/O error so a caller-side retry gets a fresh dial (§4.C Wrapper Write).
    pub fn mark_broken(&mut self) {
        self.discard = true;
    }

    /// Explicit release, equivalent to dropping the wrapper.
    pub fn close(mut self) {
        drop(self.stream.take());
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if self.discard {
            debug!("closing broken pooled connection instead of returning it");
            return;
        }
        if let Some(stream) = self.stream.take() {
            let pool = Arc::clone(&self.pool);
            tokio::spawn(async move {
                pool.release(stream).await;
            });
        }
    }
}

impl AsyncRead for PooledConnection {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let stream = self
            .stream
            .as_mut()
            .expect("poll called on a closed PooledConnection");
        Pin::new(stream).poll_read(cx, buf)
    }
}

impl AsyncWrite for PooledConnection {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        let stream = self
            .stream
            .as_mut()
            .expect("poll called on a closed PooledConnection");
        Pin::new(stream).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        let stream = self
            .stream
            .as_mut()
            .expect("poll called on a closed PooledConnection");
        Pin::new(stream).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        let stream = self
            .stream
            .as_mut()
            .expect("poll called on a closed PooledConnection");
        Pin::new(stream).poll_shutdown(cx)
    }
}

/// Process-wide `NodeId -> NodePool` map guarded by a reader-writer lock,
/// with double-checked insertion under the writer lock (§4.C).
#[derive(Default)]
pub struct PoolRegistry {
    pools: RwLock<HashMap<NodeId, Arc<NodePool>>>,
}

impl PoolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pools: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get_or_create(
        &self,
        node_id: NodeId,
        make: impl FnOnce() -> Arc<NodePool>,
    ) -> Arc<NodePool> {
        if let Some(pool) = self.pools.read().await.get(&node_id) {
            return Arc::clone(pool);
        }

        let mut pools = self.pools.write().await;
        if let Some(pool) = pools.get(&node_id) {
            return Arc::clone(pool);
        }
        let pool = make();
        pools.insert(node_id, Arc::clone(&pool));
        pool
    }

    pub async fn remove(&self, node_id: NodeId) {
        self.pools.write().await.remove(&node_id);
    }
}
