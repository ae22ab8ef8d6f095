//! The shard cache shared by every query against one index.
//!
//! Shards are fetched on first use and kept for the lifetime of the cache.
//! Nothing is evicted or replaced, so readers only contend on insertion.
//! Concurrent requests for a shard that is still being fetched await the same
//! shared future instead of fetching it again.

use crate::error::IndexError;
use crate::search::{Shard, ShardId};
use crate::source::ShardSource;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Duration;

/// Type alias for shared shard fetch futures.
type SharedShardFuture = Shared<BoxFuture<'static, Result<Arc<Shard>, IndexError>>>;

/// Append-only cache of loaded shards.
pub struct ShardCache {
    source: Arc<dyn ShardSource>,

    /// Loaded shards, including empty stand-ins for permanently unavailable ones
    shards: RwLock<HashMap<ShardId, Arc<Shard>>>,

    /// In-flight fetches (can be awaited by multiple callers)
    in_flight: Mutex<HashMap<ShardId, SharedShardFuture>>,

    /// Upper bound on a single fetch
    fetch_timeout: Option<Duration>,

    /// Number of fetches started against the source
    fetches: AtomicUsize,
}

impl std::fmt::Debug for ShardCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardCache")
            .field("source", &self.source.describe())
            .field("fetch_timeout", &self.fetch_timeout)
            .field("fetches", &self.fetches.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl ShardCache {
    pub fn new(source: Arc<dyn ShardSource>, fetch_timeout: Option<Duration>) -> Self {
        Self {
            source,
            shards: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            fetch_timeout,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn source(&self) -> &Arc<dyn ShardSource> {
        &self.source
    }

    /// Get a shard, fetching it if needed.
    ///
    /// Never fails: an unavailable shard comes back empty. Permanent failures
    /// are remembered; transient ones (timeouts, I/O errors) are retried on the
    /// next request.
    pub async fn load(&self, id: &ShardId) -> Arc<Shard> {
        if let Some(shard) = self.shards.read().await.get(id) {
            tracing::trace!("Cache hit for shard {}", id);
            return Arc::clone(shard);
        }

        let future = {
            let mut in_flight = self.in_flight.lock().await;

            // A fetch may have completed between the read above and taking the lock
            if let Some(shard) = self.shards.read().await.get(id) {
                return Arc::clone(shard);
            }

            if let Some(future) = in_flight.get(id) {
                tracing::debug!("Awaiting in-flight fetch for shard {}", id);
                future.clone()
            } else {
                let future = self.start_fetch(id.clone());
                in_flight.insert(id.clone(), future.clone());
                future
            }
        };

        let result = future.await;

        let shard = match result {
            Ok(shard) => self.insert(id, shard).await,
            Err(e) if e.is_transient() => {
                tracing::warn!("{}; continuing without it", e);
                Arc::new(Shard::empty(id.clone()))
            }
            Err(e) => {
                tracing::warn!("{}; treating as empty", e);
                self.insert(id, Arc::new(Shard::empty(id.clone()))).await
            }
        };

        self.in_flight.lock().await.remove(id);
        shard
    }

    /// Insert unless another waiter already did; returns the cached instance.
    async fn insert(&self, id: &ShardId, shard: Arc<Shard>) -> Arc<Shard> {
        let mut shards = self.shards.write().await;
        Arc::clone(shards.entry(id.clone()).or_insert(shard))
    }

    fn start_fetch(&self, id: ShardId) -> SharedShardFuture {
        let source = Arc::clone(&self.source);
        let timeout = self.fetch_timeout;
        self.fetches.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Fetching shard {} from {}", id, source.describe());

        let fetch: BoxFuture<'static, Result<Arc<Shard>, IndexError>> = Box::pin(async move {
            let shard = match timeout {
                Some(limit) => tokio::time::timeout(limit, source.fetch(id.clone()))
                    .await
                    .map_err(|_| {
                        IndexError::transient(
                            id.clone(),
                            format!("fetch timed out after {:?}", limit),
                        )
                    })??,
                None => source.fetch(id.clone()).await?,
            };
            tracing::debug!("Loaded shard {} ({} entries)", id, shard.len());
            Ok(Arc::new(shard))
        });

        fetch.shared()
    }

    /// Check if a shard is cached.
    pub async fn is_cached(&self, id: &ShardId) -> bool {
        self.shards.read().await.contains_key(id)
    }

    /// Check if a fetch is in progress for a shard.
    pub async fn is_fetching(&self, id: &ShardId) -> bool {
        self.in_flight.lock().await.contains_key(id)
    }

    /// Ids of every cached shard, sorted.
    pub async fn cached_ids(&self) -> Vec<ShardId> {
        let mut ids: Vec<_> = self.shards.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of fetches issued to the source so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}
