//! `SearchIndex`: shard selection, loading and the one-shot query path.

use crate::error::IndexError;
use crate::search::{Manifest, Shard, ShardId, aggregate, bucket_char, match_shard, normalize_query};
use crate::source::ShardSource;
use crate::store::ShardCache;
use crate::types::DisplayResult;
use std::sync::Arc;
use tokio::time::Duration;

/// Options fixed when an index is opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOptions {
    /// Upper bound on a single shard fetch; `None` waits indefinitely.
    pub fetch_timeout: Option<Duration>,
}

/// A read-only search index over one documentation build.
///
/// Owns its shard cache: shards fetched through one `SearchIndex` stay loaded
/// until it is dropped, and nothing is shared with other instances.
#[derive(Debug)]
pub struct SearchIndex {
    manifest: Manifest,
    shards: ShardCache,
}

impl SearchIndex {
    /// Read the manifest and prepare an empty shard cache.
    pub async fn open(source: impl ShardSource, options: IndexOptions) -> Result<Self, IndexError> {
        Self::open_shared(Arc::new(source), options).await
    }

    /// Like [`SearchIndex::open`] for a source the caller keeps a handle to.
    pub async fn open_shared(
        source: Arc<dyn ShardSource>,
        options: IndexOptions,
    ) -> Result<Self, IndexError> {
        let manifest = source.manifest().await?;
        tracing::info!(
            "Opened search index {} ({} sections)",
            source.describe(),
            manifest.sections().len()
        );

        Ok(Self {
            manifest,
            shards: ShardCache::new(source, options.fetch_timeout),
        })
    }

    pub const fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub const fn cache(&self) -> &ShardCache {
        &self.shards
    }

    /// Fail with `UnknownSection` for the first name the manifest does not declare.
    pub fn check_sections<S: AsRef<str>>(&self, sections: &[S]) -> Result<(), IndexError> {
        match sections
            .iter()
            .find(|name| self.manifest.section(name.as_ref()).is_none())
        {
            Some(name) => Err(IndexError::UnknownSection(name.as_ref().to_string())),
            None => Ok(()),
        }
    }

    /// Shards that can hold matches for an already-normalized query.
    ///
    /// Only the first character selects a bucket. The result follows the order
    /// of `sections`, without duplicates; unknown sections are skipped.
    pub fn resolve_shards<S: AsRef<str>>(&self, normalized: &str, sections: &[S]) -> Vec<ShardId> {
        let Some(first) = bucket_char(normalized) else {
            return Vec::new();
        };

        let mut ids: Vec<ShardId> = Vec::with_capacity(sections.len());
        for name in sections {
            let Some(section) = self.manifest.section(name.as_ref()) else {
                tracing::warn!("Ignoring unknown index section '{}'", name.as_ref());
                continue;
            };
            if let Some(id) = section.shard_for(first)
                && !ids.contains(&id)
            {
                ids.push(id);
            }
        }
        ids
    }

    /// Load one shard through the cache. Unavailable shards come back empty.
    pub async fn load_shard(&self, id: &ShardId) -> Arc<Shard> {
        self.shards.load(id).await
    }

    /// Run a query against the given sections.
    pub async fn search<S: AsRef<str>>(&self, raw: &str, sections: &[S]) -> Vec<DisplayResult> {
        self.search_normalized(&normalize_query(raw), sections)
            .await
    }

    /// Run a query whose text is already normalized.
    pub async fn search_normalized<S: AsRef<str>>(
        &self,
        normalized: &str,
        sections: &[S],
    ) -> Vec<DisplayResult> {
        if normalized.is_empty() {
            tracing::trace!("Empty query, nothing to load");
            return Vec::new();
        }

        let ids = self.resolve_shards(normalized, sections);
        let shards = futures::future::join_all(ids.iter().map(|id| self.load_shard(id))).await;

        let per_shard: Vec<_> = shards
            .iter()
            .map(|shard| match_shard(shard, normalized))
            .collect();
        let results = aggregate(normalized, &per_shard);

        tracing::debug!(
            "Query '{}' over {} shard(s): {} result(s)",
            normalized,
            ids.len(),
            results.len()
        );
        results
    }
}
