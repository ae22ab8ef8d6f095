//! Where shards come from: a Doxygen `search/` directory or an in-memory arena.

use crate::error::IndexError;
use crate::search::{IndexEntry, IndexSection, Manifest, Shard, ShardId, bucket_char};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File name of the manifest inside a search directory.
pub const MANIFEST_FILE: &str = "searchdata.js";

/// A read-only provider of the manifest and of individual shards.
pub trait ShardSource: Send + Sync + 'static {
    /// Read the manifest describing sections and their buckets.
    fn manifest(&self) -> BoxFuture<'_, Result<Manifest, IndexError>>;

    /// Fetch and parse one shard.
    fn fetch(&self, id: ShardId) -> BoxFuture<'_, Result<Shard, IndexError>>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Reads shards from the `search/` directory of generated HTML documentation.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn shard_path(&self, id: &ShardId) -> PathBuf {
        self.root.join(id.file_name())
    }

    async fn read_manifest(&self) -> Result<Manifest, IndexError> {
        let path = self.root.join(MANIFEST_FILE);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| IndexError::Manifest {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let manifest = Manifest::parse(&content).map_err(|e| IndexError::Manifest {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!(
            "Loaded manifest {} ({} sections)",
            path.display(),
            manifest.sections().len()
        );
        Ok(manifest)
    }

    async fn read_shard(&self, id: ShardId) -> Result<Shard, IndexError> {
        let path = self.shard_path(&id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IndexError::unavailable(
                    id,
                    format!("{} not found", path.display()),
                ));
            }
            Err(e) => {
                return Err(IndexError::transient(
                    id,
                    format!("failed to read {}: {}", path.display(), e),
                ));
            }
        };

        // Parse in spawn_blocking since large shards are CPU bound
        let shard_id = id.clone();
        tokio::task::spawn_blocking(move || Shard::parse(shard_id, &content))
            .await
            .map_err(|e| IndexError::transient(id, format!("parse task failed: {}", e)))?
    }
}

impl ShardSource for DirectorySource {
    fn manifest(&self) -> BoxFuture<'_, Result<Manifest, IndexError>> {
        self.read_manifest().boxed()
    }

    fn fetch(&self, id: ShardId) -> BoxFuture<'_, Result<Shard, IndexError>> {
        self.read_shard(id).boxed()
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// An arena of prebuilt shards indexed by `ShardId`.
///
/// Built with [`MemorySource::builder`], which assigns entries to buckets with
/// the same first-character function the file-based index uses.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    manifest: Manifest,
    shards: HashMap<ShardId, Shard>,
}

impl MemorySource {
    pub fn builder() -> MemorySourceBuilder {
        MemorySourceBuilder::default()
    }

    /// Drop a shard from the arena, so fetching it fails as unavailable.
    pub fn without_shard(mut self, id: &ShardId) -> Self {
        self.shards.remove(id);
        self
    }

    pub fn shard_ids(&self) -> impl Iterator<Item = &ShardId> {
        self.shards.keys()
    }
}

impl ShardSource for MemorySource {
    fn manifest(&self) -> BoxFuture<'_, Result<Manifest, IndexError>> {
        futures::future::ready(Ok(self.manifest.clone())).boxed()
    }

    fn fetch(&self, id: ShardId) -> BoxFuture<'_, Result<Shard, IndexError>> {
        let result = self
            .shards
            .get(&id)
            .cloned()
            .ok_or_else(|| IndexError::unavailable(id, "not present in arena"));
        futures::future::ready(result).boxed()
    }

    fn describe(&self) -> String {
        format!("memory ({} shards)", self.shards.len())
    }
}

/// Accumulates sections of entries for a [`MemorySource`].
#[derive(Debug, Default)]
pub struct MemorySourceBuilder {
    sections: Vec<(String, String, Vec<IndexEntry>)>,
}

impl MemorySourceBuilder {
    /// Add a section; entries keep their order within each bucket.
    pub fn section(
        mut self,
        name: impl Into<String>,
        label: impl Into<String>,
        entries: impl IntoIterator<Item = IndexEntry>,
    ) -> Self {
        self.sections
            .push((name.into(), label.into(), entries.into_iter().collect()));
        self
    }

    pub fn build(self) -> MemorySource {
        let mut sections = Vec::with_capacity(self.sections.len());
        let mut shards = HashMap::new();

        for (number, (name, label, entries)) in self.sections.into_iter().enumerate() {
            let mut characters: Vec<char> = entries
                .iter()
                .filter(|e| !e.targets.is_empty())
                .filter_map(|e| bucket_char(&e.key))
                .collect();
            characters.sort_unstable();
            characters.dedup();

            let section = IndexSection::new(
                u32::try_from(number).unwrap_or(u32::MAX),
                name,
                label,
                characters,
            );

            let mut buckets: HashMap<ShardId, Vec<IndexEntry>> = HashMap::new();
            for entry in entries {
                if entry.targets.is_empty() {
                    tracing::warn!("Dropping entry '{}' with no targets", entry.key);
                    continue;
                }
                if let Some(id) = bucket_char(&entry.key).and_then(|c| section.shard_for(c)) {
                    buckets.entry(id).or_default().push(entry);
                }
            }
            shards.extend(
                buckets
                    .into_iter()
                    .map(|(id, entries)| (id.clone(), Shard::new(id, entries))),
            );
            sections.push(section);
        }

        MemorySource {
            manifest: Manifest::new(sections),
            shards,
        }
    }
}
