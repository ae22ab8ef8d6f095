//! Shared test fixtures and utilities for integration tests.
//!
//! Every test gets its own copy of `tests/fixtures/search` in a temporary
//! directory, so tests may delete or rewrite shard files freely. The fixture
//! declares three sections:
//!
//! - `all` with shards `all_f.js` (keys starting with `r`) and `all_11.js` (`t`)
//! - `classes` with `classes_2.js` (`r`) and `classes_3.js` (`t`)
//! - `namespaces`, which has no shard files at all

use doxysearch::{DirectorySource, IndexError, IndexOptions, Manifest, SearchIndex, Shard, ShardId, ShardSource};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Notify;

/// Returns the project root directory (where Cargo.toml lives).
pub fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// A temporary copy of the fixture search directory.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct FixtureDir {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl FixtureDir {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().join("search");
        std::fs::create_dir_all(&root).expect("Failed to create search directory");

        let fixtures = project_root().join("tests/fixtures/search");
        for entry in std::fs::read_dir(&fixtures).expect("Failed to read fixtures") {
            let entry = entry.expect("Failed to read fixture entry");
            std::fs::copy(entry.path(), root.join(entry.file_name()))
                .expect("Failed to copy fixture");
        }

        Self { _temp: temp, root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn source(&self) -> DirectorySource {
        DirectorySource::new(&self.root)
    }

    pub fn remove_file(&self, name: &str) {
        std::fs::remove_file(self.root.join(name))
            .unwrap_or_else(|e| panic!("Failed to remove {}: {}", name, e));
    }

    pub fn write_file(&self, name: &str, content: &str) {
        std::fs::write(self.root.join(name), content)
            .unwrap_or_else(|e| panic!("Failed to write {}: {}", name, e));
    }

    /// Open an index over this directory with default options.
    pub async fn open(&self) -> SearchIndex {
        SearchIndex::open(self.source(), IndexOptions::default())
            .await
            .expect("Failed to open fixture index")
    }
}

/// Source that holds back fetches of one shard until released.
#[allow(dead_code)]
pub struct GatedSource {
    inner: DirectorySource,
    gated: ShardId,
    /// Signalled when the gated fetch has started
    pub started: Arc<Notify>,
    /// Notify once to let the gated fetch finish
    pub release: Arc<Notify>,
}

#[allow(dead_code)]
impl GatedSource {
    pub fn new(inner: DirectorySource, gated: ShardId) -> Self {
        Self {
            inner,
            gated,
            started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

impl ShardSource for GatedSource {
    fn manifest(&self) -> BoxFuture<'_, Result<Manifest, IndexError>> {
        self.inner.manifest()
    }

    fn fetch(&self, id: ShardId) -> BoxFuture<'_, Result<Shard, IndexError>> {
        async move {
            if id == self.gated {
                self.started.notify_one();
                self.release.notified().await;
            }
            self.inner.fetch(id).await
        }
        .boxed()
    }

    fn describe(&self) -> String {
        format!("gated {}", self.inner.describe())
    }
}
