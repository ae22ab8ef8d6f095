//! Error handling types and utilities.

use crate::search::ShardId;
use std::path::PathBuf;

/// A specialized Result type for startup and CLI glue.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods throughout the binary.
pub type Result<T> = anyhow::Result<T>;

/// Errors raised while reading the static search index.
///
/// None of these reach a caller of [`SearchIndex::search`](crate::SearchIndex::search):
/// shard-level failures degrade to an empty shard and entry-level failures skip
/// the entry. Only [`IndexError::Manifest`] is fatal, and only when opening an index.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IndexError {
    /// A shard could not be fetched or parsed.
    #[error("shard {shard} unavailable: {reason}")]
    IndexUnavailable {
        shard: ShardId,
        reason: String,
        /// Whether retrying the same fetch could succeed.
        transient: bool,
    },

    /// An entry inside an otherwise readable shard has the wrong shape.
    #[error("malformed entry #{index} in shard {shard}: {reason}")]
    MalformedEntry {
        shard: ShardId,
        index: usize,
        reason: String,
    },

    /// The manifest (`searchdata.js`) is missing or unreadable.
    #[error("search manifest at {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    /// A section name that the manifest does not declare.
    #[error("unknown index section '{0}'")]
    UnknownSection(String),
}

impl IndexError {
    /// Build an `IndexUnavailable` that will be cached as an empty shard.
    pub fn unavailable(shard: ShardId, reason: impl Into<String>) -> Self {
        Self::IndexUnavailable {
            shard,
            reason: reason.into(),
            transient: false,
        }
    }

    /// Build an `IndexUnavailable` that a later lookup may retry.
    pub fn transient(shard: ShardId, reason: impl Into<String>) -> Self {
        Self::IndexUnavailable {
            shard,
            reason: reason.into(),
            transient: true,
        }
    }

    /// Returns true if the failure should not be remembered by the shard cache.
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::IndexUnavailable {
                transient: true,
                ..
            }
        )
    }
}
