//! Shard format, normalization, matching and ranking for Doxygen search indexes.
//!
//! Everything here is synchronous and works on already-loaded data; fetching
//! and caching live in [`crate::source`] and [`crate::store`].

// Module declarations
pub(crate) mod index;
pub(crate) mod literal;
pub(crate) mod matcher;
pub(crate) mod scoring;
pub(crate) mod sections;
pub(crate) mod tokenize;

// Public re-exports (used via lib.rs)
pub use index::{IndexEntry, Shard, ShardId, Target};
pub use matcher::match_shard;
pub use scoring::{MatchKind, aggregate};
pub use sections::{IndexSection, Manifest, ManifestError};
pub use tokenize::{decode_key, encode_key, normalize_query};

// Internal re-exports
pub(crate) use tokenize::bucket_char;
