//! Index entries, shards, and the shard file reader.

use super::literal::{Literal, parse_script};
use super::tokenize::{decode_entities, decode_key, split_entry_id};
use crate::error::IndexError;
use serde::Serialize;
use std::fmt;

/// Identifies one shard: an index section plus the bucket inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShardId {
    section: String,
    bucket: u32,
}

impl ShardId {
    pub fn new(section: impl Into<String>, bucket: u32) -> Self {
        Self {
            section: section.into(),
            bucket,
        }
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub const fn bucket(&self) -> u32 {
        self.bucket
    }

    /// File name the index builder uses for this shard, e.g. `all_11.js`.
    pub fn file_name(&self) -> String {
        format!("{}.js", self)
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{:x}", self.section, self.bucket)
    }
}

/// One documentation location an entry resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Target {
    /// Anchor URL relative to the search directory.
    pub anchor_url: String,
    /// Enclosing scope or page; empty for global scope.
    pub scope_label: String,
    /// True when the anchor points into documentation imported from a tag file.
    pub external: bool,
}

impl Target {
    pub fn new(anchor_url: impl Into<String>, scope_label: impl Into<String>) -> Self {
        Self {
            anchor_url: anchor_url.into(),
            scope_label: scope_label.into(),
            external: false,
        }
    }
}

/// The atomic unit of the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    /// Normalized search key.
    pub key: String,
    /// Label shown to the user.
    pub display_label: String,
    /// Never empty.
    pub targets: Vec<Target>,
    /// Build-time sequence number from the entry id.
    pub ordinal: u32,
}

/// An immutable, build-ordered run of entries for one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    id: ShardId,
    entries: Vec<IndexEntry>,
}

impl Shard {
    pub const fn new(id: ShardId, entries: Vec<IndexEntry>) -> Self {
        Self { id, entries }
    }

    /// The stand-in for a shard that failed to load.
    pub const fn empty(id: ShardId) -> Self {
        Self::new(id, Vec::new())
    }

    pub const fn id(&self) -> &ShardId {
        &self.id
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses a shard file (`var searchData=[...];`).
    ///
    /// A file that is not a search data array fails as `IndexUnavailable`.
    /// Individual entries with the wrong shape are logged and skipped.
    pub fn parse(id: ShardId, src: &str) -> Result<Self, IndexError> {
        let declarations =
            parse_script(src).map_err(|e| IndexError::unavailable(id.clone(), e.to_string()))?;

        let (_, data) = declarations
            .iter()
            .find(|(name, _)| name == "searchData")
            .ok_or_else(|| IndexError::unavailable(id.clone(), "no searchData declaration"))?;

        let items = data.as_array().ok_or_else(|| {
            IndexError::unavailable(
                id.clone(),
                format!("searchData is {}, expected array", data.kind()),
            )
        })?;

        let mut entries = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match parse_entry(item, index) {
                Ok(entry) => entries.push(entry),
                Err(reason) => {
                    let err = IndexError::MalformedEntry {
                        shard: id.clone(),
                        index,
                        reason,
                    };
                    tracing::warn!("Skipping entry: {}", err);
                }
            }
        }

        tracing::trace!("Parsed shard {} ({} entries)", id, entries.len());
        Ok(Self::new(id, entries))
    }
}

/// `['<id>', ['<label>', ['<url>', <flag>, '<scope>'], ...]]`
///
/// Ids without an ordinal suffix fall back to the entry's position in the shard.
fn parse_entry(item: &Literal, position: usize) -> Result<IndexEntry, String> {
    let fields = item
        .as_array()
        .ok_or_else(|| format!("expected array, found {}", item.kind()))?;
    let [id, body] = fields else {
        return Err(format!("expected [id, body], found {} fields", fields.len()));
    };

    let id = id.as_str().ok_or("entry id is not a string")?;
    let (escaped, ordinal) = split_entry_id(id)
        .unwrap_or_else(|| (id, u32::try_from(position).unwrap_or(u32::MAX)));
    let key = decode_key(escaped);
    if key.is_empty() {
        return Err(format!("entry id '{}' has an empty key", id));
    }

    let body = body.as_array().ok_or("entry body is not an array")?;
    let (label, targets) = body.split_first().ok_or("entry body is empty")?;
    let label = label.as_str().ok_or("entry label is not a string")?;

    if targets.is_empty() {
        return Err(format!("entry '{}' has no targets", id));
    }
    let targets = targets
        .iter()
        .map(parse_target)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(IndexEntry {
        key,
        display_label: decode_entities(label).into_owned(),
        targets,
        ordinal,
    })
}

/// `['<url>', <flag>, '<scope>']`; the scope may be omitted.
fn parse_target(item: &Literal) -> Result<Target, String> {
    let fields = item
        .as_array()
        .ok_or_else(|| format!("target is {}, expected array", item.kind()))?;

    let url = fields
        .first()
        .and_then(Literal::as_str)
        .ok_or("target url is missing")?;
    let flag = fields
        .get(1)
        .and_then(Literal::as_int)
        .ok_or("target flag is missing")?;
    let scope = match fields.get(2) {
        Some(scope) => scope.as_str().ok_or("target scope is not a string")?,
        None => "",
    };

    Ok(Target {
        anchor_url: url.to_string(),
        scope_label: decode_entities(scope).into_owned(),
        external: flag == 0,
    })
}
