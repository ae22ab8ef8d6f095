//! Runtime configuration loaded from a TOML file.

use anyhow::Context;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tokio::time::Duration;

use crate::engine::IndexOptions;

/// Settings shared by every subcommand.
///
/// Every field has a default, so an empty file (or no file at all) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Doxygen `search/` directory holding `searchdata.js` and the shard files.
    pub index_dir: PathBuf,
    /// Sections searched when a request names none. Empty means the manifest's first.
    pub sections: Vec<String>,
    /// Delay before an interactive query is looked up.
    pub debounce_ms: u64,
    /// Upper bound on one shard fetch; 0 disables the limit.
    pub fetch_timeout_ms: u64,
    /// Default number of results rendered.
    pub limit: usize,
    /// Emit logs as JSON lines instead of the compact format.
    pub log_json: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from("html/search"),
            sections: Vec::new(),
            debounce_ms: 500,
            fetch_timeout_ms: 5000,
            limit: 25,
            log_json: false,
        }
    }
}

impl SearchConfig {
    /// Parse a configuration from TOML text.
    pub fn parse(content: &str) -> crate::Result<Self> {
        let mut config: Self = toml::from_str(content).context("Invalid configuration")?;
        config.index_dir = PathBuf::from(expand_tilde(&config.index_dir.to_string_lossy()).as_ref());
        Ok(config)
    }

    /// Read the configuration at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let path = PathBuf::from(expand_tilde(&path.to_string_lossy()).as_ref());
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("In {}", path.display()))
    }

    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub const fn index_options(&self) -> IndexOptions {
        IndexOptions {
            fetch_timeout: if self.fetch_timeout_ms == 0 {
                None
            } else {
                Some(Duration::from_millis(self.fetch_timeout_ms))
            },
        }
    }
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
