use crate::search::{IndexEntry, Target};
use serde::Serialize;

/// One ranked search result handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayResult {
    pub display_label: String,
    /// The normalized key that matched.
    pub key: String,
    /// Never empty; the entry's own targets in build order.
    pub targets: Vec<Target>,
}

impl DisplayResult {
    pub fn from_entry(entry: &IndexEntry) -> Self {
        Self {
            display_label: entry.display_label.clone(),
            key: entry.key.clone(),
            targets: entry.targets.clone(),
        }
    }

    /// True when the result resolves to a single location.
    pub fn is_unique(&self) -> bool {
        self.targets.len() == 1
    }
}
