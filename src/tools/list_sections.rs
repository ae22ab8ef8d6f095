use crate::search::Manifest;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

/// Parameters for list_sections tool
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListSectionsRequest {}

/// List the searchable sections of the index with their labels and shard counts.
pub fn handle_list_sections(manifest: &Manifest, defaults: &[String]) -> String {
    if manifest.sections().is_empty() {
        return "The search index declares no sections.\n".to_string();
    }

    let mut output = format!("Index sections ({}):\n", manifest.sections().len());
    for section in manifest.sections() {
        let marker = if defaults.contains(&section.name) { " (default)" } else { "" };
        let _ = writeln!(
            output,
            "  • {} - {}: {} shards{}",
            section.name,
            section.label,
            section.bucket_count(),
            marker
        );
    }
    output
}
