//! Search handler and the text rendering shared by the MCP tool and the CLI.

use crate::engine::SearchIndex;
use crate::types::DisplayResult;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Search text; matched case-insensitively against index keys
    pub query: String,
    /// Sections to search (e.g. "all", "classes", "functions"). Defaults to the configured sections
    #[serde(default)]
    pub sections: Option<Vec<String>>,
    /// Maximum number of results to return (default: 25)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Sections and limit applied when a request leaves them out.
#[derive(Debug, Clone)]
pub struct SearchDefaults {
    pub sections: Vec<String>,
    pub limit: usize,
}

impl SearchDefaults {
    /// Configured sections, or the manifest's first section when none are configured.
    pub fn resolve_sections(&self, index: &SearchIndex) -> Vec<String> {
        if self.sections.is_empty() {
            index
                .manifest()
                .default_section()
                .map(|s| vec![s.to_string()])
                .unwrap_or_default()
        } else {
            self.sections.clone()
        }
    }
}

/// Execute a search and render the ranked results.
pub async fn handle_search(
    index: &SearchIndex,
    request: SearchRequest,
    defaults: &SearchDefaults,
) -> Result<String, String> {
    let sections = match request.sections {
        Some(sections) if !sections.is_empty() => sections,
        _ => defaults.resolve_sections(index),
    };
    index.check_sections(&sections).map_err(|e| {
        let known: Vec<_> = index
            .manifest()
            .sections()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        format!("{}. Available sections: {}", e, known.join(", "))
    })?;

    let results = index.search(&request.query, &sections).await;
    let limit = request.limit.unwrap_or(defaults.limit);

    if results.is_empty() {
        return Ok(format!(
            "No results found for '{}' in {}.\n\n\
             Search tips:\n\
             • Matching is by substring, so a shorter term finds more\n\
             • Only the first character selects which part of the index is read\n\
             • Use list_sections to see what else can be searched\n",
            request.query,
            sections.join(", ")
        ));
    }

    Ok(render_results(&request.query, &sections, &results, limit))
}

/// Render results as a numbered list, at most `limit` of them.
pub fn render_results(
    query: &str,
    sections: &[String],
    results: &[DisplayResult],
    limit: usize,
) -> String {
    let mut output = format!(
        "Search results for '{}' in {} ({} found):\n\n",
        query,
        sections.join(", "),
        results.len()
    );

    for (idx, result) in results.iter().take(limit).enumerate() {
        if let [target] = result.targets.as_slice() {
            let _ = write!(output, "{}. {} → {}", idx + 1, result.display_label, target.anchor_url);
            if !target.scope_label.is_empty() {
                let _ = write!(output, " ({})", target.scope_label);
            }
            if target.external {
                output.push_str(" [external]");
            }
            output.push('\n');
            continue;
        }

        let _ = writeln!(
            output,
            "{}. {} ({} locations)",
            idx + 1,
            result.display_label,
            result.targets.len()
        );
        for target in &result.targets {
            let scope = if target.scope_label.is_empty() {
                "(global)"
            } else {
                target.scope_label.as_str()
            };
            let _ = write!(output, "   • {} → {}", scope, target.anchor_url);
            if target.external {
                output.push_str(" [external]");
            }
            output.push('\n');
        }
    }

    if results.len() > limit {
        let _ = writeln!(output, "\n... and {} more", results.len() - limit);
    }

    output
}
