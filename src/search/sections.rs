//! The search manifest (`searchdata.js`) and the bucket function it defines.
//!
//! The index builder partitions each section by the first character of the
//! key. The manifest lists, per section, every character that has a shard; a
//! character's position in that list is its bucket id, written in hex in the
//! shard file name. `all_f.js` therefore holds the sixteenth listed character.

use super::ShardId;
use super::literal::{Literal, LiteralError, parse_script};
use serde::Serialize;

/// One index section (`all`, `classes`, `functions`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSection {
    /// Position in the manifest.
    pub number: u32,
    /// File-name prefix of the section's shards.
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// First characters that have a shard, in bucket order.
    characters: Vec<char>,
}

impl IndexSection {
    pub fn new(
        number: u32,
        name: impl Into<String>,
        label: impl Into<String>,
        characters: impl IntoIterator<Item = char>,
    ) -> Self {
        Self {
            number,
            name: name.into(),
            label: label.into(),
            characters: characters.into_iter().collect(),
        }
    }

    /// The bucket holding keys that start with `c`, if the section has one.
    pub fn bucket_for(&self, c: char) -> Option<u32> {
        self.characters
            .iter()
            .position(|&listed| listed == c)
            .and_then(|pos| u32::try_from(pos).ok())
    }

    /// The shard holding keys that start with `c`, if the section has one.
    pub fn shard_for(&self, c: char) -> Option<ShardId> {
        self.bucket_for(c).map(|bucket| ShardId::new(&self.name, bucket))
    }

    pub fn characters(&self) -> &[char] {
        &self.characters
    }

    pub fn bucket_count(&self) -> usize {
        self.characters.len()
    }
}

/// Errors reading `searchdata.js`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    #[error("syntax error: {0}")]
    Syntax(#[from] LiteralError),
    #[error("missing '{0}' declaration")]
    Missing(&'static str),
    #[error("'{name}' has an invalid shape: {reason}")]
    Shape { name: &'static str, reason: String },
}

const CONTENT: &str = "indexSectionsWithContent";
const NAMES: &str = "indexSectionNames";
const LABELS: &str = "indexSectionLabels";

/// All sections of one documentation build.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Manifest {
    sections: Vec<IndexSection>,
}

impl Manifest {
    pub fn new(mut sections: Vec<IndexSection>) -> Self {
        sections.sort_by_key(|s| s.number);
        Self { sections }
    }

    /// Parse `searchdata.js`.
    ///
    /// Section names are required; labels fall back to the name and a section
    /// without a content entry has no buckets.
    pub fn parse(src: &str) -> Result<Self, ManifestError> {
        let declarations = parse_script(src)?;
        let find = |name: &'static str| {
            declarations
                .iter()
                .find(|(decl, _)| decl == name)
                .map(|(_, value)| value)
        };

        let names = numbered_strings(NAMES, find(NAMES).ok_or(ManifestError::Missing(NAMES))?)?;
        let content = match find(CONTENT) {
            Some(value) => numbered_strings(CONTENT, value)?,
            None => return Err(ManifestError::Missing(CONTENT)),
        };
        let labels = match find(LABELS) {
            Some(value) => numbered_strings(LABELS, value)?,
            None => Vec::new(),
        };

        let lookup = |table: &[(u32, String)], number: u32| {
            table
                .iter()
                .find(|(n, _)| *n == number)
                .map(|(_, value)| value.clone())
        };

        let sections = names
            .iter()
            .map(|(number, name)| {
                IndexSection::new(
                    *number,
                    name.clone(),
                    lookup(&labels, *number).unwrap_or_else(|| name.clone()),
                    lookup(&content, *number).unwrap_or_default().chars(),
                )
            })
            .collect();

        Ok(Self::new(sections))
    }

    pub fn sections(&self) -> &[IndexSection] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&IndexSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Name of the first section, which the builder always makes the catch-all `all`.
    pub fn default_section(&self) -> Option<&str> {
        self.sections.first().map(|s| s.name.as_str())
    }
}

/// `{ 0: "...", 1: "..." }` → `[(0, "..."), (1, "...")]`
fn numbered_strings(
    name: &'static str,
    value: &Literal,
) -> Result<Vec<(u32, String)>, ManifestError> {
    let shape = |reason: String| ManifestError::Shape { name, reason };
    let members = value
        .as_object()
        .ok_or_else(|| shape(format!("expected object, found {}", value.kind())))?;

    members
        .iter()
        .map(|(key, value)| {
            let number = key
                .parse::<u32>()
                .map_err(|_| shape(format!("key '{}' is not a section number", key)))?;
            let text = value
                .as_str()
                .ok_or_else(|| shape(format!("value for {} is not a string", key)))?;
            Ok((number, text.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    const MANIFEST: &str = r#"
var indexSectionsWithContent =
{
  0: "abcdefghiklmnoprstuvwxyz",
  1: "cmrt",
  2: "ainptw"
};

var indexSectionNames =
{
  0: "all",
  1: "classes",
  2: "namespaces"
};

var indexSectionLabels =
{
  0: "All",
  1: "Classes",
  2: "Namespaces"
};
"#;

    #[test]
    fn test_parse_manifest() {
        let_assert!(Ok(manifest) = Manifest::parse(MANIFEST));
        check!(manifest.sections().len() == 3);
        check!(manifest.default_section() == Some("all"));

        let_assert!(Some(classes) = manifest.section("classes"));
        check!(classes.label == "Classes");
        check!(classes.characters() == ['c', 'm', 'r', 't']);
        check!(classes.bucket_count() == 4);
    }

    #[rstest]
    #[case('r', Some(15))]
    #[case('t', Some(17))]
    #[case('a', Some(0))]
    #[case('j', None)]
    #[case('_', None)]
    fn test_bucket_matches_builder_file_names(#[case] c: char, #[case] bucket: Option<u32>) {
        let_assert!(Ok(manifest) = Manifest::parse(MANIFEST));
        let_assert!(Some(all) = manifest.section("all"));
        check!(all.bucket_for(c) == bucket);
    }

    #[test]
    fn test_shard_for_builds_file_name() {
        let_assert!(Ok(manifest) = Manifest::parse(MANIFEST));
        let_assert!(Some(all) = manifest.section("all"));
        let_assert!(Some(id) = all.shard_for('t'));
        check!(id.file_name() == "all_11.js");
    }

    #[test]
    fn test_labels_are_optional() {
        let src = r#"var indexSectionsWithContent = {0: "ab"}; var indexSectionNames = {0: "all"};"#;
        let_assert!(Ok(manifest) = Manifest::parse(src));
        check!(manifest.sections()[0].label == "all");
    }

    #[test]
    fn test_section_without_content_has_no_buckets() {
        let src = r#"var indexSectionsWithContent = {0: "ab"};
                     var indexSectionNames = {0: "all", 1: "pages"};"#;
        let_assert!(Ok(manifest) = Manifest::parse(src));
        let_assert!(Some(pages) = manifest.section("pages"));
        check!(pages.bucket_count() == 0);
        check!(pages.bucket_for('a') == None);
    }

    #[rstest]
    #[case("var indexSectionsWithContent = {0: \"ab\"};", "indexSectionNames")]
    #[case("var indexSectionNames = {0: \"all\"};", "indexSectionsWithContent")]
    fn test_missing_declarations(#[case] src: &str, #[case] missing: &str) {
        let_assert!(Err(ManifestError::Missing(name)) = Manifest::parse(src));
        check!(name == missing);
    }

    #[test]
    fn test_bad_shape() {
        let src = r#"var indexSectionsWithContent = {x: "ab"}; var indexSectionNames = {0: "all"};"#;
        let_assert!(Err(ManifestError::Shape { name, .. }) = Manifest::parse(src));
        check!(name == "indexSectionsWithContent");
    }
}
