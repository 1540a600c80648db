//! Markdown note with YAML frontmatter and a litsync-managed block

use anyhow::Context;
use serde_yml::{Mapping, Value};

use crate::error::Result;

/// Opening marker of the managed block
pub const BLOCK_BEGIN: &str = "<!-- litsync:begin -->";
/// Closing marker of the managed block
pub const BLOCK_END: &str = "<!-- litsync:end -->";
/// Heading placed below the block in new notes
pub const NOTES_HEADING: &str = "## Notes";

/// Frontmatter key holding the Zotero item key
pub const KEY_FIELD: &str = "zotero-key";
/// Frontmatter key holding the hash of the managed block as last written
pub const HASH_FIELD: &str = "litsync-hash";

/// A parsed note
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// Frontmatter entries in file order
    pub frontmatter: Mapping,
    /// Everything after the frontmatter
    pub body: String,
}

impl Note {
    /// Empty note with the given body
    #[must_use]
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            frontmatter: Mapping::new(),
            body: body.into(),
        }
    }

    /// Parse note text
    ///
    /// Text without a leading `---` fence has no frontmatter.
    ///
    /// # Errors
    ///
    /// Returns an error if the frontmatter is not a YAML mapping.
    pub fn parse(text: &str) -> Result<Self> {
        let Some((yaml, body)) = split_frontmatter(text) else {
            return Ok(Self::with_body(text));
        };

        let frontmatter = if yaml.trim().is_empty() {
            Mapping::new()
        } else {
            match serde_yml::from_str::<Value>(yaml).context("Invalid YAML frontmatter")? {
                Value::Mapping(mapping) => mapping,
                Value::Null => Mapping::new(),
                _ => anyhow::bail!("Frontmatter is not a key/value mapping"),
            }
        };

        Ok(Self {
            frontmatter,
            body: body.to_string(),
        })
    }

    /// Serialize back to note text
    ///
    /// # Errors
    ///
    /// Returns an error if the frontmatter cannot be serialized.
    pub fn render(&self) -> Result<String> {
        if self.frontmatter.is_empty() {
            return Ok(self.body.clone());
        }

        let mut yaml =
            serde_yml::to_string(&self.frontmatter).context("Failed to serialize frontmatter")?;
        if !yaml.ends_with('\n') {
            yaml.push('\n');
        }

        Ok(format!("---\n{yaml}---\n{}", self.body))
    }

    /// String value of a frontmatter key
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.frontmatter.get(field).and_then(Value::as_str)
    }

    /// Zotero item key this note belongs to
    #[must_use]
    pub fn zotero_key(&self) -> Option<&str> {
        self.get_str(KEY_FIELD).map(str::trim).filter(|k| !k.is_empty())
    }

    /// Hash recorded at the last write
    #[must_use]
    pub fn stored_hash(&self) -> Option<&str> {
        self.get_str(HASH_FIELD)
    }

    /// Content between the block markers, without the marker lines
    #[must_use]
    pub fn managed_block(&self) -> Option<&str> {
        let (inner_start, inner_end, _) = self.block_bounds()?;
        Some(&self.body[inner_start..inner_end])
    }

    /// Replace the managed block content, inserting the block at the top if it is missing
    pub fn replace_managed_block(&mut self, inner: &str) {
        let block = format!("{BLOCK_BEGIN}\n{inner}{BLOCK_END}");

        match self.block_range() {
            Some((start, end)) => self.body.replace_range(start..end, &block),
            None if self.body.trim().is_empty() => self.body = format!("{block}\n"),
            None => self.body = format!("{block}\n\n{}", self.body.trim_start_matches('\n')),
        }
    }

    /// Body text outside the managed block
    #[must_use]
    pub fn user_content(&self) -> String {
        match self.block_range() {
            Some((start, end)) => format!("{}{}", &self.body[..start], &self.body[end..]),
            None => self.body.clone(),
        }
    }

    /// Whether the body holds anything besides the managed block and the notes heading
    #[must_use]
    pub fn has_user_content(&self) -> bool {
        self.user_content()
            .lines()
            .map(str::trim)
            .any(|line| !line.is_empty() && line != NOTES_HEADING)
    }

    /// Byte range of the whole block including markers
    fn block_range(&self) -> Option<(usize, usize)> {
        let (_, _, end) = self.block_bounds()?;
        let start = self.body.find(BLOCK_BEGIN)?;
        Some((start, end))
    }

    /// (inner start, inner end, block end) byte offsets
    fn block_bounds(&self) -> Option<(usize, usize, usize)> {
        let begin = self.body.find(BLOCK_BEGIN)?;
        let mut inner_start = begin + BLOCK_BEGIN.len();
        if self.body[inner_start..].starts_with("\r\n") {
            inner_start += 2;
        } else if self.body[inner_start..].starts_with('\n') {
            inner_start += 1;
        }

        let inner_end = inner_start + self.body[inner_start..].find(BLOCK_END)?;
        Some((inner_start, inner_end, inner_end + BLOCK_END.len()))
    }
}

/// Split `---` fenced frontmatter from the body
fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE: &str = "---
zotero-key: ABCD2345
rating: 5
---
<!-- litsync:begin -->
# Title
<!-- litsync:end -->

## Notes

My thoughts.
";

    #[test]
    fn test_parse_frontmatter_and_block() {
        let note = Note::parse(NOTE).unwrap();

        assert_eq!(note.zotero_key(), Some("ABCD2345"));
        assert_eq!(note.frontmatter.get("rating").and_then(Value::as_u64), Some(5));
        assert_eq!(note.managed_block(), Some("# Title\n"));
        assert!(note.has_user_content());
    }

    #[test]
    fn test_render_round_trip_is_stable() {
        let note = Note::parse(NOTE).unwrap();
        let rendered = note.render().unwrap();

        assert_eq!(Note::parse(&rendered).unwrap(), note);
        assert_eq!(Note::parse(&rendered).unwrap().render().unwrap(), rendered);
    }

    #[test]
    fn test_no_frontmatter() {
        let note = Note::parse("# Just a page\n").unwrap();

        assert!(note.frontmatter.is_empty());
        assert_eq!(note.zotero_key(), None);
        assert_eq!(note.render().unwrap(), "# Just a page\n");
    }

    #[test]
    fn test_unterminated_frontmatter_is_body() {
        let note = Note::parse("---\nnot closed\n").unwrap();

        assert!(note.frontmatter.is_empty());
        assert_eq!(note.body, "---\nnot closed\n");
    }

    #[test]
    fn test_frontmatter_must_be_mapping() {
        assert!(Note::parse("---\n- a\n- b\n---\nbody\n").is_err());
        assert!(Note::parse("---\n---\nbody\n").unwrap().frontmatter.is_empty());
    }

    #[test]
    fn test_replace_block_keeps_user_content() {
        let mut note = Note::parse(NOTE).unwrap();
        note.replace_managed_block("# New Title\n");

        assert_eq!(note.managed_block(), Some("# New Title\n"));
        assert!(note.body.contains("My thoughts."));
        assert!(note.body.ends_with("## Notes\n\nMy thoughts.\n"));
    }

    #[test]
    fn test_replace_block_inserts_missing_block() {
        let mut note = Note::with_body("\nhand written\n");
        note.replace_managed_block("# T\n");

        assert_eq!(
            note.body,
            format!("{BLOCK_BEGIN}\n# T\n{BLOCK_END}\n\nhand written\n")
        );
    }

    #[test]
    fn test_user_content_template_only() {
        let note = Note::with_body(format!("{BLOCK_BEGIN}\n# T\n{BLOCK_END}\n\n{NOTES_HEADING}\n\n"));

        assert!(!note.has_user_content());
    }
}
