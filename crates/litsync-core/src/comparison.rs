//! Note comparison, diff generation, and conflict detection
//!
//! This module provides read-only analysis of an existing note against the
//! note that Zotero data would produce:
//! - Hand edits to the managed block via SHA-256 hashing
//! - Which side is newer via timestamp comparison
//! - Visual diffs for changed notes
//! - Conflict classification and resolution strategy determination

mod diff;
mod hash;
mod timestamp;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use diff::DiffGenerator;
pub use hash::ContentHasher;
pub use timestamp::TimestampComparator;

use crate::error::Result;
use crate::vault::Note;
use crate::zotero::Item;

/// Conflict resolution strategy for notes edited by hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictStrategy {
    /// Leave the note alone and report an error (or ask, when interactive)
    Fail,
    /// Overwrite the managed block with Zotero data
    Overwrite,
    /// Keep the hand-edited note
    Skip,
    /// Overwrite only if the item changed after the note was written
    Newer,
}

/// Result of comparing an existing note with its re-rendered version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonResult {
    /// Nothing to write
    Identical,
    /// Managed block untouched since the last sync, but Zotero data changed
    Outdated,
    /// Managed block edited by hand
    Conflict {
        /// Whether the Zotero item is newer than the note file
        item_newer: bool,
        /// Chosen resolution strategy
        strategy: ConflictStrategy,
    },
    /// Block markers missing; resolved like a conflict
    Unmanaged {
        /// Whether the Zotero item is newer than the note file
        item_newer: bool,
        /// Chosen resolution strategy
        strategy: ConflictStrategy,
    },
}

/// Compares a note on disk with the note Zotero data would produce
pub struct NoteComparator;

impl NoteComparator {
    /// Classify an existing note
    ///
    /// `current_text` is the file content, `current` its parsed form, and
    /// `rendered` the full text litsync would write.
    ///
    /// # Errors
    ///
    /// Returns an error if note metadata cannot be read for the `newer` check.
    pub fn compare(
        current_text: &str,
        current: &Note,
        rendered: &str,
        note_path: &Path,
        item: &Item,
        strategy: ConflictStrategy,
    ) -> Result<ComparisonResult> {
        if current_text == rendered {
            return Ok(ComparisonResult::Identical);
        }

        let unmanaged = current.managed_block().is_none();
        if !unmanaged && !Self::is_hand_edited(current) {
            return Ok(ComparisonResult::Outdated);
        }

        let item_newer = TimestampComparator::item_is_newer(item.modified_at(), note_path)?;
        if unmanaged {
            return Ok(ComparisonResult::Unmanaged {
                item_newer,
                strategy,
            });
        }
        Ok(ComparisonResult::Conflict {
            item_newer,
            strategy,
        })
    }

    /// Whether the managed block differs from what litsync last wrote
    #[must_use]
    pub fn is_hand_edited(note: &Note) -> bool {
        match (note.managed_block(), note.stored_hash()) {
            (Some(block), Some(hash)) => ContentHasher::hash_str(block) != hash,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    use crate::vault::{NoteRenderer, BLOCK_BEGIN, BLOCK_END};
    use crate::zotero::Library;

    fn item(title: &str) -> Item {
        serde_json::from_value(serde_json::json!({
            "key": "ABCD2345",
            "version": 1,
            "data": {
                "itemType": "book",
                "title": title,
                "dateModified": "2001-01-01T00:00:00Z"
            }
        }))
        .unwrap()
    }

    fn renderer() -> NoteRenderer {
        NoteRenderer::new(Library::User("1".to_string()), None)
    }

    #[test]
    fn test_identical_note() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("note.md");
        let text = renderer().render(&item("Same"), "same", None).unwrap();
        fs::write(&path, &text).unwrap();

        let note = Note::parse(&text).unwrap();
        let result = NoteComparator::compare(
            &text,
            &note,
            &text,
            &path,
            &item("Same"),
            ConflictStrategy::Fail,
        )
        .unwrap();

        assert_eq!(result, ComparisonResult::Identical);
    }

    #[test]
    fn test_outdated_note() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("note.md");
        let old_text = renderer().render(&item("Old"), "k", None).unwrap();
        fs::write(&path, &old_text).unwrap();

        let current = Note::parse(&old_text).unwrap();
        let new_text = renderer().render(&item("New"), "k", Some(&current)).unwrap();

        let result = NoteComparator::compare(
            &old_text,
            &current,
            &new_text,
            &path,
            &item("New"),
            ConflictStrategy::Fail,
        )
        .unwrap();

        assert_eq!(result, ComparisonResult::Outdated);
    }

    #[test]
    fn test_hand_edited_block_conflicts() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("note.md");
        let text = renderer().render(&item("Old"), "k", None).unwrap();
        let edited = text.replace("# Old", "# Old (my wording)");
        fs::write(&path, &edited).unwrap();

        let current = Note::parse(&edited).unwrap();
        let new_text = renderer().render(&item("New"), "k", Some(&current)).unwrap();

        let result = NoteComparator::compare(
            &edited,
            &current,
            &new_text,
            &path,
            &item("New"),
            ConflictStrategy::Newer,
        )
        .unwrap();

        // Item modified in 2001, note written just now
        assert_eq!(
            result,
            ComparisonResult::Conflict {
                item_newer: false,
                strategy: ConflictStrategy::Newer
            }
        );
    }

    #[test]
    fn test_note_without_markers_is_unmanaged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("note.md");
        let text = "---\nzotero-key: ABCD2345\n---\nMy own page about it.\n";
        fs::write(&path, text).unwrap();

        let current = Note::parse(text).unwrap();
        let rendered = renderer().render(&item("New"), "k", Some(&current)).unwrap();

        let result = NoteComparator::compare(
            text,
            &current,
            &rendered,
            &path,
            &item("New"),
            ConflictStrategy::Skip,
        )
        .unwrap();

        assert_eq!(
            result,
            ComparisonResult::Unmanaged {
                item_newer: false,
                strategy: ConflictStrategy::Skip
            }
        );
    }

    #[test]
    fn test_missing_markers_count_as_edited() {
        let note = Note::parse("---\nzotero-key: ABCD2345\nlitsync-hash: x\n---\nplain body\n").unwrap();
        assert!(NoteComparator::is_hand_edited(&note));

        let text = format!("---\nzotero-key: K\n---\n{BLOCK_BEGIN}\nbody\n{BLOCK_END}\n");
        let no_hash = Note::parse(&text).unwrap();
        assert!(NoteComparator::is_hand_edited(&no_hash));
    }
}
