//! Item and note timestamp comparison for the `newer` strategy

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Timestamp comparator
pub struct TimestampComparator;

impl TimestampComparator {
    /// Whether the Zotero item changed after the note file was last written
    ///
    /// An item without a modification time is never considered newer.
    ///
    /// # Errors
    ///
    /// Returns an error if note metadata cannot be read.
    pub fn item_is_newer(item_modified: Option<DateTime<Utc>>, note: &Path) -> Result<bool> {
        let Some(item_time) = item_modified else {
            return Ok(false);
        };

        Ok(item_time > Self::get_modified_time(note)?)
    }

    /// Get the modification time of a file
    ///
    /// # Errors
    ///
    /// Returns an error if file metadata cannot be read.
    pub fn get_modified_time(path: &Path) -> Result<DateTime<Utc>> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to read metadata for: {}", path.display()))?;

        let modified = metadata
            .modified()
            .with_context(|| format!("Failed to get modification time for: {}", path.display()))?;

        Ok(DateTime::<Utc>::from(modified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_item_newer_than_note() {
        let tmp = TempDir::new().unwrap();
        let note = tmp.path().join("note.md");
        fs::write(&note, "content").unwrap();

        let later = Utc::now() + Duration::hours(1);
        assert!(TimestampComparator::item_is_newer(Some(later), &note).unwrap());
    }

    #[test]
    fn test_note_newer_than_item() {
        let tmp = TempDir::new().unwrap();
        let note = tmp.path().join("note.md");
        fs::write(&note, "content").unwrap();

        let earlier = DateTime::parse_from_rfc3339("2001-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(!TimestampComparator::item_is_newer(Some(earlier), &note).unwrap());
    }

    #[test]
    fn test_unknown_item_time_is_not_newer() {
        let tmp = TempDir::new().unwrap();
        let note = tmp.path().join("note.md");
        fs::write(&note, "content").unwrap();

        assert!(!TimestampComparator::item_is_newer(None, &note).unwrap());
    }

    #[test]
    fn test_nonexistent_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("nonexistent.md");

        assert!(TimestampComparator::get_modified_time(&file).is_err());
        assert!(TimestampComparator::item_is_newer(Some(Utc::now()), &file).is_err());
    }
}
