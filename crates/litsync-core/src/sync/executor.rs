//! Atomic note write executor

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use super::SyncResult;
use super::actions::SyncAction;
use crate::comparison::{ConflictStrategy, ContentHasher};
use crate::error::Result;

/// Suffix of the temporary file written before the atomic rename
const TEMP_SUFFIX: &str = "litsync-tmp";

/// Executes note operations atomically
pub struct NoteWriter {
    dry_run: bool,
}

impl NoteWriter {
    /// Create a new executor
    #[must_use]
    pub const fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Execute a sync action, resolving conflicts by their strategy
    ///
    /// # Errors
    ///
    /// Returns an error if a file operation fails, the note changed on disk
    /// since planning, or a conflict uses the `fail` strategy.
    pub fn execute(&self, action: &SyncAction, result: &mut SyncResult) -> Result<()> {
        match action {
            SyncAction::Create { dest, content, .. } => {
                if self.dry_run {
                    println!("[DRY RUN] Would create: {}", dest.display());
                } else {
                    if dest.exists() {
                        anyhow::bail!("Refusing to overwrite unindexed file: {}", dest.display());
                    }
                    Self::write_atomic(dest, content)?;
                }
                result.created += 1;
            }
            SyncAction::Update { dest, content, .. } => {
                if self.dry_run {
                    println!("[DRY RUN] Would update: {}", dest.display());
                } else {
                    Self::ensure_unchanged(action, dest)?;
                    Self::write_atomic(dest, content)?;
                }
                result.updated += 1;
            }
            SyncAction::Skip { path, reason, .. } => {
                if self.dry_run {
                    if let Some(path) = path {
                        println!("[DRY RUN] Would skip: {} ({reason})", path.display());
                    }
                }
                result.record_skip(reason);
            }
            SyncAction::Conflict {
                dest,
                strategy,
                item_newer,
                ..
            } => {
                self.handle_conflict(action, dest, *strategy, *item_newer, result)?;
            }
            SyncAction::Delete { path, .. } => {
                if self.dry_run {
                    println!("[DRY RUN] Would delete: {}", path.display());
                } else {
                    Self::ensure_unchanged(action, path)?;
                    fs::remove_file(path)
                        .with_context(|| format!("Failed to delete note: {}", path.display()))?;
                }
                result.deleted += 1;
            }
        }
        Ok(())
    }

    /// Apply an action the user explicitly approved
    ///
    /// Approved conflicts overwrite the note regardless of strategy.
    ///
    /// # Errors
    ///
    /// Returns an error if a file operation fails or the note changed on disk.
    pub fn execute_approved(&self, action: &SyncAction, result: &mut SyncResult) -> Result<()> {
        match action {
            SyncAction::Conflict { dest, content, .. } => {
                if self.dry_run {
                    println!("[DRY RUN] Would overwrite: {}", dest.display());
                } else {
                    Self::ensure_unchanged(action, dest)?;
                    Self::write_atomic(dest, content)?;
                }
                result.updated += 1;
                Ok(())
            }
            _ => self.execute(action, result),
        }
    }

    /// Handle a conflict according to strategy
    fn handle_conflict(
        &self,
        action: &SyncAction,
        dest: &Path,
        strategy: ConflictStrategy,
        item_newer: bool,
        result: &mut SyncResult,
    ) -> Result<()> {
        let overwrite = match strategy {
            ConflictStrategy::Fail => {
                anyhow::bail!(
                    "Conflict: {} was edited by hand (use --conflict to resolve)",
                    dest.display()
                );
            }
            ConflictStrategy::Overwrite => true,
            ConflictStrategy::Skip => false,
            ConflictStrategy::Newer => item_newer,
        };

        if overwrite {
            self.execute_approved(action, result)
        } else {
            if self.dry_run {
                println!("[DRY RUN] Would keep edited note: {}", dest.display());
            }
            result.conflicts += 1;
            Ok(())
        }
    }

    /// Fail if the note no longer matches what the plan was based on
    fn ensure_unchanged(action: &SyncAction, path: &Path) -> Result<()> {
        let Some(expected) = action.expected_hash() else {
            return Ok(());
        };

        let actual = ContentHasher::hash_file(path)?;
        if actual != expected {
            anyhow::bail!("Note changed on disk since planning: {}", path.display());
        }
        Ok(())
    }

    /// Write via a temporary sibling file and rename
    fn write_atomic(dest: &Path, content: &str) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let tmp = dest.with_extension(format!("md.{TEMP_SUFFIX}"));
        fs::write(&tmp, content)
            .with_context(|| format!("Failed to write temporary file: {}", tmp.display()))?;

        if let Err(e) = fs::rename(&tmp, dest) {
            let _ = fs::remove_file(&tmp);
            return Err(e).with_context(|| format!("Failed to replace note: {}", dest.display()));
        }

        debug!(path = %dest.display(), "wrote note");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn conflict(dest: PathBuf, current: &str, strategy: ConflictStrategy, item_newer: bool) -> SyncAction {
        SyncAction::Conflict {
            key: "K".to_string(),
            dest,
            content: "new".to_string(),
            current: current.to_string(),
            strategy,
            item_newer,
        }
    }

    #[test]
    fn test_create_writes_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("Literature/sub/n.md");
        let mut result = SyncResult::default();

        NoteWriter::new(false)
            .execute(
                &SyncAction::Create {
                    key: "K".to_string(),
                    dest: dest.clone(),
                    content: "hello".to_string(),
                },
                &mut result,
            )
            .unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "hello");
        assert!(!dest.with_extension("md.litsync-tmp").exists());
        assert_eq!(result.created, 1);
    }

    #[test]
    fn test_update_detects_concurrent_edit() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("n.md");
        fs::write(&dest, "edited meanwhile").unwrap();
        let mut result = SyncResult::default();

        let err = NoteWriter::new(false)
            .execute(
                &SyncAction::Update {
                    key: "K".to_string(),
                    dest: dest.clone(),
                    content: "new".to_string(),
                    current: "as planned".to_string(),
                },
                &mut result,
            )
            .unwrap_err();

        assert!(err.to_string().contains("changed on disk"));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "edited meanwhile");
    }

    #[test]
    fn test_conflict_strategies() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("n.md");
        let writer = NoteWriter::new(false);

        fs::write(&dest, "old").unwrap();
        let mut result = SyncResult::default();
        assert!(writer
            .execute(&conflict(dest.clone(), "old", ConflictStrategy::Fail, true), &mut result)
            .is_err());

        writer
            .execute(&conflict(dest.clone(), "old", ConflictStrategy::Skip, true), &mut result)
            .unwrap();
        writer
            .execute(&conflict(dest.clone(), "old", ConflictStrategy::Newer, false), &mut result)
            .unwrap();
        assert_eq!(result.conflicts, 2);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old");

        writer
            .execute(&conflict(dest.clone(), "old", ConflictStrategy::Newer, true), &mut result)
            .unwrap();
        assert_eq!(result.updated, 1);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[test]
    fn test_approved_conflict_overwrites() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("n.md");
        fs::write(&dest, "old").unwrap();
        let mut result = SyncResult::default();

        NoteWriter::new(false)
            .execute_approved(&conflict(dest.clone(), "old", ConflictStrategy::Fail, false), &mut result)
            .unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
        assert_eq!(result.updated, 1);
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("n.md");
        fs::write(&path, "keep").unwrap();
        let mut result = SyncResult::default();

        NoteWriter::new(true)
            .execute(
                &SyncAction::Delete {
                    key: "K".to_string(),
                    path: path.clone(),
                    current: "keep".to_string(),
                },
                &mut result,
            )
            .unwrap();

        assert!(path.exists());
        assert_eq!(result.deleted, 1);
    }
}
