//! Sync action determination logic

use std::path::{Path, PathBuf};

use crate::comparison::{ComparisonResult, ConflictStrategy, ContentHasher};

/// Skip reason for notes that already match Zotero
pub const REASON_UP_TO_DATE: &str = "up to date";

/// Sync action to perform for one note
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Write a new note
    Create {
        /// Zotero item key
        key: String,
        /// Note path
        dest: PathBuf,
        /// Full note text
        content: String,
    },
    /// Rewrite a note whose managed block is untouched
    Update {
        /// Zotero item key
        key: String,
        /// Note path
        dest: PathBuf,
        /// New note text
        content: String,
        /// Note text at planning time
        current: String,
    },
    /// Leave a note (or item) alone
    Skip {
        /// Zotero item key
        key: String,
        /// Note path, if the item has one
        path: Option<PathBuf>,
        /// Why nothing is done
        reason: String,
    },
    /// Managed block edited by hand; resolved by strategy or approval
    Conflict {
        /// Zotero item key
        key: String,
        /// Note path
        dest: PathBuf,
        /// New note text
        content: String,
        /// Note text at planning time
        current: String,
        /// Configured resolution strategy
        strategy: ConflictStrategy,
        /// Whether the item changed after the note was written
        item_newer: bool,
    },
    /// Remove a note whose item left the library
    Delete {
        /// Zotero item key
        key: String,
        /// Note path
        path: PathBuf,
        /// Note text at planning time
        current: String,
    },
}

impl SyncAction {
    /// Zotero item key the action is about
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Create { key, .. }
            | Self::Update { key, .. }
            | Self::Skip { key, .. }
            | Self::Conflict { key, .. }
            | Self::Delete { key, .. } => key,
        }
    }

    /// Note path the action touches
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Create { dest, .. } | Self::Update { dest, .. } | Self::Conflict { dest, .. } => {
                Some(dest.as_path())
            }
            Self::Delete { path, .. } => Some(path.as_path()),
            Self::Skip { path, .. } => path.as_deref(),
        }
    }

    /// Short status label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Create { .. } => "new",
            Self::Update { .. } => "update",
            Self::Skip { .. } => "skip",
            Self::Conflict { .. } => "conflict",
            Self::Delete { .. } => "delete",
        }
    }

    /// Whether a user must confirm the action in interactive mode
    #[must_use]
    pub const fn needs_approval(&self) -> bool {
        matches!(
            self,
            Self::Conflict {
                strategy: ConflictStrategy::Fail,
                ..
            } | Self::Delete { .. }
        )
    }

    /// Hash of the note as seen at planning time
    #[must_use]
    pub fn expected_hash(&self) -> Option<String> {
        match self {
            Self::Update { current, .. }
            | Self::Conflict { current, .. }
            | Self::Delete { current, .. } => Some(ContentHasher::hash_str(current)),
            Self::Create { .. } | Self::Skip { .. } => None,
        }
    }
}

/// Resolves comparison results into sync actions
pub struct SyncActionResolver;

impl SyncActionResolver {
    /// Determine the action for an item that already has a note
    #[must_use]
    pub fn resolve(
        key: String,
        dest: PathBuf,
        content: String,
        current: String,
        comparison: ComparisonResult,
    ) -> SyncAction {
        match comparison {
            ComparisonResult::Identical => SyncAction::Skip {
                key,
                path: Some(dest),
                reason: REASON_UP_TO_DATE.to_string(),
            },
            ComparisonResult::Outdated => SyncAction::Update {
                key,
                dest,
                content,
                current,
            },
            ComparisonResult::Conflict {
                item_newer,
                strategy,
            }
            | ComparisonResult::Unmanaged {
                item_newer,
                strategy,
            } => SyncAction::Conflict {
                key,
                dest,
                content,
                current,
                strategy,
                item_newer,
            },
        }
    }
}
