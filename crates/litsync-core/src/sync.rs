//! Zotero to vault synchronization engine
//!
//! This module turns a library snapshot into note changes:
//! - Planning: one action per item, then one per orphaned note
//! - Execution: atomic writes, conflict strategies, optional approval
//! - State: the library version of the last clean sync, for incremental runs
//!
//! Interactive prompts live in the CLI; the engine only calls the approval
//! callback it is given.

mod actions;
mod executor;
mod orchestrator;
mod reporting;
mod state;

use std::collections::BTreeMap;

pub use actions::{REASON_UP_TO_DATE, SyncAction, SyncActionResolver};
pub use executor::NoteWriter;
pub use orchestrator::{
    ApprovalCallback, REASON_PROTECTED, REASON_REMOVED, REASON_USER_NOTES, REASON_USER_SKIPPED,
    SyncEngine, SyncPlan,
};
pub use reporting::SyncReporter;
pub use state::{STATE_DIR, SyncScope, SyncState};

/// Synchronization result with statistics
#[derive(Debug, Clone, Default)]
pub struct SyncResult {
    /// Notes created
    pub created: usize,
    /// Notes updated
    pub updated: usize,
    /// Notes deleted
    pub deleted: usize,
    /// Notes (or items) skipped
    pub skipped: usize,
    /// Skip reasons with counts
    pub skip_reasons: BTreeMap<String, usize>,
    /// Hand-edited notes kept as they are
    pub conflicts: usize,
    /// Per-note errors
    pub errors: Vec<String>,
}

impl SyncResult {
    /// Total operations performed
    #[must_use]
    pub const fn total_operations(&self) -> usize {
        self.created + self.updated + self.deleted
    }

    /// Whether sync was successful (no errors)
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Count a skipped note under `reason`
    pub fn record_skip(&mut self, reason: &str) {
        self.skipped += 1;
        *self.skip_reasons.entry(reason.to_string()).or_insert(0) += 1;
    }
}
