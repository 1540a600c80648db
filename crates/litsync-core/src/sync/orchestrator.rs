//! Sync orchestration - plans and applies note changes

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::SyncResult;
use super::actions::{SyncAction, SyncActionResolver};
use super::executor::NoteWriter;
use super::state::{SyncScope, SyncState};
use crate::comparison::NoteComparator;
use crate::config::{Config, PatternMatcher, SyncConfig};
use crate::error::Result;
use crate::vault::{NoteNamer, NoteRenderer, VaultIndex, VaultScanner};
use crate::zotero::{Item, Library, LibrarySnapshot};

/// Approval callback for interactive sync operations
///
/// Returns `Ok(true)` to proceed, `Ok(false)` to skip, or `Err` to abort.
pub type ApprovalCallback<'a> = Box<dyn FnMut(&SyncAction) -> Result<bool> + 'a>;

/// Skip reason for notes matched by ignore patterns
pub const REASON_PROTECTED: &str = "protected by ignore pattern";
/// Skip reason for orphans kept because they hold user text
pub const REASON_USER_NOTES: &str = "has user notes";
/// Skip reason for orphans kept because pruning is off
pub const REASON_REMOVED: &str = "removed from library";
/// Skip reason for actions declined at the prompt
pub const REASON_USER_SKIPPED: &str = "user skipped";

/// Actions computed for one snapshot
#[derive(Debug, Default)]
pub struct SyncPlan {
    /// Ordered actions: items sorted by key, then orphaned notes
    pub actions: Vec<SyncAction>,
    /// Problems found while scanning the vault
    pub warnings: Vec<String>,
    /// Items left out by item type
    pub excluded: usize,
}

impl SyncPlan {
    /// Actions that would change the vault
    pub fn changes(&self) -> impl Iterator<Item = &SyncAction> {
        self.actions
            .iter()
            .filter(|a| !matches!(a, SyncAction::Skip { .. }))
    }
}

/// Main sync engine
pub struct SyncEngine {
    vault_root: PathBuf,
    folder: String,
    matcher: PatternMatcher,
    renderer: NoteRenderer,
    sync: SyncConfig,
    scope: SyncScope,
    dry_run: bool,
}

impl SyncEngine {
    /// Create a new sync engine for the configured vault
    ///
    /// # Errors
    ///
    /// Returns an error if no vault is configured, the vault does not exist,
    /// or pattern compilation fails.
    pub fn new(config: &Config, library: Library) -> Result<Self> {
        let vault_root = config.vault.canonical_root()?;

        let matcher = PatternMatcher::with_patterns(&config.vault.ignore, &config.vault.include)?;
        let scope = SyncScope {
            library: library.path_prefix(),
            collection: config
                .zotero
                .collection
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            folder: config.vault.folder().to_string(),
        };
        let renderer = NoteRenderer::new(library, config.vault.tag().map(str::to_string));

        Ok(Self {
            vault_root,
            folder: config.vault.folder().to_string(),
            matcher,
            renderer,
            sync: config.sync.clone(),
            scope,
            dry_run: config.sync.dry_run == Some(true),
        })
    }

    /// Canonical vault root
    #[must_use]
    pub fn vault_root(&self) -> &Path {
        &self.vault_root
    }

    /// Absolute path of the literature folder
    #[must_use]
    pub fn folder_path(&self) -> PathBuf {
        self.vault_root.join(&self.folder)
    }

    /// Whether changes are only reported
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Index the literature folder
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be traversed.
    pub fn scan(&self) -> Result<VaultIndex> {
        VaultScanner::new(&self.vault_root, &self.matcher).scan(&self.folder)
    }

    /// Compute the actions that bring the vault in line with `snapshot`
    ///
    /// # Errors
    ///
    /// Returns an error if the vault cannot be scanned or a note cannot be
    /// rendered.
    pub fn plan(&self, snapshot: &LibrarySnapshot) -> Result<SyncPlan> {
        let index = self.scan()?;
        let mut plan = SyncPlan {
            warnings: index.warnings.clone(),
            ..SyncPlan::default()
        };

        let folder_path = self.folder_path();
        let mut namer = NoteNamer::new(index.paths.iter().map(PathBuf::as_path));

        let mut items: Vec<&Item> = snapshot.items.iter().collect();
        items.sort_by(|a, b| a.key.cmp(&b.key));

        for item in items {
            if !item.is_literature() || !self.sync.accepts_item_type(&item.data.item_type) {
                plan.excluded += 1;
                continue;
            }
            let action = self.plan_item(item, &index, &mut namer, &folder_path)?;
            debug!(key = %item.key, action = action.label(), "planned");
            plan.actions.push(action);
        }

        let library_keys: HashSet<&str> = snapshot.items.iter().map(|i| i.key.as_str()).collect();
        let deleted: HashSet<&str> = snapshot.deleted.iter().map(String::as_str).collect();

        for (key, note) in &index.notes {
            let orphaned = if snapshot.complete {
                !library_keys.contains(key.as_str())
            } else {
                deleted.contains(key.as_str()) && !library_keys.contains(key.as_str())
            };
            if !orphaned {
                continue;
            }

            let path = note.path.clone();
            let action = if note.protected {
                skip(key, Some(path), REASON_PROTECTED)
            } else if !self.sync.prune.unwrap_or(false) {
                skip(key, Some(path), REASON_REMOVED)
            } else if note.note.has_user_content() {
                skip(key, Some(path), REASON_USER_NOTES)
            } else {
                SyncAction::Delete {
                    key: key.clone(),
                    path,
                    current: note.text.clone(),
                }
            };
            debug!(key = %key, action = action.label(), "planned orphan");
            plan.actions.push(action);
        }

        Ok(plan)
    }

    fn plan_item(
        &self,
        item: &Item,
        index: &VaultIndex,
        namer: &mut NoteNamer,
        folder_path: &Path,
    ) -> Result<SyncAction> {
        let citekey = item.citekey();

        let Some(existing) = index.get(&item.key) else {
            let dest = namer.allocate(folder_path, &citekey, &item.key);
            let rel_path = dest.strip_prefix(&self.vault_root).unwrap_or(&dest);
            if !self.matcher.allows(rel_path) {
                return Ok(skip(&item.key, Some(dest), REASON_PROTECTED));
            }
            return Ok(SyncAction::Create {
                key: item.key.clone(),
                content: self.renderer.render(item, &citekey, None)?,
                dest,
            });
        };

        if existing.protected {
            return Ok(skip(&item.key, Some(existing.path.clone()), REASON_PROTECTED));
        }

        let rendered = self.renderer.render(item, &citekey, Some(&existing.note))?;
        let comparison = NoteComparator::compare(
            &existing.text,
            &existing.note,
            &rendered,
            &existing.path,
            item,
            self.sync.conflict(),
        )?;

        Ok(SyncActionResolver::resolve(
            item.key.clone(),
            existing.path.clone(),
            rendered,
            existing.text.clone(),
            comparison,
        ))
    }

    /// Apply a plan
    ///
    /// The approver is consulted for conflicts under the `fail` strategy and
    /// for deletions. Per-note failures are collected in the result; an
    /// approver error aborts the run.
    ///
    /// # Errors
    ///
    /// Returns an error if the approver returns an error.
    pub fn execute(
        &self,
        plan: &SyncPlan,
        mut approver: Option<ApprovalCallback<'_>>,
    ) -> Result<SyncResult> {
        let mut result = SyncResult::default();
        let writer = NoteWriter::new(self.dry_run);

        for action in &plan.actions {
            let outcome = match approver.as_mut() {
                Some(approve) if action.needs_approval() => {
                    if approve(action)? {
                        writer.execute_approved(action, &mut result)
                    } else {
                        result.record_skip(REASON_USER_SKIPPED);
                        continue;
                    }
                }
                _ => writer.execute(action, &mut result),
            };

            if let Err(e) = outcome {
                warn!(key = action.key(), "{e:#}");
                result.errors.push(format!("{}: {e:#}", action.key()));
            }
        }

        info!(
            created = result.created,
            updated = result.updated,
            deleted = result.deleted,
            errors = result.errors.len(),
            "sync finished"
        );
        Ok(result)
    }

    /// Plan and apply without interaction
    ///
    /// # Errors
    ///
    /// Returns an error if planning fails.
    pub fn sync(&self, snapshot: &LibrarySnapshot) -> Result<SyncResult> {
        self.sync_with_approver(snapshot, None)
    }

    /// Plan and apply with an optional approval callback
    ///
    /// # Errors
    ///
    /// Returns an error if planning fails or the approver aborts.
    pub fn sync_with_approver(
        &self,
        snapshot: &LibrarySnapshot,
        approver: Option<ApprovalCallback<'_>>,
    ) -> Result<SyncResult> {
        let plan = self.plan(snapshot)?;
        self.execute(&plan, approver)
    }

    /// Load the vault's sync state
    ///
    /// # Errors
    ///
    /// Returns an error if the state file is unreadable.
    pub fn load_state(&self) -> Result<SyncState> {
        SyncState::load(&self.vault_root)
    }

    /// Library version to fetch changes from, if the saved state covers
    /// this engine's library, collection, and folder
    ///
    /// # Errors
    ///
    /// Returns an error if the state file is unreadable.
    pub fn resume_version(&self) -> Result<Option<u64>> {
        let state = self.load_state()?;
        let since = state.since(&self.scope);
        if since.is_none() && state.library_version > 0 {
            info!(
                saved = ?state.scope,
                current = ?self.scope,
                "sync state belongs to another library or folder, fetching everything"
            );
        }
        Ok(since)
    }

    /// Record a finished sync so the next run can be incremental
    ///
    /// Nothing is saved for dry runs or runs with errors. Returns whether
    /// the state was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be written.
    pub fn commit_state(&self, snapshot: &LibrarySnapshot, result: &SyncResult) -> Result<bool> {
        if self.dry_run || !result.is_success() {
            return Ok(false);
        }

        SyncState {
            library_version: snapshot.library_version,
            last_sync: Some(Utc::now()),
            scope: self.scope.clone(),
        }
        .save(&self.vault_root)?;
        Ok(true)
    }
}

fn skip(key: &str, path: Option<PathBuf>, reason: &str) -> SyncAction {
    SyncAction::Skip {
        key: key.to_string(),
        path,
        reason: reason.to_string(),
    }
}
