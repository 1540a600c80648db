//! Sync operation reporting and statistics

use std::fmt::Write;
use std::path::Path;

use super::SyncResult;
use super::actions::{REASON_UP_TO_DATE, SyncAction};
use super::orchestrator::SyncPlan;

/// Sync operation reporter
pub struct SyncReporter;

impl SyncReporter {
    /// Generate a summary report
    #[must_use]
    pub fn generate_summary(result: &SyncResult) -> String {
        let mut output = String::new();

        output.push_str("\n=== Sync Summary ===\n");
        let _ = writeln!(output, "Created:  {}", result.created);
        let _ = writeln!(output, "Updated:  {}", result.updated);
        let _ = writeln!(output, "Deleted:  {}", result.deleted);

        if result.skipped > 0 && !result.skip_reasons.is_empty() {
            let _ = write!(output, "Skipped:  {}", result.skipped);
            let mut reasons: Vec<_> = result.skip_reasons.iter().collect();
            reasons.sort_by_key(|(_, count)| std::cmp::Reverse(**count));
            for (reason, count) in reasons {
                let _ = write!(output, " ({reason}: {count})");
            }
            let _ = writeln!(output);
        } else {
            let _ = writeln!(output, "Skipped:  {}", result.skipped);
        }

        let _ = writeln!(output, "Conflicts: {}", result.conflicts);

        if !result.errors.is_empty() {
            let _ = writeln!(output, "\nErrors ({}):", result.errors.len());
            for error in &result.errors {
                let _ = writeln!(output, "  - {error}");
            }
        }

        let _ = writeln!(output, "\nTotal operations: {}", result.total_operations());

        if result.is_success() {
            output.push_str("Status: ✓ Success\n");
        } else {
            output.push_str("Status: ✗ Completed with errors\n");
        }

        output
    }

    /// Describe pending changes, one line per note, paths relative to the vault
    #[must_use]
    pub fn describe_plan(plan: &SyncPlan, vault_root: &Path) -> String {
        let mut output = String::new();
        let mut unchanged = 0usize;
        let mut kept = 0usize;

        for action in &plan.actions {
            if let SyncAction::Skip { reason, path, key } = action {
                if reason == REASON_UP_TO_DATE {
                    unchanged += 1;
                } else {
                    let shown = path
                        .as_deref()
                        .map_or_else(|| key.clone(), |p| relative(p, vault_root));
                    let _ = writeln!(output, "  {:<9} {shown} ({reason})", action.label());
                    kept += 1;
                }
                continue;
            }

            let shown = action
                .path()
                .map_or_else(|| action.key().to_string(), |p| relative(p, vault_root));
            let _ = writeln!(output, "  {:<9} {shown}", action.label());
        }

        let changes = plan.changes().count();
        if changes == 0 && kept == 0 {
            output.push_str("Vault is up to date.\n");
        }

        let _ = writeln!(
            output,
            "\n{changes} change(s), {unchanged} up to date, {} excluded by item type",
            plan.excluded
        );
        output
    }
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_summary_lists_skip_reasons_by_count() {
        let mut result = SyncResult {
            created: 2,
            ..SyncResult::default()
        };
        result.record_skip("up to date");
        result.record_skip("up to date");
        result.record_skip("has user notes");

        let summary = SyncReporter::generate_summary(&result);

        assert!(summary.contains("Created:  2"));
        assert!(summary.contains("Skipped:  3 (up to date: 2) (has user notes: 1)"));
        assert!(summary.contains("Status: ✓ Success"));
    }

    #[test]
    fn test_describe_plan() {
        let root = Path::new("/vault");
        let plan = SyncPlan {
            actions: vec![
                SyncAction::Create {
                    key: "A".to_string(),
                    dest: PathBuf::from("/vault/Literature/a.md"),
                    content: String::new(),
                },
                SyncAction::Skip {
                    key: "B".to_string(),
                    path: Some(PathBuf::from("/vault/Literature/b.md")),
                    reason: "up to date".to_string(),
                },
                SyncAction::Skip {
                    key: "C".to_string(),
                    path: Some(PathBuf::from("/vault/Literature/c.md")),
                    reason: "removed from library".to_string(),
                },
            ],
            warnings: Vec::new(),
            excluded: 1,
        };

        let text = SyncReporter::describe_plan(&plan, root);

        assert!(text.contains("new       Literature/a.md"));
        assert!(text.contains("skip      Literature/c.md (removed from library)"));
        assert!(!text.contains("b.md"));
        assert!(text.contains("1 change(s), 1 up to date, 1 excluded by item type"));
    }

    #[test]
    fn test_describe_empty_plan() {
        let text = SyncReporter::describe_plan(&SyncPlan::default(), Path::new("/vault"));

        assert!(text.contains("Vault is up to date."));
    }
}
