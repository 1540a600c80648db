use std::path::Path;

use litsync_core::comparison::DiffGenerator;
use litsync_core::sync::SyncAction;

use super::common::{self, SyncOptions};

pub struct Diff;

impl Diff {
    pub fn execute(keys: &[String], options: &SyncOptions) -> anyhow::Result<()> {
        let config = options.load_config()?;
        let client = common::zotero_client(&config)?;
        let engine = common::sync_engine(&config, &client)?;

        // A partial snapshot would hide notes whose items did not change
        let snapshot = common::fetch_snapshot(&engine, &client, true)?;
        let plan = engine.plan(&snapshot)?;

        let mut shown = 0usize;
        for action in plan.changes().filter(|a| Self::selected(a, keys)) {
            let Some(diff) = Self::render(action, engine.vault_root()) else {
                continue;
            };
            println!("{diff}");
            shown += 1;
        }

        if shown == 0 {
            println!("No differences.");
        }
        Ok(())
    }

    fn selected(action: &SyncAction, keys: &[String]) -> bool {
        keys.is_empty() || keys.iter().any(|k| k == action.key())
    }

    fn render(action: &SyncAction, vault_root: &Path) -> Option<String> {
        let label = |p: &Path| p.strip_prefix(vault_root).unwrap_or(p).display().to_string();
        match action {
            SyncAction::Update {
                dest,
                content,
                current,
                ..
            }
            | SyncAction::Conflict {
                dest,
                content,
                current,
                ..
            } => Some(DiffGenerator::generate(current, content, &label(dest))),
            SyncAction::Create { dest, content, .. } => {
                Some(DiffGenerator::generate_addition(content, &label(dest)))
            }
            SyncAction::Delete { path, current, .. } => {
                Some(DiffGenerator::generate(current, "", &label(path)))
            }
            SyncAction::Skip { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn update(key: &str) -> SyncAction {
        SyncAction::Update {
            key: key.to_string(),
            dest: PathBuf::from("/vault/Literature/a.md"),
            content: "title: new\n".to_string(),
            current: "title: old\n".to_string(),
        }
    }

    #[test]
    fn test_key_selection() {
        assert!(Diff::selected(&update("AAAA1111"), &[]));
        assert!(Diff::selected(&update("AAAA1111"), &["AAAA1111".to_string()]));
        assert!(!Diff::selected(&update("AAAA1111"), &["BBBB2222".to_string()]));
    }

    #[test]
    fn test_render_uses_vault_relative_label() {
        let diff = Diff::render(&update("K"), Path::new("/vault")).unwrap();

        assert!(diff.contains("Literature/a.md"));
        assert!(!diff.contains("/vault/"));
    }
}
