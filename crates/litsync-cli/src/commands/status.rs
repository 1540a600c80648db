use litsync_core::sync::SyncReporter;

use super::common::{self, SyncOptions};

pub struct Status;

impl Status {
    pub fn execute(full: bool, options: &SyncOptions) -> anyhow::Result<()> {
        let config = options.load_config()?;
        let client = common::zotero_client(&config)?;
        let engine = common::sync_engine(&config, &client)?;

        let state = engine.load_state()?;
        println!("Vault:   {}", engine.folder_path().display());
        match state.last_sync {
            Some(at) => println!(
                "Synced:  {} (library version {})",
                at.format("%Y-%m-%d %H:%M:%S UTC"),
                state.library_version
            ),
            None => println!("Synced:  never"),
        }
        println!();

        let snapshot = common::fetch_snapshot(&engine, &client, full)?;
        let plan = engine.plan(&snapshot)?;

        for warning in &plan.warnings {
            println!("warning: {warning}");
        }
        print!("{}", SyncReporter::describe_plan(&plan, engine.vault_root()));

        if !snapshot.complete && options.verbose {
            println!("(incremental: only items changed since version {})", state.library_version);
        }
        Ok(())
    }
}
