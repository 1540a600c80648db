use anyhow::Context;
use litsync_core::config::Config;
use litsync_core::sync::{ApprovalCallback, SyncAction, SyncReporter};
use tracing::{info, warn};

use super::common::{self, SyncOptions};
use crate::cli::SyncArgs;
use crate::interactive::{InteractivePrompter, USER_ABORTED};

/// Outcome of a sync run, mapped to the exit code by `main`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Everything applied
    Success,
    /// Some notes failed; details are in the summary
    CompletedWithErrors,
    /// User quit at the prompt
    Cancelled,
}

pub struct Sync;

impl Sync {
    pub fn execute(args: &SyncArgs, options: &SyncOptions) -> anyhow::Result<SyncOutcome> {
        let mut config = options.load_config()?;
        Self::merge_cli_flags(&mut config, args);

        if options.verbose {
            let vault = config
                .vault
                .root()
                .map_or_else(|| "(not set)".to_string(), |p| p.display().to_string());
            println!("Vault: {vault}");
            println!("Conflict mode: {:?}", config.sync.conflict());
            println!("Dry run: {}", config.sync.dry_run == Some(true));
        }

        let client = common::zotero_client(&config)?;
        let engine = common::sync_engine(&config, &client)?;
        let snapshot = common::fetch_snapshot(&engine, &client, args.full)?;
        info!(
            items = snapshot.items.len(),
            deleted = snapshot.deleted.len(),
            complete = snapshot.complete,
            "fetched library"
        );

        let plan = engine.plan(&snapshot).context("Failed to plan sync")?;
        for warning in &plan.warnings {
            warn!("{warning}");
        }

        let approver: Option<ApprovalCallback<'_>> = if options.is_interactive() {
            let mut prompter = InteractivePrompter::new();
            Some(Box::new(move |action: &SyncAction| prompter.prompt(action)))
        } else {
            None
        };

        let result = match engine.execute(&plan, approver) {
            Ok(result) => result,
            Err(e) if e.to_string().contains(USER_ABORTED) => {
                eprintln!("\nSync cancelled by user.");
                return Ok(SyncOutcome::Cancelled);
            }
            Err(e) => return Err(e).context("Sync operation failed"),
        };

        println!("{}", SyncReporter::generate_summary(&result));

        if engine.commit_state(&snapshot, &result)? {
            info!(version = snapshot.library_version, "saved sync state");
        }

        Ok(if result.is_success() {
            SyncOutcome::Success
        } else {
            SyncOutcome::CompletedWithErrors
        })
    }

    /// CLI flags override config file settings
    fn merge_cli_flags(config: &mut Config, args: &SyncArgs) {
        if let Some(mode) = args.conflict {
            config.sync.conflict = Some(mode.into());
        }
        if args.prune {
            config.sync.prune = Some(true);
        }
    }
}
