use anyhow::Context;
use litsync_core::config::{ConfigDiscovery, ConfigFiles};
use litsync_core::sync::SyncState;

use super::common::SyncOptions;

pub struct Config;

impl Config {
    pub fn execute(options: &SyncOptions) -> anyhow::Result<()> {
        let files = if options.no_config {
            ConfigFiles::default()
        } else {
            ConfigDiscovery::discover(options.config_path)
        };

        println!("Config files (lowest precedence first):");
        let mut any = false;
        for path in files.in_merge_order() {
            println!("  {}", path.display());
            any = true;
        }
        if !any {
            println!("  (none)");
        }

        let config = options.load_config()?;
        let rendered = toml::to_string_pretty(&config.redacted())
            .context("Failed to serialize configuration")?;

        println!("\nActive configuration:");
        if rendered.trim().is_empty() {
            println!("  (defaults)");
        } else {
            println!("{}", rendered.trim_end());
        }

        println!("\nEffective settings:");
        println!("  vault folder:   {}", config.vault.folder());
        println!("  conflict:       {:?}", config.sync.conflict());
        println!("  finder:         {}", config.search.command());
        match config.zotero.library() {
            Ok(library) => println!("  library:        {}", library.path_prefix()),
            Err(_) => println!("  library:        (not configured)"),
        }
        if let Some(root) = config.vault.root() {
            println!("  state file:     {}", SyncState::path(&root).display());
        }

        Ok(())
    }
}
