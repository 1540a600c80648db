use anyhow::Context;
use litsync_core::config::{Config, PatternMatcher};
use litsync_core::search::{FuzzyFinder, SearchEntry, SearchIndex, page_url};
use litsync_core::vault::VaultScanner;
use tracing::warn;

use super::common::SyncOptions;

pub struct Search;

impl Search {
    pub fn execute(
        query: Option<&str>,
        filter: bool,
        url: bool,
        options: &SyncOptions,
    ) -> anyhow::Result<()> {
        let config = options.load_config()?;
        if url && config.vault.silverbullet_url.is_none() {
            anyhow::bail!("--url needs vault.silverbullet_url in the config");
        }
        let index = Self::build_index(&config)?;

        if index.is_empty() {
            println!("No synced notes found. Run `litsync sync` first.");
            return Ok(());
        }

        let finder = FuzzyFinder::new(config.search.command(), config.search.args.clone());
        let lines = index.lines();

        let selected = match (filter, query) {
            (true, Some(q)) => finder.filter(&lines, q)?,
            _ => finder.select(&lines, query)?.unwrap_or_default(),
        };

        for line in &selected {
            let Some(entry) = index.resolve(line) else {
                warn!("Finder returned an unknown line: {line}");
                continue;
            };
            println!("{}", Self::output(entry, &config, url)?);
        }

        Ok(())
    }

    fn build_index(config: &Config) -> anyhow::Result<SearchIndex> {
        let root = config.vault.canonical_root()?;

        let matcher = PatternMatcher::new();
        let scan = VaultScanner::new(&root, &matcher).scan(config.vault.folder())?;
        for warning in &scan.warnings {
            warn!("{warning}");
        }
        Ok(SearchIndex::from_vault(&scan, &root))
    }

    fn output(entry: &SearchEntry, config: &Config, url: bool) -> anyhow::Result<String> {
        if !url {
            return Ok(entry.path.display().to_string());
        }

        let base = config
            .vault
            .silverbullet_url
            .as_deref()
            .context("--url needs vault.silverbullet_url in the config")?;
        Ok(page_url(base, &entry.page))
    }
}
