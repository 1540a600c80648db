//! Configuration merging with precedence rules
//!
//! # Merging Semantics
//!
//! - **Scalars** (`Option<T>`): a higher-precedence file that sets a value replaces the lower one
//! - **Arrays** (ignore, include, item types, finder args): additive across all files

use std::fs;
use std::path::Path;

use anyhow::Context;

use super::discovery::ConfigFiles;
use super::types::{Config, SearchConfig, SyncConfig, VaultConfig, ZoteroConfig};
use crate::error::Result;

/// Configuration merger
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge multiple config files with precedence rules
    ///
    /// Precedence order (highest to lowest):
    /// 1. CLI config
    /// 2. .litsync.toml
    /// 3. Global config
    ///
    /// # Errors
    ///
    /// Returns an error if config files cannot be read or parsed.
    pub fn merge(files: &ConfigFiles) -> Result<Config> {
        let mut merged = Config::default();

        for path in files.in_merge_order() {
            let layer = Self::load(path)?;
            Self::merge_layer(&mut merged, layer);
        }

        Ok(merged)
    }

    /// Parse a single config file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Apply `layer` on top of `base`
    pub fn merge_layer(base: &mut Config, layer: Config) {
        Self::merge_zotero(&mut base.zotero, layer.zotero);
        Self::merge_vault(&mut base.vault, layer.vault);
        Self::merge_sync(&mut base.sync, layer.sync);
        Self::merge_search(&mut base.search, layer.search);
    }

    fn merge_zotero(base: &mut ZoteroConfig, layer: ZoteroConfig) {
        override_with(&mut base.api_key, layer.api_key);
        override_with(&mut base.user_id, layer.user_id);
        override_with(&mut base.group_id, layer.group_id);
        override_with(&mut base.local, layer.local);
        override_with(&mut base.base_url, layer.base_url);
        override_with(&mut base.collection, layer.collection);
        override_with(&mut base.timeout_secs, layer.timeout_secs);
        override_with(&mut base.max_retries, layer.max_retries);
    }

    fn merge_vault(base: &mut VaultConfig, layer: VaultConfig) {
        override_with(&mut base.path, layer.path);
        override_with(&mut base.folder, layer.folder);
        override_with(&mut base.tag, layer.tag);
        override_with(&mut base.silverbullet_url, layer.silverbullet_url);
        base.ignore.extend(layer.ignore);
        base.include.extend(layer.include);
    }

    fn merge_sync(base: &mut SyncConfig, layer: SyncConfig) {
        override_with(&mut base.conflict, layer.conflict);
        override_with(&mut base.prune, layer.prune);
        override_with(&mut base.dry_run, layer.dry_run);
        base.item_types.extend(layer.item_types);
        base.exclude_item_types.extend(layer.exclude_item_types);
    }

    fn merge_search(base: &mut SearchConfig, layer: SearchConfig) {
        override_with(&mut base.command, layer.command);
        base.args.extend(layer.args);
    }
}

fn override_with<T>(base: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *base = value;
    }
}
