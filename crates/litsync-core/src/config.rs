//! Configuration file parsing, merging, and pattern matching
//!
//! This module handles:
//! - Config file discovery (CLI flag, project `.litsync.toml`, global XDG config)
//! - TOML parsing with serde
//! - Config merging with precedence rules
//! - Gitignore-style patterns protecting vault notes
//! - Validation and error reporting

mod discovery;
mod merge;
mod patterns;
mod types;
mod validation;

#[cfg(test)]
mod integration_tests;

pub use discovery::{ConfigDiscovery, ConfigFiles, PROJECT_CONFIG_NAME};
pub use merge::ConfigMerger;
pub use patterns::PatternMatcher;
pub use types::{
    Config, DEFAULT_FINDER, DEFAULT_FOLDER, SearchConfig, SyncConfig, VaultConfig, ZoteroConfig,
    expand_tilde,
};
pub use validation::ConfigValidator;

use std::path::Path;

use crate::error::Result;

/// Configuration manager that coordinates discovery, parsing, merging, and validation
pub struct ConfigManager;

impl ConfigManager {
    /// Load and merge configuration from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if config files are invalid or cannot be read.
    pub fn load(cli_config_path: Option<&Path>) -> Result<Config> {
        let config_files = ConfigDiscovery::discover(cli_config_path);
        Self::load_from(&config_files)
    }

    /// Merge and validate an explicit set of config files
    ///
    /// # Errors
    ///
    /// Returns an error if config files are invalid or cannot be read.
    pub fn load_from(files: &ConfigFiles) -> Result<Config> {
        let merged = ConfigMerger::merge(files)?;
        ConfigValidator::validate(&merged)?;
        Ok(merged)
    }
}
