//! Common types and utilities for command execution

use std::path::Path;

use anyhow::Context;
use litsync_core::config::{Config, ConfigFiles, ConfigManager, ConfigValidator};
use litsync_core::error::ZoteroError;
use litsync_core::sync::SyncEngine;
use litsync_core::zotero::{LibrarySnapshot, ZoteroClient};
use tracing::debug;

use crate::cli::Cli;

/// Execution options shared by all commands
#[allow(clippy::struct_excessive_bools)]
pub struct SyncOptions<'a> {
    /// Enable verbose output
    pub verbose: bool,
    /// Preview changes without applying (dry-run)
    pub dry_run: bool,
    /// Auto-approve all operations without prompting
    pub yes_all: bool,
    /// Path to custom config file
    pub config_path: Option<&'a Path>,
    /// Skip loading all config files
    pub no_config: bool,
    /// Vault directory override
    pub vault: Option<&'a Path>,
    /// Zotero API key override
    pub api_key: Option<&'a str>,
    /// Zotero user id override
    pub user_id: Option<&'a str>,
    /// Zotero group id override
    pub group_id: Option<&'a str>,
    /// Use the local Zotero API
    pub local: bool,
}

impl<'a> SyncOptions<'a> {
    /// Collect the global flags
    #[must_use]
    pub fn from_cli(cli: &'a Cli) -> Self {
        Self {
            verbose: cli.verbose,
            dry_run: cli.dry_run,
            yes_all: cli.yes_all,
            config_path: cli.config.as_deref(),
            no_config: cli.no_config,
            vault: cli.vault.as_deref(),
            api_key: cli.api_key.as_deref(),
            user_id: cli.user_id.as_deref(),
            group_id: cli.group_id.as_deref(),
            local: cli.local,
        }
    }

    /// Load configuration files, then apply flag and environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is invalid or the result fails validation.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = if self.no_config {
            ConfigManager::load_from(&ConfigFiles::default())?
        } else {
            ConfigManager::load(self.config_path)?
        };

        self.apply_overrides(&mut config);
        ConfigValidator::validate(&config).context("Invalid configuration after applying flags")?;

        debug!(
            vault = ?config.vault.path,
            local = config.zotero.is_local(),
            dry_run = ?config.sync.dry_run,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Flags take precedence over config files
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(vault) = self.vault {
            config.vault.path = Some(vault.to_path_buf());
        }
        if let Some(key) = self.api_key {
            config.zotero.api_key = Some(key.to_string());
        }
        if let Some(user) = self.user_id {
            config.zotero.user_id = Some(user.to_string());
            if self.group_id.is_none() {
                config.zotero.group_id = None;
            }
        }
        if let Some(group) = self.group_id {
            config.zotero.group_id = Some(group.to_string());
            if self.user_id.is_none() {
                config.zotero.user_id = None;
            }
        }
        if self.local {
            config.zotero.local = Some(true);
        }
        if self.dry_run {
            config.sync.dry_run = Some(true);
        }
    }

    /// Whether actions should be confirmed at the terminal
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        !self.yes_all && !self.dry_run && dialoguer::console::Term::stderr().is_term()
    }
}

/// Zotero client for the configured library
///
/// # Errors
///
/// Returns an error if credentials are missing or the HTTP client cannot be built.
pub fn zotero_client(config: &Config) -> anyhow::Result<ZoteroClient> {
    ZoteroClient::from_config(&config.zotero).map_err(explain_zotero_error)
}

/// Sync engine for the configured vault and library
///
/// # Errors
///
/// Returns an error if the vault is missing or the configuration is incomplete.
pub fn sync_engine(config: &Config, client: &ZoteroClient) -> anyhow::Result<SyncEngine> {
    SyncEngine::new(config, client.library().clone()).context("Failed to initialize sync engine")
}

/// Fetch the items a sync needs: everything, or what changed since the saved
/// state when that state belongs to the same library, collection, and folder
///
/// # Errors
///
/// Returns an error if the state file is unreadable or a Zotero request fails.
pub fn fetch_snapshot(
    engine: &SyncEngine,
    client: &ZoteroClient,
    full: bool,
) -> anyhow::Result<LibrarySnapshot> {
    let since = if full {
        None
    } else {
        engine.resume_version()?
    };
    debug!(?since, "fetching library");

    client.fetch_snapshot(since).map_err(explain_zotero_error)
}

/// Attach a hint to credential problems
pub fn explain_zotero_error(err: ZoteroError) -> anyhow::Error {
    match err {
        ZoteroError::MissingCredentials(_) => anyhow::Error::new(err)
            .context("Zotero is not configured (pass --api-key and --user-id, or --local)"),
        _ if err.is_auth_error() => anyhow::Error::new(err)
            .context("Zotero rejected the credentials (check zotero.api_key and the library id)"),
        _ => anyhow::Error::new(err).context("Zotero request failed"),
    }
}
