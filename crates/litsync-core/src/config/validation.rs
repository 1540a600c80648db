//! Configuration validation and error reporting

use std::path::{Component, Path};

use super::types::Config;
use crate::error::Result;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a configuration
    ///
    /// Credentials are not checked here; they are only required once a
    /// command talks to Zotero.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(config: &Config) -> Result<()> {
        let zotero = &config.zotero;
        if zotero.user_id.is_some() && zotero.group_id.is_some() {
            anyhow::bail!("Conflicting configuration: both zotero.user_id and zotero.group_id are set");
        }

        if zotero.timeout_secs == Some(0) {
            anyhow::bail!("zotero.timeout_secs must be > 0");
        }

        let folder = Path::new(config.vault.folder());
        if folder
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            anyhow::bail!(
                "vault.folder must be a relative path inside the vault: '{}'",
                folder.display()
            );
        }

        if let Some(url) = &config.vault.silverbullet_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("vault.silverbullet_url must start with http:// or https://: '{url}'");
            }
        }

        for pattern in &config.vault.ignore {
            if pattern.trim().is_empty() {
                anyhow::bail!("Ignore pattern cannot be empty");
            }
        }

        for pattern in &config.vault.include {
            if pattern.trim().is_empty() {
                anyhow::bail!("Include pattern cannot be empty");
            }
        }

        for item_type in config.sync.item_types.iter().chain(&config.sync.exclude_item_types) {
            if item_type.trim().is_empty() {
                anyhow::bail!("Item type cannot be empty");
            }
        }

        Ok(())
    }
}
