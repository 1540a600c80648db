//! Persistent sync state kept inside the vault

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Directory below the vault root holding litsync state
pub const STATE_DIR: &str = ".litsync";

const STATE_FILE: &str = "state.toml";

/// Library, collection, and folder a saved library version belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncScope {
    /// Library path prefix, e.g. `/users/1`
    pub library: String,
    /// Collection the sync was limited to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Literature folder, relative to the vault root
    pub folder: String,
}

/// What the last successful sync saw
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncState {
    /// Zotero library version at the last successful sync
    pub library_version: u64,
    /// When that sync finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    /// Where that version was read from and written to
    pub scope: SyncScope,
}

impl SyncState {
    /// Location of the state file for a vault
    #[must_use]
    pub fn path(vault_root: &Path) -> PathBuf {
        vault_root.join(STATE_DIR).join(STATE_FILE)
    }

    /// Load the state of a vault; a missing file means "never synced"
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(vault_root: &Path) -> Result<Self> {
        let path = Self::path(vault_root);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read sync state: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse sync state: {}", path.display()))
    }

    /// Write the state file, creating its directory
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, vault_root: &Path) -> Result<()> {
        let path = Self::path(vault_root);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = toml::to_string(self).context("Failed to serialize sync state")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write sync state: {}", path.display()))
    }

    /// Library version to pass as `since`, if a previous sync covered `scope`
    ///
    /// A version saved for another library, collection, or folder says
    /// nothing about `scope`, so the next sync must fetch everything.
    #[must_use]
    pub fn since(&self, scope: &SyncScope) -> Option<u64> {
        if self.library_version > 0 && self.scope == *scope {
            Some(self.library_version)
        } else {
            None
        }
    }
}
