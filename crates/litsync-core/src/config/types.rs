//! Configuration types and structures

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::comparison::ConflictStrategy;
use crate::zotero::{Library, ZoteroError};

/// Default folder for literature notes, relative to the vault root
pub const DEFAULT_FOLDER: &str = "Literature";

/// Default fuzzy finder executable
pub const DEFAULT_FINDER: &str = "fzf";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Zotero library access
    pub zotero: ZoteroConfig,
    /// Target vault layout
    pub vault: VaultConfig,
    /// Sync behavior
    pub sync: SyncConfig,
    /// Fuzzy search
    pub search: SearchConfig,
}

/// `[zotero]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ZoteroConfig {
    /// Web API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Personal library id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Group library id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Read from the Zotero desktop local API instead of the web API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<bool>,
    /// API base URL override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Only sync the top-level items of this collection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Retries when the server asks to back off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

/// `[vault]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault root directory (`~` is expanded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Folder holding literature notes, relative to the vault root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    /// Tag added to every literature note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Base URL of the Silverbullet server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silverbullet_url: Option<String>,
    /// Gitignore-style patterns (vault-relative) for notes litsync must not touch
    pub ignore: Vec<String>,
    /// Patterns re-including notes matched by `ignore`
    pub include: Vec<String>,
}

/// `[sync]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SyncConfig {
    /// How to resolve notes whose managed block was edited by hand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<ConflictStrategy>,
    /// Delete notes whose item left the library
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prune: Option<bool>,
    /// Preview changes without writing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    /// Only sync these item types (empty = all)
    pub item_types: Vec<String>,
    /// Item types never synced, on top of attachments, notes, and annotations
    pub exclude_item_types: Vec<String>,
}

/// `[search]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchConfig {
    /// Fuzzy finder executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Extra arguments passed to the finder
    pub args: Vec<String>,
}

impl ZoteroConfig {
    /// Whether the local API is used
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.local == Some(true)
    }

    /// Request timeout
    #[must_use]
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Backoff retries
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    /// Library selected by this configuration
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` if web mode has no user or group id.
    pub fn library(&self) -> Result<Library, ZoteroError> {
        if self.is_local() {
            return Ok(Library::Local);
        }

        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        match (non_empty(&self.group_id), non_empty(&self.user_id)) {
            (Some(group), _) => Ok(Library::Group(group)),
            (None, Some(user)) => Ok(Library::User(user)),
            (None, None) => Err(ZoteroError::MissingCredentials("zotero.user_id or zotero.group_id")),
        }
    }

    /// Copy with the API key hidden, for display
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            api_key: self.api_key.as_ref().map(|_| "********".to_string()),
            ..self.clone()
        }
    }
}

impl VaultConfig {
    /// Vault root with `~` expanded, if configured
    #[must_use]
    pub fn root(&self) -> Option<PathBuf> {
        self.path.as_deref().map(expand_tilde)
    }

    /// Existing vault root, canonicalized
    ///
    /// # Errors
    ///
    /// Returns an error if no vault is configured or it is not a directory.
    pub fn canonical_root(&self) -> crate::error::Result<PathBuf> {
        let root = self
            .root()
            .context("No vault configured (set vault.path or pass --vault)")?;
        let root = dunce::canonicalize(&root)
            .with_context(|| format!("Vault directory not found: {}", root.display()))?;
        if !root.is_dir() {
            anyhow::bail!("Vault path is not a directory: {}", root.display());
        }
        Ok(root)
    }

    /// Literature folder, relative to the vault root
    #[must_use]
    pub fn folder(&self) -> &str {
        self.folder
            .as_deref()
            .map(|f| f.trim_matches('/'))
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_FOLDER)
    }

    /// Tag added to every literature note
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

impl SyncConfig {
    /// Conflict strategy, `fail` unless configured
    #[must_use]
    pub fn conflict(&self) -> ConflictStrategy {
        self.conflict.unwrap_or(ConflictStrategy::Fail)
    }

    /// Whether an item type is synced
    #[must_use]
    pub fn accepts_item_type(&self, item_type: &str) -> bool {
        if self.exclude_item_types.iter().any(|t| t == item_type) {
            return false;
        }
        self.item_types.is_empty() || self.item_types.iter().any(|t| t == item_type)
    }
}

impl SearchConfig {
    /// Finder executable
    #[must_use]
    pub fn command(&self) -> &str {
        self.command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_FINDER)
    }
}

impl Config {
    /// Copy safe to print
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            zotero: self.zotero.redacted(),
            ..self.clone()
        }
    }
}

/// Expand a leading `~` to the home directory
#[must_use]
pub fn expand_tilde(path: &std::path::Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.vault.ignore.is_empty());
        assert_eq!(config.vault.folder(), DEFAULT_FOLDER);
        assert_eq!(config.sync.conflict(), ConflictStrategy::Fail);
        assert_eq!(config.search.command(), "fzf");
        assert_eq!(config.zotero.timeout_secs(), 30);
    }

    #[test]
    fn test_parse_sections() {
        let config: Config = toml::from_str(
            r#"
[zotero]
api_key = "k"
user_id = "12"

[vault]
path = "/notes"
folder = "/Papers/"

[sync]
conflict = "newer"
exclude_item_types = ["webpage"]
"#,
        )
        .unwrap();

        assert_eq!(config.vault.folder(), "Papers");
        assert_eq!(config.sync.conflict(), ConflictStrategy::Newer);
        assert!(!config.sync.accepts_item_type("webpage"));
        assert!(config.sync.accepts_item_type("book"));
        assert_eq!(config.zotero.library().unwrap(), Library::User("12".to_string()));
    }

    #[test]
    fn test_library_selection() {
        let local = ZoteroConfig {
            local: Some(true),
            ..ZoteroConfig::default()
        };
        assert_eq!(local.library().unwrap(), Library::Local);

        let group = ZoteroConfig {
            group_id: Some("5".to_string()),
            ..ZoteroConfig::default()
        };
        assert_eq!(group.library().unwrap(), Library::Group("5".to_string()));

        assert!(ZoteroConfig::default().library().is_err());
    }

    #[test]
    fn test_item_type_allow_list() {
        let sync = SyncConfig {
            item_types: vec!["book".to_string()],
            ..SyncConfig::default()
        };

        assert!(sync.accepts_item_type("book"));
        assert!(!sync.accepts_item_type("journalArticle"));
    }

    #[test]
    fn test_redacted_hides_api_key() {
        let mut config = Config::default();
        config.zotero.api_key = Some("very-secret".to_string());

        let shown = toml::to_string(&config.redacted()).unwrap();
        assert!(!shown.contains("very-secret"));
        assert!(shown.contains("********"));
    }

    #[test]
    fn test_expand_tilde() {
        let plain = std::path::Path::new("/abs/path");
        assert_eq!(expand_tilde(plain), PathBuf::from("/abs/path"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde(std::path::Path::new("~/notes")), home.join("notes"));
        }
    }
}
