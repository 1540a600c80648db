//! Integration tests for configuration module

use std::fs;
use tempfile::TempDir;

use super::{ConfigFiles, ConfigManager, PatternMatcher};
use crate::comparison::ConflictStrategy;
use crate::zotero::Library;

#[test]
fn test_full_config_workflow() {
    let tmp = TempDir::new().unwrap();
    let config_file = tmp.path().join("config.toml");

    fs::write(
        &config_file,
        r#"
[zotero]
api_key = "abc"
group_id = "4711"
collection = "COLL0001"

[vault]
path = "~/vault"
folder = "Reading/Papers"
tag = "literature"
silverbullet_url = "https://notes.example.org"
ignore = ["Reading/Papers/keep/"]

[sync]
conflict = "skip"
prune = true

[search]
command = "sk"
args = ["--height=40%"]
"#,
    )
    .unwrap();

    let files = ConfigFiles {
        cli: Some(config_file),
        ..ConfigFiles::default()
    };
    let config = ConfigManager::load_from(&files).unwrap();

    assert_eq!(config.zotero.library().unwrap(), Library::Group("4711".to_string()));
    assert_eq!(config.vault.folder(), "Reading/Papers");
    assert_eq!(config.vault.tag(), Some("literature"));
    assert_eq!(config.sync.conflict(), ConflictStrategy::Skip);
    assert_eq!(config.sync.prune, Some(true));
    assert_eq!(config.search.command(), "sk");

    let matcher = PatternMatcher::with_patterns(&config.vault.ignore, &config.vault.include).unwrap();
    assert!(!matcher.allows(std::path::Path::new("Reading/Papers/keep/x.md")));
}

#[test]
fn test_invalid_config_validation() {
    let tmp = TempDir::new().unwrap();
    let config_file = tmp.path().join("config.toml");

    fs::write(
        &config_file,
        r#"
[zotero]
user_id = "1"
group_id = "2"
"#,
    )
    .unwrap();

    let files = ConfigFiles {
        cli: Some(config_file),
        ..ConfigFiles::default()
    };
    let result = ConfigManager::load_from(&files);

    assert!(result.is_err());
}

#[test]
fn test_unknown_conflict_strategy_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_file = tmp.path().join("config.toml");
    fs::write(&config_file, "[sync]\nconflict = \"merge\"\n").unwrap();

    let files = ConfigFiles {
        cli: Some(config_file),
        ..ConfigFiles::default()
    };

    assert!(ConfigManager::load_from(&files).is_err());
}
