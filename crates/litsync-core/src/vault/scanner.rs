//! Vault scanning: indexes literature notes by Zotero key

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::{DirEntry, WalkDir};

use super::note::Note;
use crate::config::PatternMatcher;
use crate::error::Result;

/// A literature note found in the vault
#[derive(Debug, Clone)]
pub struct IndexedNote {
    /// Absolute path of the note
    pub path: PathBuf,
    /// Path relative to the vault root
    pub rel_path: PathBuf,
    /// Raw file content
    pub text: String,
    /// Parsed note
    pub note: Note,
    /// Whether ignore patterns forbid touching this note
    pub protected: bool,
}

/// Result of scanning the literature folder
#[derive(Debug, Default)]
pub struct VaultIndex {
    /// Notes carrying a Zotero key, by key
    pub notes: BTreeMap<String, IndexedNote>,
    /// Every markdown file in the folder, keyed or not
    pub paths: Vec<PathBuf>,
    /// Non-fatal problems encountered during scanning
    pub warnings: Vec<String>,
}

impl VaultIndex {
    /// Note for a Zotero key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&IndexedNote> {
        self.notes.get(key)
    }
}

/// Scans a vault's literature folder
pub struct VaultScanner<'a> {
    vault_root: &'a Path,
    matcher: &'a PatternMatcher,
}

impl<'a> VaultScanner<'a> {
    /// Create a scanner for `vault_root`
    #[must_use]
    pub const fn new(vault_root: &'a Path, matcher: &'a PatternMatcher) -> Self {
        Self {
            vault_root,
            matcher,
        }
    }

    /// Index all notes below `<vault_root>/<folder>`
    ///
    /// A missing folder yields an empty index.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be traversed.
    pub fn scan(&self, folder: &str) -> Result<VaultIndex> {
        let root = self.vault_root.join(folder);
        let mut index = VaultIndex::default();

        if !root.exists() {
            return Ok(index);
        }

        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }

            let path = entry.into_path();
            index.paths.push(path.clone());

            if let Err(e) = self.index_note(&path, &mut index) {
                index.warnings.push(format!("Skipping {}: {e:#}", path.display()));
            }
        }

        Ok(index)
    }

    fn index_note(&self, path: &Path, index: &mut VaultIndex) -> Result<()> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read note: {}", path.display()))?;
        let note = Note::parse(&text)?;

        let Some(key) = note.zotero_key().map(str::to_string) else {
            return Ok(());
        };

        if let Some(first) = index.notes.get(&key) {
            index.warnings.push(format!(
                "Duplicate zotero-key {key} in {} (already indexed from {})",
                path.display(),
                first.path.display()
            ));
            return Ok(());
        }

        let rel_path = path
            .strip_prefix(self.vault_root)
            .with_context(|| format!("Failed to strip prefix from {}", path.display()))?
            .to_path_buf();
        let protected = !self.matcher.allows(&rel_path);

        index.notes.insert(
            key,
            IndexedNote {
                path: path.to_path_buf(),
                rel_path,
                text,
                note,
                protected,
            },
        );
        Ok(())
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|s| s.starts_with('.'))
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}
