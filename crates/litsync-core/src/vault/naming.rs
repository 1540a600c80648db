//! Note file naming and collision handling

use std::collections::HashSet;
use std::path::{Path, PathBuf};

const MAX_STEM_LEN: usize = 80;

/// Allocates note paths inside the literature folder
///
/// Paths are compared case-insensitively so that two notes never differ
/// only by case on case-insensitive file systems.
#[derive(Debug, Default)]
pub struct NoteNamer {
    taken: HashSet<String>,
}

impl NoteNamer {
    /// Namer that avoids every path in `existing`
    pub fn new<'a>(existing: impl IntoIterator<Item = &'a Path>) -> Self {
        Self {
            taken: existing.into_iter().map(Self::fold).collect(),
        }
    }

    /// Reserve and return a file path for a new note
    ///
    /// The stem is the sanitized citation key; if that is taken the item
    /// key is appended.
    pub fn allocate(&mut self, folder: &Path, citekey: &str, item_key: &str) -> PathBuf {
        let base = sanitize_stem(citekey);
        let base = if base.is_empty() { sanitize_stem(item_key) } else { base };

        let mut candidate = folder.join(format!("{base}.md"));
        if self.taken.contains(&Self::fold(&candidate)) {
            candidate = folder.join(format!("{base}-{item_key}.md"));
        }

        let mut n = 2;
        while self.taken.contains(&Self::fold(&candidate)) {
            candidate = folder.join(format!("{base}-{item_key}-{n}.md"));
            n += 1;
        }

        self.taken.insert(Self::fold(&candidate));
        candidate
    }

    fn fold(path: &Path) -> String {
        path.to_string_lossy().to_lowercase()
    }
}

/// Make a string safe as a file stem and as a Silverbullet page name
#[must_use]
pub fn sanitize_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    let mut last_dash = false;

    for c in name.chars() {
        if c.is_alphanumeric() || c == '_' || c == '.' {
            stem.push(c);
            last_dash = false;
        } else if !last_dash {
            stem.push('-');
            last_dash = true;
        }
    }

    let trimmed = stem.trim_matches(|c| c == '-' || c == '.');
    trimmed.chars().take(MAX_STEM_LEN).collect()
}

/// Silverbullet page name: vault-relative path without `.md`, `/`-separated
#[must_use]
pub fn page_name(vault_root: &Path, note: &Path) -> String {
    let rel = note.strip_prefix(vault_root).unwrap_or(note);
    let rel = rel.with_extension("");
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_stem() {
        assert_eq!(sanitize_stem("smith2020deep"), "smith2020deep");
        assert_eq!(sanitize_stem("smith:2020 / deep?"), "smith-2020-deep");
        assert_eq!(sanitize_stem("..hidden"), "hidden");
        assert_eq!(sanitize_stem(&"a".repeat(200)).len(), MAX_STEM_LEN);
    }

    #[test]
    fn test_allocate_unique_names() {
        let folder = Path::new("/vault/Literature");
        let existing = folder.join("smith2020deep.md");
        let mut namer = NoteNamer::new([existing.as_path()]);

        let first = namer.allocate(folder, "smith2020deep", "ABCD2345");
        let second = namer.allocate(folder, "jones2019", "EFGH6789");

        assert_eq!(first, folder.join("smith2020deep-ABCD2345.md"));
        assert_eq!(second, folder.join("jones2019.md"));
    }

    #[test]
    fn test_allocate_is_case_insensitive() {
        let folder = Path::new("/vault/Literature");
        let mut namer = NoteNamer::default();

        let first = namer.allocate(folder, "Smith2020", "AAAA1111");
        let second = namer.allocate(folder, "smith2020", "BBBB2222");

        assert_eq!(first, folder.join("Smith2020.md"));
        assert_eq!(second, folder.join("smith2020-BBBB2222.md"));
    }

    #[test]
    fn test_empty_citekey_uses_item_key() {
        let folder = Path::new("/v");
        let mut namer = NoteNamer::default();

        assert_eq!(namer.allocate(folder, "???", "ABCD2345"), folder.join("ABCD2345.md"));
    }

    #[test]
    fn test_page_name() {
        let root = Path::new("/vault");
        let note = root.join("Literature").join("smith2020deep.md");

        assert_eq!(page_name(root, &note), "Literature/smith2020deep");
    }
}
