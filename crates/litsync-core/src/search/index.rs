//! Search entries built from synced notes

use std::fmt::Write;
use std::path::{Path, PathBuf};

use serde_yml::Value;

use crate::vault::{IndexedNote, VaultIndex, page_name};

/// One synced note as offered to the finder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    /// Silverbullet page name
    pub page: String,
    /// Absolute note path
    pub path: PathBuf,
    /// Citation key
    pub citekey: String,
    /// Title
    pub title: String,
    /// Authors joined by `, `
    pub authors: String,
    /// Publication year
    pub year: Option<u64>,
}

impl SearchEntry {
    fn from_note(vault_root: &Path, key: &str, indexed: &IndexedNote) -> Self {
        let note = &indexed.note;
        let page = page_name(vault_root, &indexed.path);

        let citekey = note
            .get_str("citekey")
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(key)
            .to_string();
        let title = note
            .get_str("title")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map_or_else(|| page.rsplit('/').next().unwrap_or(&page).to_string(), str::to_string);

        let authors = match note.frontmatter.get("authors") {
            Some(Value::Sequence(seq)) => seq
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        };

        let year = match note.frontmatter.get("year") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };

        Self {
            page,
            path: indexed.path.clone(),
            citekey,
            title,
            authors,
            year,
        }
    }

    /// Finder input line: the page name, a tab, then the visible text
    #[must_use]
    pub fn line(&self) -> String {
        let mut line = format!("{}\t{}  {}", self.page, self.citekey, one_line(&self.title));
        if !self.authors.is_empty() {
            line.push_str(" | ");
            line.push_str(&one_line(&self.authors));
        }
        if let Some(year) = self.year {
            let _ = write!(line, " ({year})");
        }
        line
    }
}

/// Searchable view of the literature folder
#[derive(Debug, Default)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
}

impl SearchIndex {
    /// Build the index from a vault scan, sorted by citation key
    #[must_use]
    pub fn from_vault(index: &VaultIndex, vault_root: &Path) -> Self {
        let mut entries: Vec<SearchEntry> = index
            .notes
            .iter()
            .map(|(key, note)| SearchEntry::from_note(vault_root, key, note))
            .collect();
        entries.sort_by(|a, b| a.citekey.cmp(&b.citekey).then_with(|| a.page.cmp(&b.page)));
        Self { entries }
    }

    /// All entries
    #[must_use]
    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    /// Whether there is nothing to search
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finder input lines, in index order
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(SearchEntry::line).collect()
    }

    /// Entry for a line returned by the finder
    #[must_use]
    pub fn resolve(&self, line: &str) -> Option<&SearchEntry> {
        let page = line.split('\t').next()?;
        self.entries.iter().find(|e| e.page == page)
    }
}

/// Silverbullet URL of a page
#[must_use]
pub fn page_url(base_url: &str, page: &str) -> String {
    let page = page.replace(' ', "%20");
    format!("{}/{page}", base_url.trim_end_matches('/'))
}

fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::Note;

    fn indexed(root: &Path, rel: &str, text: &str) -> IndexedNote {
        IndexedNote {
            path: root.join(rel),
            rel_path: PathBuf::from(rel),
            text: text.to_string(),
            note: Note::parse(text).unwrap(),
            protected: false,
        }
    }

    fn vault_index(root: &Path) -> VaultIndex {
        let mut index = VaultIndex::default();
        index.notes.insert(
            "BBBB2222".to_string(),
            indexed(
                root,
                "Literature/smith2020deep.md",
                "---\nzotero-key: BBBB2222\ncitekey: smith2020deep\ntitle: Deep Learning\nauthors:\n- Jane Smith\n- Li Wei\nyear: 2020\n---\n",
            ),
        );
        index.notes.insert(
            "AAAA1111".to_string(),
            indexed(
                root,
                "Literature/untitled.md",
                "---\nzotero-key: AAAA1111\n---\n",
            ),
        );
        index
    }

    #[test]
    fn test_entries_sorted_by_citekey() {
        let root = Path::new("/vault");
        let search = SearchIndex::from_vault(&vault_index(root), root);

        let citekeys: Vec<_> = search.entries().iter().map(|e| e.citekey.as_str()).collect();
        assert_eq!(citekeys, vec!["AAAA1111", "smith2020deep"]);
    }

    #[test]
    fn test_line_format() {
        let root = Path::new("/vault");
        let search = SearchIndex::from_vault(&vault_index(root), root);

        assert_eq!(
            search.lines(),
            vec![
                "Literature/untitled\tAAAA1111  untitled".to_string(),
                "Literature/smith2020deep\tsmith2020deep  Deep Learning | Jane Smith, Li Wei (2020)"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_resolve_selected_line() {
        let root = Path::new("/vault");
        let search = SearchIndex::from_vault(&vault_index(root), root);

        let entry = search
            .resolve("Literature/smith2020deep\tsmith2020deep  Deep Learning")
            .unwrap();
        assert_eq!(entry.path, root.join("Literature/smith2020deep.md"));
        assert!(search.resolve("Elsewhere/page\tx").is_none());
    }

    #[test]
    fn test_page_url() {
        assert_eq!(
            page_url("http://localhost:3000/", "Literature/smith 2020"),
            "http://localhost:3000/Literature/smith%202020"
        );
    }
}
