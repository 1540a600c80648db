//! Rendering Zotero items into notes

use std::fmt::Write;

use serde_yml::{Mapping, Value};

use super::note::{BLOCK_BEGIN, BLOCK_END, HASH_FIELD, KEY_FIELD, NOTES_HEADING, Note};
use crate::comparison::ContentHasher;
use crate::error::Result;
use crate::zotero::{Item, Library};

/// Frontmatter keys owned by litsync, in the order used for new notes
pub const MANAGED_FIELDS: &[&str] = &[
    KEY_FIELD,
    "zotero-version",
    "citekey",
    "title",
    "authors",
    "year",
    "item-type",
    "publication",
    "doi",
    "url",
    "tags",
    HASH_FIELD,
];

/// Renders items into Silverbullet notes
pub struct NoteRenderer {
    library: Library,
    tag: Option<String>,
}

impl NoteRenderer {
    /// Create a renderer
    #[must_use]
    pub const fn new(library: Library, tag: Option<String>) -> Self {
        Self { library, tag }
    }

    /// Render the full note text for `item`, merging into `existing` if given
    ///
    /// Frontmatter keys not owned by litsync and all body text outside the
    /// managed block are carried over from `existing`.
    ///
    /// # Errors
    ///
    /// Returns an error if the frontmatter cannot be serialized.
    pub fn render(&self, item: &Item, citekey: &str, existing: Option<&Note>) -> Result<String> {
        self.build(item, citekey, existing).render()
    }

    /// Build the note for `item`
    #[must_use]
    pub fn build(&self, item: &Item, citekey: &str, existing: Option<&Note>) -> Note {
        let block = self.render_block(item);
        let managed = self.managed_fields(item, citekey, &block);

        let mut note = existing.cloned().unwrap_or_else(|| {
            Note::with_body(format!("{BLOCK_BEGIN}\n{BLOCK_END}\n\n{NOTES_HEADING}\n\n"))
        });
        note.frontmatter = merge_frontmatter(&note.frontmatter, managed);
        note.replace_managed_block(&block);
        note
    }

    /// Markdown inside the managed block
    #[must_use]
    pub fn render_block(&self, item: &Item) -> String {
        let mut out = String::new();
        let data = &item.data;

        let _ = writeln!(out, "# {}", single_line(item.title()));
        out.push('\n');

        let authors = item.authors();
        if !authors.is_empty() {
            let _ = writeln!(out, "- **Authors:** {}", authors.join(", "));
        }
        if let Some(year) = item.year() {
            let _ = writeln!(out, "- **Year:** {year}");
        }
        if !data.item_type.is_empty() {
            let _ = writeln!(out, "- **Type:** {}", data.item_type);
        }
        if !data.publication_title.trim().is_empty() {
            let _ = writeln!(out, "- **Published in:** {}", single_line(&data.publication_title));
        }
        if !data.doi.trim().is_empty() {
            let doi = data.doi.trim();
            let _ = writeln!(out, "- **DOI:** [{doi}](https://doi.org/{doi})");
        }
        if !data.url.trim().is_empty() {
            let _ = writeln!(out, "- **URL:** <{}>", data.url.trim());
        }
        let _ = writeln!(
            out,
            "- **Zotero:** [Open in Zotero]({})",
            self.library.select_link(&item.key)
        );

        let abstract_note = data.abstract_note.trim();
        if !abstract_note.is_empty() {
            out.push_str("\n## Abstract\n\n");
            out.push_str(abstract_note);
            out.push('\n');
        }

        escape_comments(&out)
    }

    /// Note tags: configured tag first, then Zotero tags, deduplicated
    #[must_use]
    pub fn tags(&self, item: &Item) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        let candidates = self
            .tag
            .iter()
            .map(String::as_str)
            .chain(item.tag_names())
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join("-"))
            .filter(|t| !t.is_empty());

        for tag in candidates {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    fn managed_fields(&self, item: &Item, citekey: &str, block: &str) -> Vec<(&'static str, Value)> {
        let data = &item.data;
        let mut fields: Vec<(&'static str, Value)> = vec![
            (KEY_FIELD, Value::from(item.key.clone())),
            ("zotero-version", Value::from(item.version)),
            ("citekey", Value::from(citekey.to_string())),
            ("title", Value::from(single_line(item.title()))),
        ];

        let authors = item.authors();
        if !authors.is_empty() {
            fields.push(("authors", string_list(authors)));
        }
        if let Some(year) = item.year() {
            fields.push(("year", Value::from(u64::from(year))));
        }
        if !data.item_type.is_empty() {
            fields.push(("item-type", Value::from(data.item_type.clone())));
        }
        if !data.publication_title.trim().is_empty() {
            fields.push(("publication", Value::from(single_line(&data.publication_title))));
        }
        if !data.doi.trim().is_empty() {
            fields.push(("doi", Value::from(data.doi.trim().to_string())));
        }
        if !data.url.trim().is_empty() {
            fields.push(("url", Value::from(data.url.trim().to_string())));
        }

        let tags = self.tags(item);
        if !tags.is_empty() {
            fields.push(("tags", string_list(tags)));
        }

        fields.push((HASH_FIELD, Value::from(ContentHasher::hash_str(block))));
        fields
    }
}

/// Replace managed keys, keep user keys in place, drop managed keys without a value
fn merge_frontmatter(existing: &Mapping, managed: Vec<(&'static str, Value)>) -> Mapping {
    let mut pending: Vec<(&'static str, Value)> = managed;
    let mut merged = Mapping::new();

    for (key, value) in existing {
        let name = key.as_str();
        match name.and_then(|n| MANAGED_FIELDS.iter().find(|f| **f == n)) {
            Some(field) => {
                if let Some(idx) = pending.iter().position(|(k, _)| k == field) {
                    let (k, v) = pending.remove(idx);
                    merged.insert(Value::from(k), v);
                }
            }
            None => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }

    for (key, value) in pending {
        merged.insert(Value::from(key), value);
    }

    merged
}

fn string_list(values: Vec<String>) -> Value {
    Value::Sequence(values.into_iter().map(Value::from).collect())
}

/// Zotero text must not open HTML comments, or it could end the managed block early
fn escape_comments(text: &str) -> String {
    text.replace("<!--", "&lt;!--")
}

/// Collapse whitespace (including newlines) into single spaces
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
