//! Zotero item model as returned by the Web API (`format=json`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Item types that never become literature notes
pub const NON_LITERATURE_TYPES: &[&str] = &["attachment", "note", "annotation"];

/// Title words skipped when building a citation key
const TITLE_STOPWORDS: &[&str] = &[
    "a", "an", "the", "on", "of", "in", "for", "and", "to", "with", "at", "by", "from",
];

/// A top-level Zotero item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Eight-character item key
    pub key: String,
    /// Item version (increases on every change)
    #[serde(default)]
    pub version: u64,
    /// Bibliographic payload
    pub data: ItemData,
    /// Server-computed metadata
    #[serde(default)]
    pub meta: ItemMeta,
}

/// Bibliographic fields of an item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemData {
    /// Item type, e.g. `journalArticle` or `book`
    pub item_type: String,
    /// Title
    pub title: String,
    /// Authors, editors, and other creators
    pub creators: Vec<Creator>,
    /// Abstract text
    pub abstract_note: String,
    /// Free-form date as typed by the user
    pub date: String,
    /// URL
    pub url: String,
    /// DOI
    #[serde(rename = "DOI")]
    pub doi: String,
    /// Journal, proceedings, or book title
    pub publication_title: String,
    /// Tags
    pub tags: Vec<Tag>,
    /// Collection keys the item belongs to
    pub collections: Vec<String>,
    /// The `extra` field (Better BibTeX stores citation keys here)
    pub extra: String,
    /// ISO 8601 creation time
    pub date_added: String,
    /// ISO 8601 modification time
    pub date_modified: String,
}

/// A creator, either split into first/last name or a single name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Creator {
    /// Role, e.g. `author` or `editor`
    pub creator_type: String,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Single-field name (institutions)
    pub name: Option<String>,
}

/// A Zotero tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    /// Tag text
    pub tag: String,
}

/// Server-side metadata attached to an item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemMeta {
    /// Normalized date (`YYYY`, `YYYY-MM`, or `YYYY-MM-DD`)
    pub parsed_date: Option<String>,
    /// Short creator summary, e.g. `Smith et al.`
    pub creator_summary: Option<String>,
}

impl Creator {
    /// Name as displayed in notes: `First Last`, or the single-field name
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }

        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.trim().is_empty() => {
                format!("{} {}", first.trim(), last.trim())
            }
            (_, Some(last)) => last.trim().to_string(),
            (Some(first), None) => first.trim().to_string(),
            (None, None) => String::new(),
        }
    }

    /// Family name used for citation keys
    #[must_use]
    pub fn family_name(&self) -> Option<&str> {
        self.last_name
            .as_deref()
            .or(self.name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

impl Item {
    /// Whether this item should become a literature note
    #[must_use]
    pub fn is_literature(&self) -> bool {
        !NON_LITERATURE_TYPES.contains(&self.data.item_type.as_str())
    }

    /// Title, falling back to the item key for untitled items
    #[must_use]
    pub fn title(&self) -> &str {
        let title = self.data.title.trim();
        if title.is_empty() { &self.key } else { title }
    }

    /// Display names of the authors, or of all creators if no author is listed
    #[must_use]
    pub fn authors(&self) -> Vec<String> {
        let authors: Vec<String> = self
            .data
            .creators
            .iter()
            .filter(|c| c.creator_type == "author")
            .map(Creator::display_name)
            .filter(|n| !n.is_empty())
            .collect();

        if !authors.is_empty() {
            return authors;
        }

        self.data
            .creators
            .iter()
            .map(Creator::display_name)
            .filter(|n| !n.is_empty())
            .collect()
    }

    /// Publication year from the parsed date, then from the free-form date
    #[must_use]
    pub fn year(&self) -> Option<u16> {
        self.meta
            .parsed_date
            .as_deref()
            .and_then(first_year)
            .or_else(|| first_year(&self.data.date))
    }

    /// Citation key: Better BibTeX key from `extra`, else `lastname` + year + title word
    #[must_use]
    pub fn citekey(&self) -> String {
        if let Some(key) = self.pinned_citekey() {
            return key;
        }

        let mut key = String::new();

        let first_creator = self
            .data
            .creators
            .iter()
            .find(|c| c.creator_type == "author")
            .or_else(|| self.data.creators.first());
        if let Some(family) = first_creator.and_then(Creator::family_name) {
            key.push_str(&ascii_slug(family.split_whitespace().last().unwrap_or(family)));
        }

        if let Some(year) = self.year() {
            key.push_str(&year.to_string());
        }

        if let Some(word) = self
            .data
            .title
            .split(|c: char| !c.is_alphanumeric())
            .map(ascii_slug)
            .find(|w| !w.is_empty() && !TITLE_STOPWORDS.contains(&w.as_str()))
        {
            key.push_str(&word);
        }

        if key.is_empty() {
            self.key.to_lowercase()
        } else {
            key
        }
    }

    /// Modification time reported by Zotero
    #[must_use]
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.data.date_modified)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Tag texts in Zotero order
    #[must_use]
    pub fn tag_names(&self) -> Vec<&str> {
        self.data
            .tags
            .iter()
            .map(|t| t.tag.trim())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Citation key pinned in the `extra` field (`Citation Key: ...`)
    fn pinned_citekey(&self) -> Option<String> {
        self.data.extra.lines().find_map(|line| {
            let (label, value) = line.split_once(':')?;
            let label = label.trim();
            if label.eq_ignore_ascii_case("citation key") || label.eq_ignore_ascii_case("citekey") {
                let value = value.trim();
                (!value.is_empty()).then(|| value.to_string())
            } else {
                None
            }
        })
    }
}

/// First run of exactly four digits that looks like a year
fn first_year(text: &str) -> Option<u16> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - start == 4 {
                if let Ok(year) = text[start..i].parse::<u16>() {
                    if (1000..3000).contains(&year) {
                        return Some(year);
                    }
                }
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Lowercase ASCII alphanumerics only, with common Latin diacritics folded
fn ascii_slug(text: &str) -> String {
    text.chars()
        .filter_map(|c| {
            let folded = match c {
                'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'a',
                'ç' | 'Ç' => 'c',
                'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => 'e',
                'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => 'i',
                'ñ' | 'Ñ' => 'n',
                'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'o',
                'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => 'u',
                'ý' | 'ÿ' | 'Ý' => 'y',
                other => other,
            };
            folded
                .is_ascii_alphanumeric()
                .then(|| folded.to_ascii_lowercase())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(json: serde_json::Value) -> Item {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_deserialize_api_item() {
        let item = item(serde_json::json!({
            "key": "ABCD2345",
            "version": 17,
            "library": { "type": "user", "id": 1 },
            "meta": { "creatorSummary": "Smith", "parsedDate": "2020-05-01" },
            "data": {
                "key": "ABCD2345",
                "itemType": "journalArticle",
                "title": "Deep Learning of Things",
                "creators": [
                    { "creatorType": "author", "firstName": "Jane", "lastName": "Smith" },
                    { "creatorType": "author", "name": "OpenLab" }
                ],
                "DOI": "10.1000/xyz",
                "tags": [{ "tag": "ml" }, { "tag": "to read", "type": 1 }],
                "dateModified": "2021-01-02T03:04:05Z"
            }
        }));

        assert_eq!(item.version, 17);
        assert_eq!(item.data.doi, "10.1000/xyz");
        assert_eq!(item.authors(), vec!["Jane Smith", "OpenLab"]);
        assert_eq!(item.year(), Some(2020));
        assert_eq!(item.tag_names(), vec!["ml", "to read"]);
        assert!(item.modified_at().is_some());
        assert!(item.is_literature());
    }

    #[test]
    fn test_citekey_from_metadata() {
        let item = item(serde_json::json!({
            "key": "ABCD2345",
            "data": {
                "itemType": "book",
                "title": "The Art of Computer Programming",
                "date": "March 1968",
                "creators": [{ "creatorType": "author", "firstName": "Donald", "lastName": "Knuth" }]
            }
        }));

        assert_eq!(item.citekey(), "knuth1968art");
    }

    #[test]
    fn test_citekey_folds_diacritics() {
        let item = item(serde_json::json!({
            "key": "ABCD2345",
            "data": {
                "title": "Über Gödel",
                "date": "1931",
                "creators": [{ "creatorType": "author", "lastName": "Gödel" }]
            }
        }));

        assert_eq!(item.citekey(), "godel1931uber");
    }

    #[test]
    fn test_citekey_pinned_in_extra() {
        let item = item(serde_json::json!({
            "key": "ABCD2345",
            "data": {
                "title": "Anything",
                "extra": "tex.note: x\nCitation Key: smith-deep-2020"
            }
        }));

        assert_eq!(item.citekey(), "smith-deep-2020");
    }

    #[test]
    fn test_citekey_falls_back_to_key() {
        let item = item(serde_json::json!({ "key": "ABCD2345", "data": {} }));

        assert_eq!(item.citekey(), "abcd2345");
        assert_eq!(item.title(), "ABCD2345");
    }

    #[test]
    fn test_year_ignores_other_numbers() {
        assert_eq!(first_year("vol. 12, 123456, 2019"), Some(2019));
        assert_eq!(first_year("no year here"), None);
        assert_eq!(first_year("0999"), None);
    }

    #[test]
    fn test_non_literature_types() {
        let note = item(serde_json::json!({ "key": "K", "data": { "itemType": "note" } }));
        let attachment = item(serde_json::json!({ "key": "K", "data": { "itemType": "attachment" } }));

        assert!(!note.is_literature());
        assert!(!attachment.is_literature());
    }

    #[test]
    fn test_editors_used_when_no_authors() {
        let item = item(serde_json::json!({
            "key": "K",
            "data": { "creators": [{ "creatorType": "editor", "firstName": "Ed", "lastName": "Itor" }] }
        }));

        assert_eq!(item.authors(), vec!["Ed Itor"]);
    }
}
