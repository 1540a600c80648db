//! Silverbullet vault notes
//!
//! Each synced Zotero item owns one markdown page. litsync owns the
//! frontmatter keys it writes and the text between the block markers;
//! everything else in the page belongs to the user and survives updates.

mod naming;
mod note;
mod render;
mod scanner;

pub use naming::{NoteNamer, page_name, sanitize_stem};
pub use note::{BLOCK_BEGIN, BLOCK_END, HASH_FIELD, KEY_FIELD, NOTES_HEADING, Note};
pub use render::{MANAGED_FIELDS, NoteRenderer};
pub use scanner::{IndexedNote, VaultIndex, VaultScanner};
