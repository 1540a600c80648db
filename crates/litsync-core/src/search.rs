//! Fuzzy search over synced literature notes
//!
//! Notes are listed one per line with their page name as a hidden first
//! field, handed to an fzf-compatible finder, and the chosen lines are mapped
//! back to notes.

mod fzf;
mod index;

pub use fzf::FuzzyFinder;
pub use index::{SearchEntry, SearchIndex, page_url};
