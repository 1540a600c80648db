//! Zotero Web API access and item model
//!
//! This module handles:
//! - Authenticated, paginated fetches of top-level items
//! - Incremental fetches via `since` and the deleted-items endpoint
//! - The local API of the Zotero desktop app
//! - Deriving note metadata (authors, year, citation key) from items

mod client;
mod error;
mod item;

pub use client::{Library, LOCAL_API_URL, MAX_PAGE_SIZE, WEB_API_URL, ZoteroClient};
pub use error::ZoteroError;
pub use item::{Creator, Item, ItemData, ItemMeta, NON_LITERATURE_TYPES, Tag};

/// Items fetched for one sync run
#[derive(Debug, Clone, Default)]
pub struct LibrarySnapshot {
    /// Top-level items (all of them, or those changed since the last sync)
    pub items: Vec<Item>,
    /// Keys of items deleted since the last sync (incremental snapshots only)
    pub deleted: Vec<String>,
    /// Library version reported by the server
    pub library_version: u64,
    /// Whether `items` is the whole library
    pub complete: bool,
}

impl LibrarySnapshot {
    /// Snapshot holding the whole library
    #[must_use]
    pub const fn full(items: Vec<Item>, library_version: u64) -> Self {
        Self {
            items,
            deleted: Vec::new(),
            library_version,
            complete: true,
        }
    }
}
