//! # litsync-core
//!
//! Core library for the litsync tool.
//!
//! This library pulls literature metadata from a Zotero library, maps every
//! item to a markdown note in a Silverbullet vault, and exposes the synced
//! notes to an external fuzzy finder.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Core error types for the litsync library
pub mod error {
    /// Result type alias using `anyhow::Error`
    pub type Result<T> = anyhow::Result<T>;

    pub use crate::zotero::ZoteroError;
}

/// Note comparison, hashing, and diff generation
pub mod comparison;

/// Configuration file parsing and management
pub mod config;

/// Fuzzy search over synced notes
pub mod search;

/// Zotero to vault synchronization engine
pub mod sync;

/// Silverbullet vault notes: parsing, rendering, naming, and scanning
pub mod vault;

/// Zotero Web API client and item model
pub mod zotero;
