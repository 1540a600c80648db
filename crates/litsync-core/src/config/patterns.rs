//! Gitignore-style pattern matching for protected vault notes

use std::path::Path;

use anyhow::Context;
use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::Result;

/// Decides which vault notes litsync may touch
pub struct PatternMatcher {
    gitignore: Option<Gitignore>,
}

impl PatternMatcher {
    /// Matcher that allows every note
    #[must_use]
    pub const fn new() -> Self {
        Self { gitignore: None }
    }

    /// Build pattern matcher from ignore and include patterns
    ///
    /// # Errors
    ///
    /// Returns an error if patterns are invalid.
    pub fn with_patterns(ignore_patterns: &[String], include_patterns: &[String]) -> Result<Self> {
        if ignore_patterns.is_empty() && include_patterns.is_empty() {
            return Ok(Self::new());
        }

        let mut builder = GitignoreBuilder::new("");

        for pattern in ignore_patterns {
            builder
                .add_line(None, pattern)
                .with_context(|| format!("Invalid ignore pattern: '{pattern}'"))?;
        }

        // Include patterns are negated ignores
        for pattern in include_patterns {
            builder
                .add_line(None, &format!("!{pattern}"))
                .with_context(|| format!("Invalid include pattern: '{pattern}'"))?;
        }

        let gitignore = builder.build().context("Failed to compile vault patterns")?;

        Ok(Self {
            gitignore: Some(gitignore),
        })
    }

    /// Whether a vault-relative note path may be written or deleted
    #[must_use]
    pub fn allows(&self, rel_path: &Path) -> bool {
        self.gitignore.as_ref().is_none_or(|gi| {
            !gi.matched_path_or_any_parents(rel_path, false).is_ignore()
        })
    }
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new()
    }
}
