//! Diff generation with color-coded output

use std::fmt::Write;

use similar::{ChangeTag, TextDiff};

/// Lines of unchanged context around each hunk
const DIFF_CONTEXT_LINES: usize = 3;

/// Diff generator for note contents
pub struct DiffGenerator;

impl DiffGenerator {
    /// Generate a color-coded unified diff from the current note to the new one
    #[must_use]
    pub fn generate(current: &str, updated: &str, label: &str) -> String {
        let diff = TextDiff::from_lines(current, updated);

        let mut output = String::new();

        let _ = writeln!(output, "\x1b[1m--- {label} (vault)\x1b[0m");
        let _ = writeln!(output, "\x1b[1m+++ {label} (zotero)\x1b[0m");

        for (idx, group) in diff.grouped_ops(DIFF_CONTEXT_LINES).iter().enumerate() {
            if idx > 0 {
                output.push_str("...\n");
            }

            for op in group {
                for change in diff.iter_changes(op) {
                    let (sign, color) = match change.tag() {
                        ChangeTag::Delete => ("-", "\x1b[31m"),
                        ChangeTag::Insert => ("+", "\x1b[32m"),
                        ChangeTag::Equal => (" ", "\x1b[0m"),
                    };

                    let newline = if change.value().ends_with('\n') { "" } else { "\n" };

                    let _ = write!(output, "{color}{sign}{}{newline}\x1b[0m", change.value());
                }
            }
        }

        output
    }

    /// Generate a plain unified diff without colors
    #[must_use]
    pub fn generate_plain(current: &str, updated: &str, label: &str) -> String {
        TextDiff::from_lines(current, updated)
            .unified_diff()
            .context_radius(DIFF_CONTEXT_LINES)
            .header(&format!("{label} (vault)"), &format!("{label} (zotero)"))
            .to_string()
    }

    /// Render a brand new note as all-added lines
    #[must_use]
    pub fn generate_addition(content: &str, label: &str) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "\x1b[1m+++ {label} (new)\x1b[0m");
        for line in content.lines() {
            let _ = writeln!(output, "\x1b[32m+{line}\x1b[0m");
        }
        output
    }
}
