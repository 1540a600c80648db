//! Interactive prompting for sync operations

use anyhow::{Context, Result, bail};
use dialoguer::console::Term;
use litsync_core::comparison::DiffGenerator;
use litsync_core::sync::SyncAction;

/// Error message used when the user quits at the prompt
pub const USER_ABORTED: &str = "User aborted sync operation";

/// User's choice for a sync action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserChoice {
    /// Approve this action
    Yes,
    /// Skip this action
    No,
    /// Approve this and all remaining actions
    All,
    /// Skip this and all remaining actions
    None,
    /// Show diff and re-prompt
    Diff,
    /// Quit immediately
    Quit,
}

impl UserChoice {
    /// Map a key press to a choice; Enter means "no"
    const fn from_key(key: char) -> Option<Self> {
        match key {
            'y' | 'Y' => Some(Self::Yes),
            'n' | 'N' | '\n' | '\r' => Some(Self::No),
            'a' | 'A' => Some(Self::All),
            's' | 'S' => Some(Self::None),
            'd' | 'D' => Some(Self::Diff),
            'q' | 'Q' => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Session state tracking for "all" or "none" choices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionDecision {
    /// Ask for each action
    AskEach,
    /// Auto-approve all remaining
    ApproveAll,
    /// Auto-skip all remaining
    SkipAll,
}

/// Interactive prompter for hand-edited notes and deletions
pub struct InteractivePrompter {
    session_state: SessionDecision,
    term: Term,
}

impl InteractivePrompter {
    /// Create a new interactive prompter
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_state: SessionDecision::AskEach,
            term: Term::stderr(),
        }
    }

    /// Prompt user for approval of a sync action
    ///
    /// Returns true to proceed with the action, false to skip it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - User selects "quit"
    /// - Terminal interaction fails
    pub fn prompt(&mut self, action: &SyncAction) -> Result<bool> {
        match self.session_state {
            SessionDecision::ApproveAll => return Ok(true),
            SessionDecision::SkipAll => return Ok(false),
            SessionDecision::AskEach => {}
        }

        self.term
            .write_line(&format!("\n{}", Self::describe_action(action)))
            .context("Failed to write prompt")?;

        loop {
            match self.read_choice()? {
                UserChoice::Yes => return Ok(true),
                UserChoice::No => return Ok(false),
                UserChoice::All => {
                    self.session_state = SessionDecision::ApproveAll;
                    return Ok(true);
                }
                UserChoice::None => {
                    self.session_state = SessionDecision::SkipAll;
                    return Ok(false);
                }
                UserChoice::Diff => {
                    self.term
                        .write_line(&Self::diff(action))
                        .context("Failed to write diff")?;
                }
                UserChoice::Quit => bail!(USER_ABORTED),
            }
        }
    }

    fn read_choice(&self) -> Result<UserChoice> {
        self.term
            .write_str("Proceed? [y/n/a/s/d/q] (yes/no/all/skip-all/diff/quit): ")
            .context("Failed to write prompt")?;

        loop {
            let key = self.term.read_char().context("Failed to read user input")?;
            self.term
                .write_line(&key.to_string())
                .context("Failed to echo input")?;

            if let Some(choice) = UserChoice::from_key(key) {
                return Ok(choice);
            }
            self.term
                .write_str("Invalid key. Press y/n/a/s/d/q: ")
                .context("Failed to write prompt")?;
        }
    }

    /// Describe the action in user-friendly terms
    fn describe_action(action: &SyncAction) -> String {
        match action {
            SyncAction::Conflict {
                key,
                dest,
                item_newer,
                ..
            } => {
                let newer = if *item_newer { "Zotero item newer" } else { "note newer" };
                format!(
                    "⚠️  Note edited by hand ({newer}):\n  Item: {key}\n  Note: {}\n  Overwrite the managed block?",
                    dest.display()
                )
            }
            SyncAction::Delete { key, path, .. } => {
                format!(
                    "🗑  Item removed from Zotero:\n  Item: {key}\n  Note: {}\n  Delete the note?",
                    path.display()
                )
            }
            other => format!("{} {}", other.label(), other.key()),
        }
    }

    /// Diff for the action
    fn diff(action: &SyncAction) -> String {
        match action {
            SyncAction::Conflict {
                dest,
                content,
                current,
                ..
            }
            | SyncAction::Update {
                dest,
                content,
                current,
                ..
            } => DiffGenerator::generate(current, content, &dest.display().to_string()),
            SyncAction::Create { dest, content, .. } => {
                DiffGenerator::generate_addition(content, &dest.display().to_string())
            }
            SyncAction::Delete { path, current, .. } => {
                DiffGenerator::generate(current, "", &path.display().to_string())
            }
            SyncAction::Skip { .. } => "--- No diff (note will be skipped) ---".to_string(),
        }
    }
}

impl Default for InteractivePrompter {
    fn default() -> Self {
        Self::new()
    }
}
