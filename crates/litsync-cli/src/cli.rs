use clap::{Parser, Subcommand, ValueEnum};
use litsync_core::comparison::ConflictStrategy;
use std::path::PathBuf;

/// Zotero to Silverbullet literature sync
///
/// Keep one markdown note per Zotero item in a Silverbullet vault, and find
/// those notes again with a fuzzy finder
#[derive(Parser, Debug)]
#[command(name = "litsync")]
#[command(about, long_about = None, version)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Accept all changes without prompting
    #[arg(long, global = true)]
    pub yes_all: bool,

    /// Preview changes without writing (dry-run)
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Use specific config file
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "no_config")]
    pub config: Option<PathBuf>,

    /// Ignore all config files
    #[arg(long, global = true, conflicts_with = "config")]
    pub no_config: bool,

    /// Silverbullet vault directory
    #[arg(long, global = true, value_name = "PATH", env = "LITSYNC_VAULT")]
    pub vault: Option<PathBuf>,

    /// Zotero API key
    #[arg(long, global = true, env = "ZOTERO_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Zotero user library id
    #[arg(long, global = true, value_name = "ID", env = "ZOTERO_USER_ID")]
    pub user_id: Option<String>,

    /// Zotero group library id
    #[arg(long, global = true, value_name = "ID", env = "ZOTERO_GROUP_ID")]
    pub group_id: Option<String>,

    /// Use the local API of the Zotero desktop app
    #[arg(long, global = true)]
    pub local: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync Zotero items into vault notes (default command)
    Sync(SyncArgs),

    /// Fuzzy-search synced notes
    #[command(visible_alias = "s")]
    Search {
        /// Initial query
        query: Option<String>,

        /// Print matches without opening the finder UI
        #[arg(long, requires = "query")]
        filter: bool,

        /// Print the Silverbullet URL instead of the file path
        #[arg(long)]
        url: bool,
    },

    /// List library items without writing anything
    #[command(visible_alias = "ls")]
    List,

    /// Show what a sync would change
    Status {
        /// Ignore the saved sync state and compare against the whole library
        #[arg(long)]
        full: bool,
    },

    /// Display differences between notes and Zotero data
    Diff {
        /// Only these Zotero item keys
        keys: Vec<String>,
    },

    /// Show active configuration and discovered config files
    Config,
}

/// Options of the `sync` command
#[derive(clap::Args, Debug, Default)]
pub struct SyncArgs {
    /// Ignore the saved sync state and fetch the whole library
    #[arg(long)]
    pub full: bool,

    /// Conflict resolution strategy for hand-edited notes
    #[arg(long, value_enum)]
    pub conflict: Option<ConflictMode>,

    /// Delete notes whose item left the library
    #[arg(long)]
    pub prune: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConflictMode {
    /// Report an error, or ask when interactive (default)
    Fail,
    /// Overwrite the managed block
    Overwrite,
    /// Keep the edited note
    Skip,
    /// Overwrite only if the item changed after the note
    Newer,
}

impl From<ConflictMode> for ConflictStrategy {
    fn from(mode: ConflictMode) -> Self {
        match mode {
            ConflictMode::Fail => Self::Fail,
            ConflictMode::Overwrite => Self::Overwrite,
            ConflictMode::Skip => Self::Skip,
            ConflictMode::Newer => Self::Newer,
        }
    }
}
