pub mod common;
pub mod config;
pub mod diff;
pub mod list;
pub mod search;
pub mod status;
pub mod sync;

pub use common::SyncOptions;
pub use config::Config;
pub use diff::Diff;
pub use list::List;
pub use search::Search;
pub use status::Status;
pub use sync::{Sync, SyncOutcome};
