//! Root of the `tcheck-core` library.
//!
//! Context navigation and group-data resolution for translation checking
//! tools: which check is current, what the user recorded for it, and how to
//! step to the next or previous check across groups.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output goes through the CLI or the tracing stack.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod auto_commit;
pub mod check_data;
pub mod config;
pub mod context_id;
pub mod error;
pub mod filters;
pub mod gateway;
pub mod group_data;
pub mod helps;
pub mod io;
pub mod menu;
pub mod navigation;
pub mod quote;
pub mod session;
pub mod types;

pub use auto_commit::{AutoCommitter, CommitScheduler};
pub use error::{CheckError, Result};
pub use filters::{CheckFlags, FilterKey, Filters};
pub use group_data::{GroupsStore, find_group_data_item, group_data_for_verse};
pub use navigation::Direction;
pub use session::{CheckState, CheckingSession};
pub use types::{
    CheckRecord, ContextId, GroupIndexEntry, GroupsData, GroupsIndex, Quote, QuoteToken,
    Reference, Selection, TextDirection,
};

use std::path::{Path, PathBuf};

/// Per-project application data directory
pub const APPS_DIR: &str = ".apps/translationCore";

/// `<project>/.apps/translationCore`
pub fn apps_dir(project: &Path) -> PathBuf {
    project.join(APPS_DIR)
}

/// `<project>/.apps/translationCore/index`
pub fn index_dir(project: &Path) -> PathBuf {
    apps_dir(project).join("index")
}
