//! Repository commit sidecar for checking projects.
//!
//! A project directory is a plain git repository. Every change the checker
//! makes is committed wholesale (`git add -A` followed by `git commit`);
//! there is no branch or remote handling here.
//!
//! Two entry points:
//! - [`Repo`]: open (initializing if needed) and save a project repository.
//! - [`DebouncedSaver`]: single-slot wrapper that skips a save while another
//!   one is still running.

mod debounced;
mod repo;

pub use debounced::DebouncedSaver;
pub use repo::{Repo, SaveOutcome, UserIdentity};

use std::path::PathBuf;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum GitToolingError {
    #[error("project path {path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("failed to spawn git {args:?} in {dir}: {source}")]
    Spawn {
        dir: PathBuf,
        args: Vec<String>,
        source: std::io::Error,
    },

    #[error("git {args:?} failed with status {status}: {stderr}")]
    CommandFailed {
        args: Vec<String>,
        status: i32,
        stderr: String,
    },
}

pub type Result<T> = std::result::Result<T, GitToolingError>;
