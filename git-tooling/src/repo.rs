use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::{GitToolingError, Result};

const FALLBACK_NAME: &str = "tcheck";
const FALLBACK_EMAIL: &str = "tcheck@localhost";

/// Author identity stamped on auto-save commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub username: String,
    pub email: Option<String>,
}

impl UserIdentity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Result of a [`Repo::save`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A commit was created; carries the short hash.
    Committed { commit_hash: String },
    /// The working tree had no changes.
    NothingToCommit,
}

/// Handle to a project repository.
#[derive(Debug, Clone)]
pub struct Repo {
    dir: PathBuf,
    user: Option<UserIdentity>,
}

impl Repo {
    /// Open the repository at `dir`, running `git init` when there is none yet.
    pub async fn open(dir: impl AsRef<Path>, user: Option<UserIdentity>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(GitToolingError::NotADirectory { path: dir });
        }

        if !dir.join(".git").exists() {
            tracing::info!("Initializing git repository in {}", dir.display());
            run_git(&dir, &["init", "--quiet"]).await?;
        }

        Ok(Self { dir, user })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stage everything and commit it with `message`.
    pub async fn save(&self, message: &str) -> Result<SaveOutcome> {
        run_git(&self.dir, &["add", "--all"]).await?;

        let status = run_git(&self.dir, &["status", "--porcelain"]).await?;
        if status.trim().is_empty() {
            tracing::debug!("No changes to commit in {}", self.dir.display());
            return Ok(SaveOutcome::NothingToCommit);
        }

        let (name, email) = match &self.user {
            Some(user) => (
                user.username.as_str(),
                user.email.as_deref().unwrap_or(FALLBACK_EMAIL),
            ),
            None => (FALLBACK_NAME, FALLBACK_EMAIL),
        };
        let name_cfg = format!("user.name={name}");
        let email_cfg = format!("user.email={email}");
        run_git(
            &self.dir,
            &[
                "-c",
                &name_cfg,
                "-c",
                &email_cfg,
                "commit",
                "--quiet",
                "--no-verify",
                "-m",
                message,
            ],
        )
        .await?;

        let commit_hash = run_git(&self.dir, &["rev-parse", "--short", "HEAD"])
            .await?
            .trim()
            .to_string();
        tracing::info!("Committed {commit_hash} in {}: {message}", self.dir.display());

        Ok(SaveOutcome::Committed { commit_hash })
    }
}

/// Run git in `dir` and return its stdout.
async fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .await
        .map_err(|source| GitToolingError::Spawn {
            dir: dir.to_path_buf(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            source,
        })?;

    if !output.status.success() {
        return Err(GitToolingError::CommandFailed {
            args: args.iter().map(|a| (*a).to_string()).collect(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
