//! Delayed repository commit after every context change.

use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tcheck_async_utils::delay_or_cancel;
use tcheck_git_tooling::{DebouncedSaver, UserIdentity};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::AutoCommitConfig;
use crate::types::ContextId;

/// Receives a request to commit the project after the user moved to
/// `context_id`.
pub trait CommitScheduler: Send + Sync {
    fn schedule(&self, context_id: &ContextId);
}

/// Commit message for a save triggered at `context_id`.
pub fn auto_save_message(context_id: &ContextId) -> String {
    format!("Auto saving at {}", context_id.reference_str())
}

/// Spawns one delayed task per request; each task commits through a shared
/// single-slot saver, so overlapping requests collapse into one commit.
pub struct AutoCommitter {
    saver: DebouncedSaver,
    delay: Duration,
    enabled: bool,
    runtime: Handle,
    token: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl AutoCommitter {
    /// Must be called from within a tokio runtime; scheduled tasks run on it.
    pub fn new(project: &Path, config: &AutoCommitConfig, user: Option<UserIdentity>) -> Self {
        Self::with_runtime(project, config, user, Handle::current())
    }

    pub fn with_runtime(
        project: &Path,
        config: &AutoCommitConfig,
        user: Option<UserIdentity>,
        runtime: Handle,
    ) -> Self {
        Self {
            saver: DebouncedSaver::new(project, user),
            delay: Duration::from_millis(config.delay_ms),
            enabled: config.enabled,
            runtime,
            token: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn pending(&self) -> usize {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.is_finished());
        tasks.len()
    }

    /// Wait for every scheduled commit to finish (or be cancelled).
    pub async fn wait_idle(&self) {
        loop {
            let drained: Vec<JoinHandle<()>> = {
                let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
                tasks.drain(..).collect()
            };
            if drained.is_empty() {
                return;
            }
            for task in drained {
                if let Err(err) = task.await {
                    tracing::error!("Auto-commit task failed: {err}");
                }
            }
        }
    }

    /// Cancel pending delays. Commits already running finish normally.
    pub fn shutdown(&self) {
        self.token.cancel();
    }
}

impl CommitScheduler for AutoCommitter {
    fn schedule(&self, context_id: &ContextId) {
        if !self.enabled {
            tracing::debug!("Auto-commit disabled, not saving {}", context_id.reference_str());
            return;
        }
        if self.token.is_cancelled() {
            tracing::debug!("Auto-commit shut down, not saving {}", context_id.reference_str());
            return;
        }

        let ref_str = context_id.reference_str();
        let message = auto_save_message(context_id);
        let saver = self.saver.clone();
        let delay = self.delay;
        let token = self.token.clone();
        let task = self.runtime.spawn(async move {
            if !delay_or_cancel(delay, &token).await.elapsed() {
                tracing::debug!("Auto save at {ref_str} cancelled");
                return;
            }
            match saver.save_debounced(&message).await {
                Ok(true) => tracing::info!("Auto saved at {ref_str}"),
                Ok(false) => {
                    tracing::info!("Save already running, skipping save after {ref_str}");
                }
                Err(err) => tracing::error!("Failed to auto save {ref_str}: {err}"),
            }
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.is_finished());
        tasks.push(task);
    }
}

impl Drop for AutoCommitter {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Reference;
    use pretty_assertions::assert_eq;

    fn context() -> ContextId {
        ContextId::new(
            "translationWords",
            "apostle",
            Reference::new("tit", 1, 1),
            "ἀπόστολος",
            1,
        )
    }

    #[test]
    fn message_names_reference() {
        assert_eq!(
            auto_save_message(&context()),
            "Auto saving at translationWords apostle tit 1:1"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_delay() {
        let temp = tempfile::tempdir().expect("tempdir");
        let committer = AutoCommitter::new(temp.path(), &AutoCommitConfig::default(), None);

        committer.schedule(&context());
        assert_eq!(committer.pending(), 1);

        committer.shutdown();
        committer.wait_idle().await;

        assert_eq!(committer.pending(), 0);
        assert!(!temp.path().join(".git").exists());
    }

    #[tokio::test]
    async fn disabled_committer_schedules_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = AutoCommitConfig {
            enabled: false,
            ..AutoCommitConfig::default()
        };
        let committer = AutoCommitter::new(temp.path(), &config, None);

        committer.schedule(&context());

        assert_eq!(committer.pending(), 0);
    }
}
