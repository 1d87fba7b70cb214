use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{Repo, Result, SaveOutcome, UserIdentity};

/// Single-slot saver: at most one save runs at a time per saver.
///
/// Clones share the in-flight flag, so every clone handed to a scheduled
/// task observes the same slot.
#[derive(Debug, Clone)]
pub struct DebouncedSaver {
    dir: PathBuf,
    user: Option<UserIdentity>,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag on every exit path.
struct SlotGuard<'a>(&'a AtomicBool);

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DebouncedSaver {
    pub fn new(dir: impl Into<PathBuf>, user: Option<UserIdentity>) -> Self {
        Self {
            dir: dir.into(),
            user,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Open the repository and save it, unless a save is already running.
    ///
    /// Returns `Ok(false)` when the call was skipped because the slot was
    /// taken. Skipped saves are not queued.
    pub async fn save_debounced(&self, message: &str) -> Result<bool> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Save already running in {}, skipping", self.dir.display());
            return Ok(false);
        }
        let _slot = SlotGuard(&self.in_flight);

        let repo = Repo::open(&self.dir, self.user.clone()).await?;
        match repo.save(message).await? {
            SaveOutcome::Committed { commit_hash } => {
                tracing::debug!("Debounced save committed {commit_hash}");
            }
            SaveOutcome::NothingToCommit => {
                tracing::debug!("Debounced save found nothing to commit");
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn skips_when_slot_is_taken() {
        let dir = tempfile::tempdir().expect("tempdir");
        let saver = DebouncedSaver::new(dir.path(), None);
        saver.in_flight.store(true, Ordering::Release);

        let started = saver.save_debounced("Auto saving").await.expect("skip is not an error");

        assert!(!started);
        assert!(saver.is_saving());
    }

    #[tokio::test]
    async fn slot_is_released_after_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let saver = DebouncedSaver::new(dir.path().join("missing"), None);

        assert!(saver.save_debounced("Auto saving").await.is_err());
        assert!(!saver.is_saving());
    }

    #[test]
    fn clones_share_the_slot() {
        let saver = DebouncedSaver::new("/tmp/project", None);
        let clone = saver.clone();
        saver.in_flight.store(true, Ordering::Release);
        assert!(clone.is_saving());
    }
}
