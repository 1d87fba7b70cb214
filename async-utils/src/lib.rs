//! Cancellation-aware timers for deferred project work.
//!
//! The checking session defers repository commits behind a delay. Those
//! delays must end early when the application shuts down, so every wait in
//! this crate races a tokio `CancellationToken`.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Error returned when a future is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelErr {
    Cancelled,
}

/// Extension trait for making futures cancellable.
///
/// Returns `Err(CancelErr::Cancelled)` if the token fires before the future
/// completes. A token that is already cancelled wins immediately.
#[async_trait]
pub trait OrCancelExt: Sized {
    type Output;

    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, CancelErr>;
}

#[async_trait]
impl<F> OrCancelExt for F
where
    F: Future + Send,
    F::Output: Send,
{
    type Output = F::Output;

    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, CancelErr> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(CancelErr::Cancelled),
            res = self => Ok(res),
        }
    }
}

/// How a [`delay_or_cancel`] wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayOutcome {
    /// The full delay elapsed.
    Elapsed,
    /// The token fired first.
    Cancelled,
}

impl DelayOutcome {
    pub fn elapsed(self) -> bool {
        matches!(self, DelayOutcome::Elapsed)
    }
}

/// Sleep for `delay` unless `token` is cancelled first.
pub async fn delay_or_cancel(delay: Duration, token: &CancellationToken) -> DelayOutcome {
    match tokio::time::sleep(delay).or_cancel(token).await {
        Ok(()) => DelayOutcome::Elapsed,
        Err(CancelErr::Cancelled) => DelayOutcome::Cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::task;
    use tokio::time::sleep;

    #[tokio::test]
    async fn returns_ok_when_future_completes_first() {
        let token = CancellationToken::new();

        let result = async { "saved" }.or_cancel(&token).await;

        assert_eq!(Ok("saved"), result);
    }

    #[tokio::test]
    async fn returns_err_when_token_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();

        let result = async { 5 }.or_cancel(&token).await;

        assert_eq!(Err(CancelErr::Cancelled), result);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_elapses_without_cancellation() {
        let token = CancellationToken::new();

        let outcome = delay_or_cancel(Duration::from_millis(5000), &token).await;

        assert_eq!(DelayOutcome::Elapsed, outcome);
        assert!(outcome.elapsed());
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_cut_short_by_shutdown() {
        let token = CancellationToken::new();
        let shutdown = token.clone();

        let canceller = task::spawn(async move {
            sleep(Duration::from_millis(10)).await;
            shutdown.cancel();
        });

        let outcome = delay_or_cancel(Duration::from_millis(5000), &token).await;

        canceller.await.expect("cancel task panicked");
        assert_eq!(DelayOutcome::Cancelled, outcome);
    }
}
