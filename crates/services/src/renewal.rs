use std::future::Future;
use std::time::Duration;

use showcase_core::model::RefreshToken;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// What the renewal loop should do after one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    Continue,
    Stop,
}

/// Handle to the recurring renewal timer of exactly one session.
///
/// The first tick fires one full period after spawning. Ticks run strictly one
/// after another: the next tick is only awaited once the previous callback has
/// finished.
#[derive(Debug)]
pub struct RenewalTask {
    epoch: u64,
    refresh_token: RefreshToken,
    handle: JoinHandle<()>,
}

impl RenewalTask {
    pub(crate) fn spawn<F, Fut>(
        epoch: u64,
        refresh_token: RefreshToken,
        period: Duration,
        mut on_tick: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = TickOutcome> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if on_tick().await == TickOutcome::Stop {
                    break;
                }
            }
        });

        Self {
            epoch,
            refresh_token,
            handle,
        }
    }

    /// Stop the timer. Safe to call any number of times.
    ///
    /// Callers cancel while holding the session state lock, so a tick that has
    /// not yet applied its result never gets to.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The refresh token this task renews with.
    #[must_use]
    pub fn refresh_token(&self) -> &RefreshToken {
        &self.refresh_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn token() -> RefreshToken {
        RefreshToken::new("r").unwrap()
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let task = RenewalTask::spawn(1, token(), Duration::from_secs(60), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                TickOutcome::Continue
            }
        });

        time::advance(Duration::from_secs(59)).await;
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        for expected in 2..=3 {
            time::advance(Duration::from_secs(60)).await;
            settle().await;
            assert_eq!(ticks.load(Ordering::SeqCst), expected);
        }
        task.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_ticks_again() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let task = RenewalTask::spawn(1, token(), Duration::from_secs(10), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                TickOutcome::Continue
            }
        });

        task.cancel();
        task.cancel();
        time::advance(Duration::from_secs(100)).await;
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_outcome_ends_the_loop() {
        let task = RenewalTask::spawn(7, token(), Duration::from_secs(5), || async {
            TickOutcome::Stop
        });
        assert_eq!(task.epoch(), 7);
        assert_eq!(task.refresh_token().as_str(), "r");

        time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert!(task.is_finished());
    }
}
