//! Cancellable timers that post events into the host's event channel.
//!
//! A [`TimerHandle`] owns one tokio task. Dropping the handle aborts the task,
//! so replacing an `Option<TimerHandle>` field cancels whatever was armed
//! before, and dropping the owner disposes every timer it holds.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};

/// Tracing target for timer lifecycle events.
pub const TRACING_TARGET: &str = "scrimnote_core::timer";

/// A named, disposable background timer.
#[derive(Debug)]
pub struct TimerHandle {
    name: &'static str,
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Posts `make()` every `period`, starting immediately.
    ///
    /// The task ends on its own once the receiver is gone.
    pub fn interval<E, F>(
        name: &'static str,
        period: Duration,
        tx: UnboundedSender<E>,
        make: F,
    ) -> Self
    where
        E: Send + 'static,
        F: Fn() -> E + Send + 'static,
    {
        tracing::debug!(target: TRACING_TARGET, name, period_ms = period.as_millis(), "Arming interval");
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if tx.send(make()).is_err() {
                    break;
                }
            }
        });
        Self { name, task }
    }

    /// Posts `event` once after `delay`.
    pub fn once<E>(name: &'static str, delay: Duration, tx: UnboundedSender<E>, event: E) -> Self
    where
        E: Send + 'static,
    {
        tracing::trace!(target: TRACING_TARGET, name, delay_ms = delay.as_millis(), "Arming one-shot");
        let task = tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(event);
        });
        Self { name, task }
    }

    /// `true` once a one-shot has fired or the task was aborted.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            tracing::trace!(target: TRACING_TARGET, name = self.name, "Cancelling timer");
        }
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn once_fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _timer = TimerHandle::once("test", Duration::from_secs(3), tx, 7u32);

        sleep(Duration::from_millis(2900)).await;
        assert!(rx.try_recv().is_err());

        sleep(Duration::from_millis(200)).await;
        assert_eq!(rx.try_recv().ok(), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_cancels_pending_fire() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = TimerHandle::once("test", Duration::from_secs(1), tx, ());
        drop(timer);

        sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn interval_ticks_until_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = TimerHandle::interval("sampler", Duration::from_secs(1), tx, || 1u8);

        sleep(Duration::from_millis(2500)).await;
        let mut ticks = 0;
        while rx.try_recv().is_ok() {
            ticks += 1;
        }
        assert_eq!(ticks, 3); // t = 0, 1, 2

        drop(timer);
        sleep(Duration::from_secs(3)).await;
        assert!(rx.try_recv().is_err());
    }
}
