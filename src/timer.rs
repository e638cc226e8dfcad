//! Per-state timers with explicit cancellation
//!
//! Every timer is a tokio task that only sends a [`TimerFired`] message back
//! to the session loop. The owner keeps the returned [`StateTimer`] for as
//! long as its state is active and cancels it on leave. Firings also carry
//! the epoch they were scheduled in, so a message that was already queued
//! when the state changed can be recognized and dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// What a timer drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Landing page: simulated dial before showing the rules
    Dial,
    /// Connecting -> IVR
    Connect,
    /// IVR -> Playing
    Ivr,
    /// Repeating progress tick while Playing
    ProgressTick,
}

/// Message sent when a timer elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub kind: TimerKind,
    pub epoch: u64,
}

/// Spawns timers that report back on a single channel
#[derive(Debug, Clone)]
pub struct TimerScheduler {
    tx: mpsc::UnboundedSender<TimerFired>,
}

impl TimerScheduler {
    /// Create a scheduler and the receiver its timers report to
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TimerFired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Fire once after `delay`
    pub fn after(&self, kind: TimerKind, epoch: u64, delay: Duration) -> StateTimer {
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = tx.send(TimerFired { kind, epoch });
        });

        StateTimer { kind, epoch, task }
    }

    /// Fire every `period`, first firing one period from now
    pub fn every(&self, kind: TimerKind, epoch: u64, period: Duration) -> StateTimer {
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(TimerFired { kind, epoch }).is_err() {
                    break;
                }
            }
        });

        StateTimer { kind, epoch, task }
    }
}

/// Handle to a pending timer; dropping it cancels the timer
#[derive(Debug)]
pub struct StateTimer {
    kind: TimerKind,
    epoch: u64,
    task: JoinHandle<()>,
}

impl StateTimer {
    /// Whether `fired` was produced by this timer
    pub fn matches(&self, fired: &TimerFired) -> bool {
        self.kind == fired.kind && self.epoch == fired.epoch
    }

    /// Cancel the timer; no further firings are sent
    pub fn cancel(self) {
        debug!(kind = ?self.kind, epoch = self.epoch, "timer cancelled");
        // Drop aborts the task
    }
}

impl Drop for StateTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_after_fires_once() {
        let (timers, mut rx) = TimerScheduler::channel();
        let started = Instant::now();
        let _timer = timers.after(TimerKind::Connect, 3, Duration::from_millis(2000));

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired, TimerFired { kind: TimerKind::Connect, epoch: 3 });
        assert!(started.elapsed() >= Duration::from_millis(2000));

        time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let (timers, mut rx) = TimerScheduler::channel();
        let timer = timers.after(TimerKind::Ivr, 1, Duration::from_millis(3000));

        time::sleep(Duration::from_millis(1000)).await;
        timer.cancel();
        time::sleep(Duration::from_secs(10)).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_repeats_until_dropped() {
        let (timers, mut rx) = TimerScheduler::channel();
        let timer = timers.every(TimerKind::ProgressTick, 9, Duration::from_millis(300));

        for _ in 0..3 {
            let fired = rx.recv().await.unwrap();
            assert!(timer.matches(&fired));
        }

        drop(timer);
        time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_matches_checks_epoch() {
        let (timers, _rx) = TimerScheduler::channel();
        let timer = timers.after(TimerKind::Dial, 2, Duration::from_millis(1500));

        assert!(timer.matches(&TimerFired { kind: TimerKind::Dial, epoch: 2 }));
        assert!(!timer.matches(&TimerFired { kind: TimerKind::Dial, epoch: 1 }));
        assert!(!timer.matches(&TimerFired { kind: TimerKind::Connect, epoch: 2 }));
    }
}
