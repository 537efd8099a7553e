//! Debounced write-back of the document.
//!
//! The scheduler never touches the document. An expired timer only sends an
//! [`AutoSaveTick`] into the controller's queue; the controller checks the
//! tick with [`AutoSaveScheduler::accept`] and performs the write itself.
//! Every cancel or re-arm bumps a generation counter, so a tick that was
//! already queued when it got superseded is rejected and never writes.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default quiet period after the last change.
pub const DEFAULT_AUTO_SAVE_DELAY: Duration = Duration::from_millis(1000);

/// Notification that a quiet period elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSaveTick(pub u64);

/// Single-timer debouncer for auto-save.
#[derive(Debug)]
pub struct AutoSaveScheduler {
    delay: Duration,
    enabled: bool,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    ticks: mpsc::UnboundedSender<AutoSaveTick>,
}

impl AutoSaveScheduler {
    /// Create a scheduler and the receiver its ticks are delivered to.
    #[must_use]
    pub fn channel(delay: Duration) -> (Self, mpsc::UnboundedReceiver<AutoSaveTick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(delay, tx), rx)
    }

    /// Create a scheduler delivering ticks to `ticks`.
    #[must_use]
    pub fn new(delay: Duration, ticks: mpsc::UnboundedSender<AutoSaveTick>) -> Self {
        Self {
            delay,
            enabled: true,
            generation: 0,
            pending: None,
            ticks,
        }
    }

    /// Enable or disable arming. Disabling cancels any pending timer.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.cancel();
        }
    }

    /// Whether changes arm a timer.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Quiet period.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a timer is armed and its tick has not been accepted yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a change: cancel the pending timer and arm a new one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn notify_changed(&mut self) {
        if !self.enabled {
            return;
        }
        self.cancel();

        let tick = AutoSaveTick(self.generation);
        let delay = self.delay;
        let ticks = self.ticks.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the controller was dropped
            let _ = ticks.send(tick);
        }));
    }

    /// Cancel the pending timer, if any. A tick already in the queue becomes
    /// stale.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Consume `tick` if it belongs to the live timer.
    ///
    /// Returns `true` exactly once per armed timer; stale ticks return `false`.
    pub fn accept(&mut self, tick: AutoSaveTick) -> bool {
        if tick.0 != self.generation || self.pending.is_none() {
            return false;
        }
        self.pending = None;
        true
    }
}

impl Drop for AutoSaveScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tick_after_quiet_period() {
        let (mut scheduler, mut rx) = AutoSaveScheduler::channel(DEFAULT_AUTO_SAVE_DELAY);

        scheduler.notify_changed();
        assert!(scheduler.is_pending());

        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(rx.try_recv().is_err());

        let tick = rx.recv().await.unwrap();
        assert!(scheduler.accept(tick));
        assert!(!scheduler.is_pending());
        assert!(!scheduler.accept(tick));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_changes_yield_single_tick() {
        let (mut scheduler, mut rx) = AutoSaveScheduler::channel(DEFAULT_AUTO_SAVE_DELAY);

        for _ in 0..5 {
            scheduler.notify_changed();
            tokio::time::advance(Duration::from_millis(300)).await;
        }
        assert!(rx.try_recv().is_err());

        let tick = rx.recv().await.unwrap();
        assert!(scheduler.accept(tick));

        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_tick_goes_stale_on_change() {
        let (mut scheduler, mut rx) = AutoSaveScheduler::channel(DEFAULT_AUTO_SAVE_DELAY);

        scheduler.notify_changed();
        let stale = rx.recv().await.unwrap();

        // A change arrives before the controller got to the queued tick
        scheduler.notify_changed();

        assert!(!scheduler.accept(stale));
        assert!(scheduler.is_pending());
        let fresh = rx.recv().await.unwrap();
        assert!(scheduler.accept(fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_pending() {
        let (mut scheduler, mut rx) = AutoSaveScheduler::channel(DEFAULT_AUTO_SAVE_DELAY);

        scheduler.notify_changed();
        scheduler.cancel();
        assert!(!scheduler.is_pending());

        tokio::time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_never_arms() {
        let (mut scheduler, mut rx) = AutoSaveScheduler::channel(DEFAULT_AUTO_SAVE_DELAY);
        scheduler.set_enabled(false);

        scheduler.notify_changed();

        assert!(!scheduler.is_pending());
        assert!(!scheduler.is_enabled());
        tokio::time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_delay() {
        let (mut scheduler, mut rx) = AutoSaveScheduler::channel(Duration::from_millis(50));
        assert_eq!(scheduler.delay(), Duration::from_millis(50));

        scheduler.notify_changed();
        tokio::time::advance(Duration::from_millis(50)).await;

        let tick = rx.recv().await.unwrap();
        assert!(scheduler.accept(tick));
    }
}
