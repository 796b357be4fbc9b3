use std::time::Duration;

use compio::time::sleep;
use futures::future::{select, Either};
use futures::pin_mut;
use futures::StreamExt;
use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Quiet period after the last signal before a reload fires. Long enough to
/// absorb editor auto-save chatter, short enough to not feel unresponsive.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(250);

/// Cloneable handle feeding external-change signals into the scheduler.
#[derive(Debug, Clone)]
pub struct ChangeSignal {
    sender: UnboundedSender<()>,
}

impl ChangeSignal {
    /// Reports one external change. Never blocks; signals arriving while a
    /// reload handler is suspended are queued.
    pub fn notify(&self) {
        let _ = self.sender.unbounded_send(());
    }
}

/// Two-state debouncer: Idle until a signal arrives, then PendingReload with
/// a single in-flight timer that every further signal cancels and rearms.
///
/// There is no "ignore my own write" logic here; loop-freedom relies
/// entirely on the upstream no-op-write gates, which keep the engine's own
/// writes from producing a change signal in the first place.
pub struct DebounceScheduler {
    delay: Duration,
    signals: UnboundedReceiver<()>,
}

impl DebounceScheduler {
    pub fn new(delay: Duration) -> (Self, ChangeSignal) {
        let (sender, signals) = mpsc::unbounded();
        (Self { delay, signals }, ChangeSignal { sender })
    }

    /// Waits for the next coalesced reload point: blocks in Idle until a
    /// signal arrives, then keeps rearming the timer while further signals
    /// land inside the quiet period. Returns `None` once every
    /// [`ChangeSignal`] handle is dropped and no reload is pending.
    pub async fn next_reload(&mut self) -> Option<()> {
        // Idle: nothing pending until the first signal
        self.signals.next().await?;
        debug!("Change signal received, arming debounce timer");

        // PendingReload: one timer slot, rearmed on every further signal
        loop {
            let timer = sleep(self.delay);
            pin_mut!(timer);

            match select(timer, self.signals.next()).await {
                Either::Left(((), _)) => {
                    debug!("Debounce window elapsed, reloading");
                    return Some(());
                }
                Either::Right((Some(()), _)) => {
                    debug!("Coalescing change signal, rearming timer");
                }
                // Senders gone; still honor the pending reload
                Either::Right((None, _)) => return Some(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_scheduler() -> (DebounceScheduler, ChangeSignal) {
        DebounceScheduler::new(Duration::from_millis(20))
    }

    #[compio::test]
    async fn burst_of_signals_coalesces_into_one_reload() {
        let (mut scheduler, signal) = short_scheduler();

        for _ in 0..10 {
            signal.notify();
        }

        assert_eq!(scheduler.next_reload().await, Some(()));

        // Nothing further pending: dropping the handle ends the stream
        drop(signal);
        assert_eq!(scheduler.next_reload().await, None);
    }

    #[compio::test]
    async fn signals_after_a_reload_schedule_the_next_one() {
        let (mut scheduler, signal) = short_scheduler();

        signal.notify();
        assert_eq!(scheduler.next_reload().await, Some(()));

        signal.notify();
        signal.notify();
        assert_eq!(scheduler.next_reload().await, Some(()));
    }

    #[compio::test]
    async fn signal_inside_the_window_rearms_the_timer() {
        let (mut scheduler, signal) = DebounceScheduler::new(Duration::from_millis(40));

        signal.notify();

        let started = std::time::Instant::now();
        compio::runtime::spawn({
            let signal = signal.clone();
            async move {
                sleep(Duration::from_millis(20)).await;
                signal.notify();
            }
        })
        .detach();

        assert_eq!(scheduler.next_reload().await, Some(()));

        // The mid-window signal pushed the deadline past a single delay
        assert!(started.elapsed() >= Duration::from_millis(55));
    }

    #[compio::test]
    async fn dropping_all_handles_while_idle_ends_the_stream() {
        let (mut scheduler, signal) = short_scheduler();
        drop(signal);
        assert_eq!(scheduler.next_reload().await, None);
    }
}
