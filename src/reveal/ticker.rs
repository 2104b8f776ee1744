//! Ticker Actor: Dedicated thread that paces the typewriter reveal.
//!
//! One ticker exists per reveal session. Each ticker owns its own channel,
//! so once a session is cancelled and its ticker joined, nothing it sent can
//! reach the controller: the old receiver goes away with the actor.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// A tick event sent at regular intervals.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Frame number (monotonically increasing).
    pub frame: u64,
    /// Time elapsed since the ticker was started.
    pub elapsed: Duration,
}

/// Ticker actor that generates regular timing events.
pub struct TickerActor {
    /// Handle to the ticker thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    /// Receiver for tick events.
    tick_rx: Receiver<Tick>,
}

impl TickerActor {
    /// Spawn a new ticker actor with the given interval.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the ticker thread.
    pub fn spawn(interval: Duration) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);

        // Bounded channel with small buffer - ticks must not pile up
        let (tick_tx, tick_rx) = bounded(2);

        let handle = thread::Builder::new()
            .name("storyteller-ticker".to_string())
            .spawn(move || {
                Self::run_loop(&tick_tx, &shutdown_clone, interval);
            })
            .expect("Failed to spawn ticker thread");

        Self {
            handle: Some(handle),
            shutdown,
            tick_rx,
        }
    }

    /// Get a reference to the tick receiver.
    #[inline]
    pub const fn receiver(&self) -> &Receiver<Tick> {
        &self.tick_rx
    }

    /// Signal the ticker to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Whether the ticker thread is still alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the ticker and wait for its thread to exit.
    ///
    /// After this returns the thread has sent its last tick.
    pub fn join(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main ticker loop.
    fn run_loop(tick_tx: &Sender<Tick>, shutdown: &AtomicBool, interval: Duration) {
        let start = Instant::now();
        let mut frame = 0u64;
        let mut next_tick = start + interval;

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            let now = Instant::now();
            if now >= next_tick {
                let tick = Tick {
                    frame,
                    elapsed: now - start,
                };

                // Receiver too slow: drop the tick rather than queue it
                if let Err(crossbeam_channel::TrySendError::Disconnected(_)) =
                    tick_tx.try_send(tick)
                {
                    break;
                }

                frame += 1;
                next_tick += interval;

                // Behind schedule: catch up without a burst
                if next_tick < now {
                    next_tick = now + interval;
                }
            } else {
                thread::sleep((next_tick - now).min(Duration::from_millis(1)));
            }
        }
    }
}

impl Drop for TickerActor {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

impl std::fmt::Debug for TickerActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickerActor")
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_basic() {
        let ticker = TickerActor::spawn(Duration::from_millis(10));

        let tick = ticker.receiver().recv_timeout(Duration::from_millis(200));
        assert!(tick.is_ok());
        assert_eq!(tick.unwrap().frame, 0);

        let tick2 = ticker.receiver().recv_timeout(Duration::from_millis(200));
        assert!(tick2.is_ok());

        ticker.join();
    }

    #[test]
    fn test_ticker_join_is_final() {
        let ticker = TickerActor::spawn(Duration::from_millis(5));
        let rx = ticker.receiver().clone();
        ticker.join();

        // Drain whatever was buffered before the join; nothing arrives after.
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(30));
        assert!(rx.try_recv().is_err());
    }
}
