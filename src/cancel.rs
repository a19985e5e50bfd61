//! Request-scoped cancellation.
//!
//! A [`CancellationToken`] is cloned into every pipeline stage of one search.
//! Firing it is idempotent and visible to all clones at once: the atomic flag
//! serves cheap polling, and the `done` receiver lets a stage blocked inside
//! `select!` wake up, because dropping the only sender disconnects it.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender, after, bounded, select};

#[derive(Debug)]
struct Signal {
    cancelled: AtomicBool,
    trigger: Mutex<Option<Sender<()>>>,
}

/// Shared stop signal for one pipeline instance.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    signal: Arc<Signal>,
    done: Receiver<()>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        // Nothing is ever sent; cancellation disconnects the channel instead.
        let (trigger, done) = bounded(0);
        CancellationToken {
            signal: Arc::new(Signal {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
            }),
            done,
        }
    }

    /// Fires the signal. Calling it again has no further effect.
    pub fn cancel(&self) {
        if self.signal.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let trigger = match self.signal.trigger.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        drop(trigger);
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.cancelled.load(Ordering::SeqCst)
    }

    /// Receiver that becomes ready (disconnected) once the token fires.
    ///
    /// Meant as a `recv` arm of `crossbeam_channel::select!`.
    pub fn done(&self) -> &Receiver<()> {
        &self.done
    }

    /// Blocks until the token fires or `timeout` elapses.
    ///
    /// Returns `true` if the token fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        select! {
            recv(self.done) -> _ => true,
            recv(after(timeout)) -> _ => self.is_cancelled(),
        }
    }

    /// Spawns a watchdog that fires the token after `timeout`.
    ///
    /// The watchdog exits early once `finished` disconnects, so a request
    /// that completes in time leaves nothing running.
    pub fn cancel_after(&self, timeout: Duration, finished: Receiver<()>) -> thread::JoinHandle<()> {
        let token = self.clone();
        thread::spawn(move || {
            select! {
                recv(finished) -> _ => {}
                recv(token.done) -> _ => {}
                recv(after(timeout)) -> _ => {
                    tracing::warn!(?timeout, "search deadline elapsed, cancelling pipeline");
                    token.cancel();
                }
            }
        })
    }
}

#[test]
fn test_cancel_is_idempotent() {
    let token = CancellationToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());

    token.cancel();
    token.cancel();
    clone.cancel();

    assert!(token.is_cancelled());
    assert!(clone.is_cancelled());
    assert!(clone.done().recv().is_err());
}

#[test]
fn test_wait_timeout_without_cancel() {
    let token = CancellationToken::new();
    assert!(!token.wait_timeout(Duration::from_millis(5)));
}

#[test]
fn test_cancel_after_fires() {
    let token = CancellationToken::new();
    let (_finished_tx, finished_rx) = bounded::<()>(0);
    let watchdog = token.cancel_after(Duration::from_millis(1), finished_rx);
    assert!(token.wait_timeout(Duration::from_secs(5)));
    watchdog.join().unwrap();
}

#[test]
fn test_cancel_after_exits_when_finished() {
    let token = CancellationToken::new();
    let (finished_tx, finished_rx) = bounded::<()>(0);
    let watchdog = token.cancel_after(Duration::from_secs(60), finished_rx);
    drop(finished_tx);
    watchdog.join().unwrap();
    assert!(!token.is_cancelled());
}
