//! Idempotent one-shot completion signal.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// One-shot signal fired when the frame target is reached.
///
/// `notify` is idempotent; `wait` blocks the external caller (never the
/// worker or the producer) until the signal fires or the timeout elapses.
pub(crate) struct TargetSignal {
    reached: Mutex<bool>,
    cond: Condvar,
}

impl TargetSignal {
    pub(crate) fn new() -> Self {
        Self {
            reached: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Fires the signal. Repeat calls are no-ops.
    pub(crate) fn notify(&self) {
        let mut reached = self
            .reached
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !*reached {
            *reached = true;
            self.cond.notify_all();
        }
    }

    /// Returns true once the signal has fired.
    pub(crate) fn is_set(&self) -> bool {
        *self
            .reached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until the signal fires or `timeout` elapses.
    ///
    /// Returns false on timeout. Spurious wakeups re-enter the wait with
    /// the remaining time.
    pub(crate) fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut reached = self
            .reached
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while !*reached {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            reached = self
                .cond
                .wait_timeout(reached, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_wait_times_out_without_notify() {
        let signal = TargetSignal::new();
        let start = Instant::now();
        assert!(!signal.wait(Duration::from_millis(50)));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed < Duration::from_millis(500));
    }

    #[test]
    fn test_wait_after_notify_returns_immediately() {
        let signal = TargetSignal::new();
        signal.notify();
        assert!(signal.wait(Duration::from_millis(1)));
        assert!(signal.is_set());
    }

    #[test]
    fn test_notify_idempotent() {
        let signal = TargetSignal::new();
        signal.notify();
        signal.notify();
        assert!(signal.is_set());
    }

    #[test]
    fn test_cross_thread_wakeup() {
        let signal = Arc::new(TargetSignal::new());
        let notifier = Arc::clone(&signal);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            notifier.notify();
        });
        assert!(signal.wait(Duration::from_secs(5)));
        handle.join().unwrap();
    }
}
