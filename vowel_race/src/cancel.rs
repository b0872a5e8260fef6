//! Cooperative cancellation for worker threads.
//!
//! Workers only suspend in their random delay, so the token doubles as an
//! interruptible sleep: `cancel()` wakes every thread parked in `sleep()`.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sleep {
    Elapsed,
    Cancelled,
}

#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        *self.lock() = true;
        self.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.lock()
    }

    /// Sleeps for `duration` unless the token is cancelled first.
    pub fn sleep(&self, duration: Duration) -> Sleep {
        let deadline = Instant::now() + duration;
        let mut cancelled = self.lock();
        loop {
            if *cancelled {
                return Sleep::Cancelled;
            }
            let now = Instant::now();
            if now >= deadline {
                return Sleep::Elapsed;
            }
            // spurious wakeups loop back and re-check both conditions
            cancelled = self
                .wake
                .wait_timeout(cancelled, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
        }
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
