// src/poll.rs

//! Bounded polling for conditions that settle on their own
//!
//! Uploads may still be in flight when the batch starts; the Debian
//! pipeline waits a bounded number of intervals for every referenced file
//! to appear. Sleeping goes through [`Sleeper`] so tests can run the full
//! schedule instantly.

use std::time::Duration;
use tracing::warn;

/// Something that can block the current thread for a while
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleeping
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// At most `max_checks` checks, `interval` apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedPoll {
    pub max_checks: u32,
    pub interval: Duration,
}

impl BoundedPoll {
    pub fn new(max_checks: u32, interval: Duration) -> Self {
        Self {
            max_checks: max_checks.max(1),
            interval,
        }
    }

    /// Check `ready` until it holds or the checks run out
    ///
    /// Returns whether the condition was eventually met. There is no sleep
    /// after the final failed check.
    pub fn wait_until<F>(&self, sleeper: &dyn Sleeper, what: &str, mut ready: F) -> bool
    where
        F: FnMut() -> bool,
    {
        for check in 1..=self.max_checks {
            if ready() {
                return true;
            }
            if check < self.max_checks {
                warn!(
                    "{}: not ready, trying again in {}s ({}/{})",
                    what,
                    self.interval.as_secs(),
                    check,
                    self.max_checks - 1
                );
                sleeper.sleep(self.interval);
            }
        }
        false
    }
}
