//! Injectable time source.
//!
//! Publication state is derived from "now", so every place the kernel reads
//! the clock goes through this capability. Production uses [`SystemClock`];
//! tests pin time with [`FixedClock`] to make boundary cases exact.

use std::sync::atomic::{AtomicI64, Ordering};

/// A source of the current time as Unix seconds.
pub trait Clock: Send + Sync {
    /// Current time, Unix seconds.
    fn now(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A clock pinned to an explicit instant, adjustable from tests.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    /// Create a clock pinned at the given Unix timestamp.
    pub fn at(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Move the clock to an absolute instant.
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Advance the clock by a number of seconds (may be negative).
    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
