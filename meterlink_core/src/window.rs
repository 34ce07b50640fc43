//! Fixed-length accumulation windows compared against monotonic time.
//!
//! The window length is an explicit duration, independent of the scheduler's
//! tick interval. `last_reset_ms` only ever moves forward, and only when a
//! poll observes the window elapsed.

/// One accumulation window over epoch-relative milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct UsageWindow {
    last_reset_ms: u64,
    length_ms: u64,
}

impl UsageWindow {
    pub fn new(length_ms: u64, now_ms: u64) -> Self {
        debug_assert!(length_ms >= 1, "window length must be at least 1 ms");
        Self {
            last_reset_ms: now_ms,
            length_ms: length_ms.max(1),
        }
    }

    /// Close the window if it has elapsed. Returns true exactly once per
    /// elapsed window, advancing the reset point to `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_reset_ms) >= self.length_ms {
            self.last_reset_ms = now_ms;
            true
        } else {
            false
        }
    }

    pub fn last_reset_ms(&self) -> u64 {
        self.last_reset_ms
    }

    pub fn length_ms(&self) -> u64 {
        self.length_ms
    }
}
