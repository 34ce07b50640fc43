//! Bounded-retry connectivity state machine.
//!
//! Replaces the original's blocking retry loop with explicit, observable
//! states: Disconnected → Connecting(attempt) → Connected | GaveUp. Giving up
//! is tolerated — the node runs regardless and uploads fail silently.

use crate::config::LinkCfg;
use meterlink_traits::{Clock, Connectivity};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting { attempt: u32 },
    Connected,
    GaveUp,
}

pub struct LinkSupervisor {
    state: LinkState,
    max_attempts: u32,
    retry: Duration,
}

impl LinkSupervisor {
    pub fn new(cfg: &LinkCfg) -> Self {
        Self {
            state: LinkState::Disconnected,
            max_attempts: cfg.max_attempts.max(1),
            retry: Duration::from_millis(cfg.retry_ms),
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Attempt to bring the link up, sleeping `retry` between failures, until
    /// success or the attempt budget is spent. Never fails the caller.
    pub fn establish<C: Connectivity + ?Sized>(
        &mut self,
        transport: &mut C,
        clock: &dyn Clock,
    ) -> LinkState {
        for attempt in 1..=self.max_attempts {
            self.state = LinkState::Connecting { attempt };
            tracing::info!(attempt, max = self.max_attempts, "connecting");
            match transport.connect() {
                Ok(()) => {
                    self.state = LinkState::Connected;
                    tracing::info!("connection established");
                    return self.state;
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "connect failed");
                    if attempt < self.max_attempts {
                        clock.sleep(self.retry);
                    }
                }
            }
        }
        self.state = LinkState::GaveUp;
        tracing::warn!(
            attempts = self.max_attempts,
            "giving up on connectivity; continuing offline"
        );
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meterlink_traits::ManualClock;

    /// Transport that fails a set number of times, then succeeds.
    struct FlakyTransport {
        failures_left: u32,
        calls: u32,
    }

    impl FlakyTransport {
        fn new(failures: u32) -> Self {
            Self {
                failures_left: failures,
                calls: 0,
            }
        }
    }

    impl Connectivity for FlakyTransport {
        fn connect(&mut self) -> meterlink_traits::HwResult<()> {
            self.calls += 1;
            if self.failures_left > 0 {
                self.failures_left -= 1;
                Err("association failed".into())
            } else {
                Ok(())
            }
        }
    }

    fn cfg(max_attempts: u32) -> LinkCfg {
        LinkCfg {
            max_attempts,
            retry_ms: 1000,
        }
    }

    #[test]
    fn connects_on_first_try() {
        let mut sup = LinkSupervisor::new(&cfg(20));
        let mut transport = FlakyTransport::new(0);
        let clock = ManualClock::new();
        let epoch = clock.now();
        assert_eq!(sup.establish(&mut transport, &clock), LinkState::Connected);
        assert_eq!(transport.calls, 1);
        assert_eq!(clock.ms_since(epoch), 0);
    }

    #[test]
    fn retries_then_connects() {
        let mut sup = LinkSupervisor::new(&cfg(20));
        let mut transport = FlakyTransport::new(3);
        let clock = ManualClock::new();
        let epoch = clock.now();
        assert_eq!(sup.establish(&mut transport, &clock), LinkState::Connected);
        assert_eq!(transport.calls, 4);
        // One retry delay per failure.
        assert_eq!(clock.ms_since(epoch), 3000);
    }

    #[test]
    fn gives_up_after_attempt_budget() {
        let mut sup = LinkSupervisor::new(&cfg(20));
        let mut transport = FlakyTransport::new(u32::MAX);
        let clock = ManualClock::new();
        assert_eq!(sup.establish(&mut transport, &clock), LinkState::GaveUp);
        assert_eq!(transport.calls, 20);
        assert_eq!(sup.state(), LinkState::GaveUp);
    }

    #[test]
    fn giving_up_is_not_an_error() {
        // The caller gets a state, never a Result failure.
        let mut sup = LinkSupervisor::new(&cfg(1));
        let mut transport = FlakyTransport::new(5);
        let clock = ManualClock::new();
        let state = sup.establish(&mut transport, &clock);
        assert_eq!(state, LinkState::GaveUp);
    }
}
