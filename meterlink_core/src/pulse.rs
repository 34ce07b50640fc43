//! Interrupt-safe pulse counting for the flow sensor.
//!
//! `PulseCounter` is the single shared mutable value crossing concurrency
//! domains: the edge source increments it while the tick loop reads it. All
//! access is through atomic read-modify-write operations, so no edge can be
//! lost or double-counted between `on_edge` and `take_and_reset`.
//!
//! `EdgePump` adapts a blocking `PulseSource` into counter increments on a
//! background thread. Each pump owns exactly one thread, which is shut down
//! and joined when the pump is dropped.

use meterlink_traits::PulseSource;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

/// Shared rising-edge counter. Cloning yields another handle to the same
/// count.
#[derive(Debug, Clone, Default)]
pub struct PulseCounter {
    edges: Arc<AtomicU32>,
}

impl PulseCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one rising edge. Bounded, minimal work; callable from any
    /// thread or interrupt callback.
    #[inline]
    pub fn on_edge(&self) {
        self.edges.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the current count without consuming it.
    #[inline]
    pub fn peek(&self) -> u32 {
        self.edges.load(Ordering::Relaxed)
    }

    /// Atomically read the count and reset it to zero. Edges arriving
    /// concurrently land either in the returned value or in the next window,
    /// never in both and never nowhere.
    #[inline]
    pub fn take_and_reset(&self) -> u32 {
        self.edges.swap(0, Ordering::Relaxed)
    }
}

/// Background thread turning blocking edge waits into counter increments.
pub struct EdgePump {
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl EdgePump {
    pub fn spawn<P: PulseSource + Send + 'static>(
        mut source: P,
        counter: PulseCounter,
        timeout: Duration,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let join_handle = std::thread::spawn(move || {
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("edge pump received shutdown signal");
                    break;
                }
                match source.wait_edge(timeout) {
                    Ok(true) => counter.on_edge(),
                    Ok(false) => {
                        // Timeout with no edge; loop to re-check shutdown.
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "pulse source error; continuing");
                    }
                }
            }
            tracing::trace!("edge pump thread exiting cleanly");
        });

        Self {
            shutdown,
            join_handle: Some(join_handle),
        }
    }
}

impl Drop for EdgePump {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // The thread exits after at most one wait_edge timeout.
        if let Some(handle) = self.join_handle.take() {
            if let Err(e) = handle.join() {
                tracing::warn!(?e, "edge pump thread panicked during shutdown");
            }
        }
    }
}
