//! Usage aggregation: per-tick rates and windowed cumulative totals.
//!
//! Two independent windows (power, water) integrate the rate observed at
//! window close — a leaky-bucket integrator decoupled from the tick rate.
//! Rates are returned every tick; totals change at most once per elapsed
//! window and never decrease for the lifetime of the process.

use crate::config::{FlowCfg, TimingCfg};
use crate::pulse::PulseCounter;
use crate::signal::CalibratedSignal;
use crate::window::UsageWindow;

/// Everything one tick produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickMetrics {
    /// Instantaneous power draw (W).
    pub power_w: f64,
    /// Cumulative power usage across all closed windows (W-accumulated).
    pub power_total_w: f64,
    /// Instantaneous flow rate (ml/s).
    pub flow_ml_s: f64,
    /// Cumulative volume across all closed windows (ml).
    pub volume_total_ml: f64,
    pub power_window_closed: bool,
    pub water_window_closed: bool,
}

pub struct UsageAggregator {
    counter: PulseCounter,
    ml_per_pulse: f64,
    power_window: UsageWindow,
    water_window: UsageWindow,
    total_power_w: f64,
    total_volume_ml: f64,
}

impl UsageAggregator {
    pub fn new(flow: &FlowCfg, timing: &TimingCfg, counter: PulseCounter, now_ms: u64) -> Self {
        Self {
            counter,
            ml_per_pulse: f64::from(flow.ml_per_pulse),
            power_window: UsageWindow::new(timing.power_window_ms, now_ms),
            water_window: UsageWindow::new(timing.water_window_ms, now_ms),
            total_power_w: 0.0,
            total_volume_ml: 0.0,
        }
    }

    /// Fold one tick's samples into the running state.
    ///
    /// The water rate is derived from the unconsumed pulse count; the counter
    /// is drained only when its window closes, so the closing rate and the
    /// folded amount come from the same atomic read.
    pub fn tick(&mut self, now_ms: u64, signal: &CalibratedSignal) -> TickMetrics {
        let power_w = f64::from(signal.power_w());
        let power_window_closed = self.power_window.poll(now_ms);
        if power_window_closed {
            self.total_power_w += power_w;
        }

        let water_window_closed = self.water_window.poll(now_ms);
        let flow_ml_s = if water_window_closed {
            let pulses = self.counter.take_and_reset();
            let rate = self.ml_per_pulse * f64::from(pulses);
            self.total_volume_ml += rate;
            rate
        } else {
            self.ml_per_pulse * f64::from(self.counter.peek())
        };

        TickMetrics {
            power_w,
            power_total_w: self.total_power_w,
            flow_ml_s,
            volume_total_ml: self.total_volume_ml,
            power_window_closed,
            water_window_closed,
        }
    }

    /// Cumulative totals `(power_w, volume_ml)` so far.
    pub fn totals(&self) -> (f64, f64) {
        (self.total_power_w, self.total_volume_ml)
    }

    /// Handle to the shared pulse counter.
    pub fn counter(&self) -> PulseCounter {
        self.counter.clone()
    }
}
