//! The telemetry node driver: one fixed-interval loop running the pipeline.
//!
//! Each tick runs sampling → aggregation → alarm → report in strict sequence;
//! nothing overlaps within a tick. Pulse edges arrive asynchronously through
//! the shared `PulseCounter`, independent of the tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use eyre::WrapErr;
use meterlink_traits::{AnalogIn, Clock, Indicator, MonotonicClock, Uplink};

use crate::aggregate::{TickMetrics, UsageAggregator};
use crate::alarm::{AlarmEvaluator, AlarmReport};
use crate::config::NodeConfig;
use crate::error::{BuildError, Result, map_hw_error};
use crate::pulse::PulseCounter;
use crate::report::TelemetryReporter;
use crate::signal::CurrentSense;

/// Outcome of one tick, for callers and tests.
#[derive(Debug, Clone, Copy)]
pub struct TickReport {
    pub metrics: TickMetrics,
    pub alarms: AlarmReport,
    /// Whether the raw analog sample fell inside the calibrated range.
    pub signal_in_range: bool,
}

pub struct TelemetryNode<A: AnalogIn, I: Indicator, U: Uplink> {
    adc: A,
    indicator: I,
    uplink: U,
    sense: CurrentSense,
    aggregator: UsageAggregator,
    alarms: AlarmEvaluator,
    reporter: TelemetryReporter,
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    tick_interval: Duration,
    sensor_timeout: Duration,
}

impl<A: AnalogIn, I: Indicator, U: Uplink> std::fmt::Debug for TelemetryNode<A, I, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryNode").finish_non_exhaustive()
    }
}

/// Node over boxed seams, as assembled by `NodeBuilder`.
pub type BoxedNode = TelemetryNode<Box<dyn AnalogIn>, Box<dyn Indicator>, Box<dyn Uplink>>;

impl<A: AnalogIn, I: Indicator, U: Uplink> TelemetryNode<A, I, U> {
    pub fn new(
        adc: A,
        indicator: I,
        uplink: U,
        cfg: &NodeConfig,
        counter: PulseCounter,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let epoch = clock.now();
        let now_ms = clock.ms_since(epoch);
        Self {
            adc,
            indicator,
            uplink,
            sense: CurrentSense::new(&cfg.sense),
            aggregator: UsageAggregator::new(&cfg.flow, &cfg.timing, counter, now_ms),
            alarms: AlarmEvaluator::new(&cfg.alarms),
            reporter: TelemetryReporter::new(),
            clock,
            epoch,
            tick_interval: Duration::from_millis(cfg.timing.tick_ms),
            sensor_timeout: Duration::from_millis(cfg.timing.sensor_timeout_ms),
        }
    }

    /// Handle to the shared pulse counter, for wiring up an edge source.
    pub fn counter(&self) -> PulseCounter {
        self.aggregator.counter()
    }

    /// Cumulative totals `(power_w, volume_ml)` so far.
    pub fn totals(&self) -> (f64, f64) {
        self.aggregator.totals()
    }

    /// Run the pipeline once: sample, aggregate, evaluate alarms, report.
    pub fn tick(&mut self) -> Result<TickReport> {
        let raw = self
            .adc
            .read(self.sensor_timeout)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading current sensor")?;

        let signal_in_range = self.sense.in_calibrated_range(raw);
        if !signal_in_range {
            tracing::debug!(raw, "analog reading outside calibrated range");
        }
        let signal = self.sense.convert(raw);

        let now_ms = self.clock.ms_since(self.epoch);
        let metrics = self.aggregator.tick(now_ms, &signal);

        let alarms = self.alarms.evaluate(&metrics);
        if let Err(e) = self
            .alarms
            .drive(&mut self.indicator, &alarms, &metrics, &*self.clock)
        {
            tracing::warn!(error = %e, "indicator update failed");
        }

        self.reporter.publish(&metrics, &mut self.uplink);

        Ok(TickReport {
            metrics,
            alarms,
            signal_in_range,
        })
    }

    /// Drive the loop until `shutdown` is raised or `max_ticks` elapse.
    ///
    /// Tick failures are logged and tolerated: the process degrades, it never
    /// halts itself.
    pub fn run(&mut self, shutdown: &AtomicBool, max_ticks: Option<u64>) {
        let mut ticks: u64 = 0;
        loop {
            if shutdown.load(Ordering::Relaxed) {
                tracing::info!(ticks, "shutdown requested");
                break;
            }
            if let Some(max) = max_ticks
                && ticks >= max
            {
                tracing::info!(ticks, "tick budget reached");
                break;
            }
            self.clock.sleep(self.tick_interval);
            match self.tick() {
                Ok(report) => {
                    tracing::trace!(
                        power_w = report.metrics.power_w,
                        flow_ml_s = report.metrics.flow_ml_s,
                        alarm = report.alarms.any(),
                        "tick"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "tick failed; continuing");
                }
            }
            ticks = ticks.saturating_add(1);
        }
        // Leave the indicator dark on exit (best-effort).
        if let Err(e) = self.indicator.set(false) {
            tracing::warn!(error = %e, "failed to clear indicator on shutdown");
        }
    }
}

/// Builder over boxed seams. All configuration is validated on `build()`.
#[derive(Default)]
pub struct NodeBuilder {
    adc: Option<Box<dyn AnalogIn>>,
    indicator: Option<Box<dyn Indicator>>,
    uplink: Option<Box<dyn Uplink>>,
    cfg: NodeConfig,
    counter: Option<PulseCounter>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
}

impl NodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adc(mut self, adc: impl AnalogIn + 'static) -> Self {
        self.adc = Some(Box::new(adc));
        self
    }

    pub fn with_indicator(mut self, indicator: impl Indicator + 'static) -> Self {
        self.indicator = Some(Box::new(indicator));
        self
    }

    pub fn with_uplink(mut self, uplink: impl Uplink + 'static) -> Self {
        self.uplink = Some(Box::new(uplink));
        self
    }

    pub fn with_config(mut self, cfg: NodeConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Share an existing counter (e.g. one already wired to an `EdgePump`).
    pub fn with_counter(mut self, counter: PulseCounter) -> Self {
        self.counter = Some(counter);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn build(self) -> Result<BoxedNode> {
        let adc = self
            .adc
            .ok_or_else(|| eyre::Report::new(BuildError::MissingAnalogIn))?;
        let indicator = self
            .indicator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingIndicator))?;
        let uplink = self
            .uplink
            .ok_or_else(|| eyre::Report::new(BuildError::MissingUplink))?;

        if self.cfg.timing.tick_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "tick_ms must be >= 1",
            )));
        }
        if self.cfg.timing.power_window_ms == 0 || self.cfg.timing.water_window_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "window lengths must be >= 1",
            )));
        }
        if !(self.cfg.alarms.power_threshold_w.is_finite()
            && self.cfg.alarms.water_threshold_ml.is_finite())
        {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "alarm thresholds must be finite",
            )));
        }
        if self.cfg.sense.adc_counts == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "adc_counts must be > 0",
            )));
        }
        if self.cfg.flow.ml_per_pulse <= 0.0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "ml_per_pulse must be > 0",
            )));
        }

        let counter = self.counter.unwrap_or_default();
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        Ok(TelemetryNode::new(
            adc, indicator, uplink, &self.cfg, counter, clock,
        ))
    }
}

impl BoxedNode {
    /// Start building a node over boxed seams.
    pub fn builder() -> NodeBuilder {
        NodeBuilder::new()
    }
}
