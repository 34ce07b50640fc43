//! Threshold alarms over cumulative totals, and the indicator they share.
//!
//! Both per-metric alarm states are exposed; the single physical indicator is
//! driven by their logical OR, not by whichever check happened to run last.

use crate::aggregate::TickMetrics;
use crate::config::AlarmCfg;
use crate::error::{Result, map_hw_error};
use meterlink_traits::{Clock, Indicator};
use std::time::Duration;

/// Per-metric alarm states for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlarmReport {
    pub power: bool,
    pub water: bool,
}

impl AlarmReport {
    /// Combinator for the shared indicator: on when any alarm is active.
    pub fn any(&self) -> bool {
        self.power || self.water
    }
}

/// Boundary-inclusive threshold check.
#[inline]
pub fn is_over(total: f64, threshold: f64) -> bool {
    total >= threshold
}

pub struct AlarmEvaluator {
    power_threshold_w: f64,
    water_threshold_ml: f64,
    blink_on: Duration,
    blink_off: Duration,
}

impl AlarmEvaluator {
    pub fn new(cfg: &AlarmCfg) -> Self {
        Self {
            power_threshold_w: cfg.power_threshold_w,
            water_threshold_ml: cfg.water_threshold_ml,
            blink_on: Duration::from_millis(cfg.blink_on_ms),
            blink_off: Duration::from_millis(cfg.blink_off_ms),
        }
    }

    /// Recompute both alarm states from the current totals. Derived, not
    /// stored: there is no latching.
    pub fn evaluate(&self, metrics: &TickMetrics) -> AlarmReport {
        AlarmReport {
            power: is_over(metrics.power_total_w, self.power_threshold_w),
            water: is_over(metrics.volume_total_ml, self.water_threshold_ml),
        }
    }

    /// Drive the indicator from an evaluation: one full blink cycle while any
    /// alarm is active, steady off otherwise. Sleeps go through the clock so
    /// tests run instantly.
    pub fn drive<I: Indicator>(
        &self,
        indicator: &mut I,
        report: &AlarmReport,
        metrics: &TickMetrics,
        clock: &dyn Clock,
    ) -> Result<()> {
        if report.power {
            tracing::warn!(
                total_w = metrics.power_total_w,
                threshold_w = self.power_threshold_w,
                "total power usage exceeded threshold"
            );
        }
        if report.water {
            tracing::warn!(
                total_ml = metrics.volume_total_ml,
                threshold_ml = self.water_threshold_ml,
                "total water usage exceeded threshold"
            );
        }

        if report.any() {
            indicator
                .set(true)
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))?;
            clock.sleep(self.blink_on);
            indicator
                .set(false)
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))?;
            clock.sleep(self.blink_off);
        } else {
            indicator
                .set(false)
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meterlink_traits::ManualClock;

    fn metrics_with_totals(power_total_w: f64, volume_total_ml: f64) -> TickMetrics {
        TickMetrics {
            power_w: 0.0,
            power_total_w,
            flow_ml_s: 0.0,
            volume_total_ml,
            power_window_closed: false,
            water_window_closed: false,
        }
    }

    #[derive(Default)]
    struct SpyIndicator {
        states: Vec<bool>,
    }

    impl Indicator for SpyIndicator {
        fn set(&mut self, on: bool) -> meterlink_traits::HwResult<()> {
            self.states.push(on);
            Ok(())
        }
    }

    #[test]
    fn fires_at_threshold_boundary_inclusive() {
        let eval = AlarmEvaluator::new(&AlarmCfg::default());
        assert!(eval.evaluate(&metrics_with_totals(5.2, 0.0)).power);
        assert!(eval.evaluate(&metrics_with_totals(5.0, 0.0)).power);
        assert!(!eval.evaluate(&metrics_with_totals(4.9, 0.0)).power);
        assert!(eval.evaluate(&metrics_with_totals(0.0, 1000.0)).water);
        assert!(!eval.evaluate(&metrics_with_totals(0.0, 999.9)).water);
    }

    #[test]
    fn indicator_follows_or_of_both_alarms() {
        let report = AlarmReport {
            power: false,
            water: true,
        };
        assert!(report.any());
        let report = AlarmReport {
            power: true,
            water: false,
        };
        assert!(report.any());
        assert!(!AlarmReport::default().any());
    }

    #[test]
    fn active_alarm_blinks_one_full_cycle() {
        let eval = AlarmEvaluator::new(&AlarmCfg::default());
        let clock = ManualClock::new();
        let epoch = clock.now();
        let mut led = SpyIndicator::default();
        let metrics = metrics_with_totals(6.0, 0.0);
        let report = eval.evaluate(&metrics);
        eval.drive(&mut led, &report, &metrics, &clock).unwrap();
        assert_eq!(led.states, vec![true, false]);
        // Full cycle: 1 s on + 1 s off through the clock.
        assert_eq!(clock.ms_since(epoch), 2000);
    }

    #[test]
    fn idle_alarm_holds_indicator_off() {
        let eval = AlarmEvaluator::new(&AlarmCfg::default());
        let clock = ManualClock::new();
        let epoch = clock.now();
        let mut led = SpyIndicator::default();
        let metrics = metrics_with_totals(0.0, 0.0);
        let report = eval.evaluate(&metrics);
        eval.drive(&mut led, &report, &metrics, &clock).unwrap();
        assert_eq!(led.states, vec![false]);
        assert_eq!(clock.ms_since(epoch), 0);
    }
}
