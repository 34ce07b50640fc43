//! ACS712 analog conversion: raw converter counts to calibrated volts/amps.
//!
//! The transfer function is fixed and linear; conversion is a pure function
//! of the latest raw sample with no hidden state. Out-of-calibration raw
//! values are not corrected — they convert to physically implausible
//! voltages — but `in_calibrated_range` makes the condition observable.

use crate::config::SenseCfg;

/// Derived voltage/current pair for one raw sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibratedSignal {
    pub voltage_v: f32,
    pub current_a: f32,
}

impl CalibratedSignal {
    /// Instantaneous power draw in watts. Voltage and current carry the same
    /// sign, so this is never negative for a real transfer function.
    #[inline]
    pub fn power_w(&self) -> f32 {
        self.voltage_v * self.current_a
    }
}

/// Current sensor transfer function with precomputed scale.
#[derive(Debug, Clone)]
pub struct CurrentSense {
    zero_offset_counts: u16,
    volts_per_count: f32,
    midpoint_v: f32,
    amps_sensitivity_v_per_a: f32,
    full_scale_counts: u32,
}

impl CurrentSense {
    pub fn new(cfg: &SenseCfg) -> Self {
        Self {
            zero_offset_counts: cfg.zero_offset_counts,
            volts_per_count: cfg.vref_v / cfg.adc_counts as f32,
            midpoint_v: cfg.midpoint_v,
            amps_sensitivity_v_per_a: cfg.amps_sensitivity_v_per_a,
            full_scale_counts: cfg.adc_counts,
        }
    }

    /// Convert one raw reading. Pure: identical input yields identical output.
    pub fn convert(&self, raw: u16) -> CalibratedSignal {
        let counts = i32::from(raw) - i32::from(self.zero_offset_counts);
        let voltage_v = counts as f32 * self.volts_per_count - self.midpoint_v;
        let current_a = voltage_v / self.amps_sensitivity_v_per_a;
        CalibratedSignal {
            voltage_v,
            current_a,
        }
    }

    /// Whether a raw reading falls inside the calibrated span of the
    /// converter. Readings outside still convert (uncorrected).
    pub fn in_calibrated_range(&self, raw: u16) -> bool {
        raw >= self.zero_offset_counts && u32::from(raw) < self.full_scale_counts
    }
}

impl Default for CurrentSense {
    fn default() -> Self {
        Self::new(&SenseCfg::default())
    }
}
