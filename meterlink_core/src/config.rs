//! Runtime configuration for the telemetry pipeline.
//!
//! These are the structs `TelemetryNode` consumes. They are separate from the
//! TOML-deserialized schema in `meterlink_config`; `conversions` bridges the
//! two.

/// ACS712 transfer function constants.
#[derive(Debug, Clone, Copy)]
pub struct SenseCfg {
    /// ADC counts subtracted before scaling.
    pub zero_offset_counts: u16,
    /// ADC reference voltage (V).
    pub vref_v: f32,
    /// Full-scale ADC count (1024 for a 10-bit converter).
    pub adc_counts: u32,
    /// Rest-level voltage subtracted after scaling (V).
    pub midpoint_v: f32,
    /// Sensor sensitivity (V per A).
    pub amps_sensitivity_v_per_a: f32,
}

impl Default for SenseCfg {
    fn default() -> Self {
        Self {
            zero_offset_counts: 24,
            vref_v: 5.0,
            adc_counts: 1024,
            midpoint_v: 2.5,
            amps_sensitivity_v_per_a: 0.066,
        }
    }
}

/// Flow sensor constant.
#[derive(Debug, Clone, Copy)]
pub struct FlowCfg {
    /// Millilitres per pulse.
    pub ml_per_pulse: f32,
}

impl Default for FlowCfg {
    fn default() -> Self {
        Self {
            ml_per_pulse: 355.0 / 175.0,
        }
    }
}

/// Alarm thresholds and indicator blink timing.
#[derive(Debug, Clone, Copy)]
pub struct AlarmCfg {
    pub power_threshold_w: f64,
    pub water_threshold_ml: f64,
    pub blink_on_ms: u64,
    pub blink_off_ms: u64,
}

impl Default for AlarmCfg {
    fn default() -> Self {
        Self {
            power_threshold_w: 5.0,
            water_threshold_ml: 1000.0,
            blink_on_ms: 1000,
            blink_off_ms: 1000,
        }
    }
}

/// Scheduler and window timing. Window lengths are independent of the tick
/// interval; only their defaults coincide.
#[derive(Debug, Clone, Copy)]
pub struct TimingCfg {
    pub tick_ms: u64,
    pub power_window_ms: u64,
    pub water_window_ms: u64,
    pub sensor_timeout_ms: u64,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            power_window_ms: 1000,
            water_window_ms: 1000,
            sensor_timeout_ms: 100,
        }
    }
}

/// Bounded-retry connectivity policy.
#[derive(Debug, Clone, Copy)]
pub struct LinkCfg {
    pub max_attempts: u32,
    pub retry_ms: u64,
}

impl Default for LinkCfg {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            retry_ms: 1000,
        }
    }
}

/// Everything the node needs, bundled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeConfig {
    pub sense: SenseCfg,
    pub flow: FlowCfg,
    pub alarms: AlarmCfg,
    pub timing: TimingCfg,
}
