//! `From` implementations bridging `meterlink_config` types to core types.

use crate::config::{AlarmCfg, FlowCfg, LinkCfg, NodeConfig, SenseCfg, TimingCfg};

impl From<&meterlink_config::SenseCfg> for SenseCfg {
    fn from(c: &meterlink_config::SenseCfg) -> Self {
        Self {
            zero_offset_counts: c.zero_offset_counts,
            vref_v: c.vref_v,
            adc_counts: c.adc_counts,
            midpoint_v: c.midpoint_v,
            amps_sensitivity_v_per_a: c.amps_sensitivity_v_per_a,
        }
    }
}

impl From<&meterlink_config::FlowCfg> for FlowCfg {
    fn from(c: &meterlink_config::FlowCfg) -> Self {
        Self {
            ml_per_pulse: c.ml_per_pulse,
        }
    }
}

impl From<&meterlink_config::AlarmCfg> for AlarmCfg {
    fn from(c: &meterlink_config::AlarmCfg) -> Self {
        Self {
            power_threshold_w: c.power_threshold_w,
            water_threshold_ml: c.water_threshold_ml,
            blink_on_ms: c.blink_on_ms,
            blink_off_ms: c.blink_off_ms,
        }
    }
}

impl From<&meterlink_config::TimingCfg> for TimingCfg {
    fn from(c: &meterlink_config::TimingCfg) -> Self {
        Self {
            tick_ms: c.tick_ms,
            power_window_ms: c.power_window_ms,
            water_window_ms: c.water_window_ms,
            sensor_timeout_ms: c.sensor_timeout_ms,
        }
    }
}

impl From<&meterlink_config::LinkCfg> for LinkCfg {
    fn from(c: &meterlink_config::LinkCfg) -> Self {
        Self {
            max_attempts: c.max_attempts,
            retry_ms: c.retry_ms,
        }
    }
}

impl From<&meterlink_config::Config> for NodeConfig {
    fn from(c: &meterlink_config::Config) -> Self {
        Self {
            sense: (&c.sense).into(),
            flow: (&c.flow).into(),
            alarms: (&c.alarms).into(),
            timing: (&c.timing).into(),
        }
    }
}
