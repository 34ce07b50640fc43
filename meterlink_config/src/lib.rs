#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the telemetry node.
//!
//! `Config` and sub-structs are deserialized from TOML and validated. Every
//! tunable the pipeline recognizes lives here: sensor transfer constants,
//! alarm thresholds, tick/window timing, and the uplink endpoint.
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    /// GPIO pin carrying the flow sensor's pulse output (rising edge per pulse).
    pub flow_in: u8,
    /// GPIO pin driving the alarm indicator LED.
    pub alarm_led: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            flow_in: 2,
            alarm_led: 17,
        }
    }
}

/// ACS712-5A transfer function constants.
///
/// voltage = (raw - zero_offset_counts) * (vref_v / adc_counts) - midpoint_v
/// current = voltage / amps_sensitivity_v_per_a
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SenseCfg {
    /// ADC counts subtracted before scaling (sensor zero offset).
    pub zero_offset_counts: u16,
    /// ADC reference voltage in volts.
    pub vref_v: f32,
    /// Full-scale ADC count (e.g. 1024 for a 10-bit converter).
    pub adc_counts: u32,
    /// Midpoint voltage subtracted after scaling (bidirectional sensor rest level).
    pub midpoint_v: f32,
    /// Sensor sensitivity in volts per ampere (66 mV/A for the 5 A part).
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

/// YF-S201 flow sensor constant.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct FlowCfg {
    /// Millilitres represented by one pulse.
    pub ml_per_pulse: f32,
}

impl Default for FlowCfg {
    fn default() -> Self {
        Self {
            // 355/175, the datasheet-derived constant of the original deployment.
            ml_per_pulse: 355.0 / 175.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct AlarmCfg {
    /// Alarm once cumulative power usage reaches this many watts.
    pub power_threshold_w: f64,
    /// Alarm once cumulative volume reaches this many millilitres.
    pub water_threshold_ml: f64,
    /// Indicator on-time per blink cycle (ms).
    pub blink_on_ms: u64,
    /// Indicator off-time per blink cycle (ms).
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

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct TimingCfg {
    /// Scheduler tick interval (ms).
    pub tick_ms: u64,
    /// Power accumulation window length (ms); independent of `tick_ms`.
    pub power_window_ms: u64,
    /// Water accumulation window length (ms); independent of `tick_ms`.
    pub water_window_ms: u64,
    /// Max wait for one analog reading (ms).
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

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UplinkCfg {
    /// Metrics endpoint host.
    pub host: String,
    pub port: u16,
    /// HTTP path posted to.
    pub path: String,
    /// Channel write key sent with every update.
    pub write_key: String,
    /// Connect/write timeout per upload (ms).
    pub io_timeout_ms: u64,
}

impl Default for UplinkCfg {
    fn default() -> Self {
        Self {
            host: "api.thingspeak.com".into(),
            port: 80,
            path: "/update".into(),
            write_key: String::new(),
            io_timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct LinkCfg {
    /// Connection attempts before giving up (the node runs regardless).
    pub max_attempts: u32,
    /// Delay between attempts (ms).
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

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,
    pub level: Option<String>, // "info","debug"
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub sense: SenseCfg,
    pub flow: FlowCfg,
    pub alarms: AlarmCfg,
    pub timing: TimingCfg,
    pub uplink: UplinkCfg,
    pub link: LinkCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sense
        if self.sense.vref_v <= 0.0 || !self.sense.vref_v.is_finite() {
            eyre::bail!("sense.vref_v must be a positive finite voltage");
        }
        if self.sense.adc_counts == 0 {
            eyre::bail!("sense.adc_counts must be > 0");
        }
        if u32::from(self.sense.zero_offset_counts) >= self.sense.adc_counts {
            eyre::bail!("sense.zero_offset_counts must be below sense.adc_counts");
        }
        if self.sense.amps_sensitivity_v_per_a <= 0.0
            || !self.sense.amps_sensitivity_v_per_a.is_finite()
        {
            eyre::bail!("sense.amps_sensitivity_v_per_a must be > 0");
        }
        if !self.sense.midpoint_v.is_finite() {
            eyre::bail!("sense.midpoint_v must be finite");
        }

        // Flow
        if self.flow.ml_per_pulse <= 0.0 || !self.flow.ml_per_pulse.is_finite() {
            eyre::bail!("flow.ml_per_pulse must be > 0");
        }

        // Alarms
        if self.alarms.power_threshold_w < 0.0 {
            eyre::bail!("alarms.power_threshold_w must be >= 0");
        }
        if self.alarms.water_threshold_ml < 0.0 {
            eyre::bail!("alarms.water_threshold_ml must be >= 0");
        }

        // Timing
        if self.timing.tick_ms == 0 {
            eyre::bail!("timing.tick_ms must be >= 1");
        }
        if self.timing.power_window_ms == 0 || self.timing.water_window_ms == 0 {
            eyre::bail!("timing window lengths must be >= 1");
        }
        if self.timing.sensor_timeout_ms == 0 {
            eyre::bail!("timing.sensor_timeout_ms must be >= 1");
        }
        if self.timing.tick_ms > 60 * 60 * 1000 {
            eyre::bail!("timing.tick_ms is unreasonably large (>1h)");
        }

        // Uplink
        if self.uplink.host.is_empty() {
            eyre::bail!("uplink.host must not be empty");
        }
        if self.uplink.port == 0 {
            eyre::bail!("uplink.port must be > 0");
        }
        if !self.uplink.path.starts_with('/') {
            eyre::bail!("uplink.path must start with '/'");
        }
        if self.uplink.io_timeout_ms == 0 {
            eyre::bail!("uplink.io_timeout_ms must be >= 1");
        }

        // Link
        if self.link.max_attempts == 0 {
            eyre::bail!("link.max_attempts must be >= 1");
        }
        if self.link.retry_ms == 0 {
            eyre::bail!("link.retry_ms must be >= 1");
        }

        Ok(())
    }
}
