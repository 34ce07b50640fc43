//! Telemetry reporting: the ordered metric vector handed to the uplink.

use crate::aggregate::TickMetrics;
use meterlink_traits::{MetricField, Uplink};

pub const FIELD_POWER_RATE: &str = "power_w";
pub const FIELD_POWER_TOTAL: &str = "power_total_w";
pub const FIELD_FLOW_RATE: &str = "flow_ml_s";
pub const FIELD_VOLUME_TOTAL: &str = "volume_total_ml";

#[derive(Debug, Default)]
pub struct TelemetryReporter;

impl TelemetryReporter {
    pub fn new() -> Self {
        Self
    }

    /// The wire vector, in channel-field order: instant power, cumulative
    /// power, instant flow, cumulative volume.
    pub fn fields(metrics: &TickMetrics) -> [MetricField; 4] {
        [
            MetricField::new(FIELD_POWER_RATE, metrics.power_w as f32),
            MetricField::new(FIELD_POWER_TOTAL, metrics.power_total_w as f32),
            MetricField::new(FIELD_FLOW_RATE, metrics.flow_ml_s as f32),
            MetricField::new(FIELD_VOLUME_TOTAL, metrics.volume_total_ml as f32),
        ]
    }

    /// Emit one cycle: human-readable dump plus fire-and-forget upload.
    /// Upload failures are logged and dropped; the pipeline never blocks on
    /// the collaborator's outcome.
    pub fn publish<U: Uplink>(&self, metrics: &TickMetrics, uplink: &mut U) {
        let fields = Self::fields(metrics);
        for field in &fields {
            tracing::info!(name = field.name, value = field.value, "metric");
        }
        if let Err(e) = uplink.upload(&fields) {
            tracing::warn!(error = %e, "upload failed; dropping sample");
        }
    }
}
