//! Test and helper mocks for meterlink_core.

use meterlink_traits::{AnalogIn, HwResult, Indicator, MetricField, Uplink};
use std::time::Duration;

/// Analog input that always errors; useful when driving the pipeline with
/// externally sourced raw values.
pub struct NoopAnalogIn;

impl AnalogIn for NoopAnalogIn {
    fn read(&mut self, _timeout: Duration) -> HwResult<u16> {
        Err(Box::new(std::io::Error::other("noop analog input")))
    }
}

/// Indicator that discards writes.
#[derive(Default)]
pub struct NullIndicator;

impl Indicator for NullIndicator {
    fn set(&mut self, _on: bool) -> HwResult<()> {
        Ok(())
    }
}

/// Uplink that accepts and drops every vector.
#[derive(Default)]
pub struct NullUplink;

impl Uplink for NullUplink {
    fn upload(&mut self, _fields: &[MetricField]) -> HwResult<()> {
        Ok(())
    }
}
