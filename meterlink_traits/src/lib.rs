pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

use std::time::Duration;

/// Boxed error type shared by all hardware seams.
pub type HwResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// One named metric value in an upload vector. The wire position is the
/// index in the slice handed to `Uplink::upload`; the name is for humans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricField {
    pub name: &'static str,
    pub value: f32,
}

impl MetricField {
    pub fn new(name: &'static str, value: f32) -> Self {
        Self { name, value }
    }
}

/// Analog input channel (ADC). Readings are raw converter counts.
pub trait AnalogIn {
    fn read(&mut self, timeout: Duration) -> HwResult<u16>;
}

/// Blocking source of rising edges from a pulse-output sensor.
///
/// Returns `Ok(true)` when an edge arrived, `Ok(false)` on timeout with no
/// edge. Implementations back onto GPIO interrupts or a simulator thread.
pub trait PulseSource {
    fn wait_edge(&mut self, timeout: Duration) -> HwResult<bool>;
}

/// Binary visual indicator (alarm LED).
pub trait Indicator {
    fn set(&mut self, on: bool) -> HwResult<()>;
}

/// Upload collaborator: receives an ordered vector of metric fields once per
/// reporting cycle. Fire-and-forget; callers do not consume a payload back.
pub trait Uplink {
    fn upload(&mut self, fields: &[MetricField]) -> HwResult<()>;
}

/// Network association collaborator. Best-effort; a failed `connect` must
/// never hard-fail the process.
pub trait Connectivity {
    fn connect(&mut self) -> HwResult<()>;
}

// Boxed seams forward to their contents, so builders can hold `Box<dyn _>`.

impl<T: AnalogIn + ?Sized> AnalogIn for Box<T> {
    fn read(&mut self, timeout: Duration) -> HwResult<u16> {
        (**self).read(timeout)
    }
}

impl<T: PulseSource + ?Sized> PulseSource for Box<T> {
    fn wait_edge(&mut self, timeout: Duration) -> HwResult<bool> {
        (**self).wait_edge(timeout)
    }
}

impl<T: Indicator + ?Sized> Indicator for Box<T> {
    fn set(&mut self, on: bool) -> HwResult<()> {
        (**self).set(on)
    }
}

impl<T: Uplink + ?Sized> Uplink for Box<T> {
    fn upload(&mut self, fields: &[MetricField]) -> HwResult<()> {
        (**self).upload(fields)
    }
}

impl<T: Connectivity + ?Sized> Connectivity for Box<T> {
    fn connect(&mut self) -> HwResult<()> {
        (**self).connect()
    }
}
