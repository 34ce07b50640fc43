//! Hardware backends for the telemetry node: simulated devices for desktop
//! runs and, behind the `hardware` feature, Raspberry Pi GPIO devices.

pub mod error;
#[cfg(feature = "hardware")]
pub mod gpio;
pub mod uplink;

pub use error::HwError;
pub use uplink::HttpUplink;

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use meterlink_traits::{AnalogIn, Connectivity, HwResult, Indicator, PulseSource};

/// Simulated current sensor: replays a scripted sequence of raw converter
/// counts, holding the last value once the script runs out.
pub struct SimulatedAdc {
    script: Vec<u16>,
    next: usize,
}

impl SimulatedAdc {
    /// A sensor that always reads the same raw count.
    pub fn steady(raw: u16) -> Self {
        Self::scripted(vec![raw])
    }

    pub fn scripted(script: Vec<u16>) -> Self {
        Self { script, next: 0 }
    }
}

impl AnalogIn for SimulatedAdc {
    fn read(&mut self, _timeout: Duration) -> HwResult<u16> {
        let raw = match self.script.get(self.next) {
            Some(&v) => {
                self.next += 1;
                v
            }
            None => *self.script.last().unwrap_or(&0),
        };
        tracing::debug!(raw, "simulated adc sample");
        Ok(raw)
    }
}

/// Simulated flow sensor: reports a fixed burst of edges, then quiet.
pub struct SimulatedFlow {
    remaining: u32,
}

impl SimulatedFlow {
    pub fn burst(edges: u32) -> Self {
        Self { remaining: edges }
    }
}

impl PulseSource for SimulatedFlow {
    fn wait_edge(&mut self, timeout: Duration) -> HwResult<bool> {
        if self.remaining > 0 {
            self.remaining -= 1;
            return Ok(true);
        }
        // Quiet line: behave like a real sensor and block for the timeout.
        std::thread::sleep(timeout);
        Ok(false)
    }
}

/// Indicator that reports state changes through the log instead of a pin.
#[derive(Default)]
pub struct LogIndicator {
    lit: bool,
}

impl Indicator for LogIndicator {
    fn set(&mut self, on: bool) -> HwResult<()> {
        if on != self.lit {
            tracing::info!(on, "alarm indicator");
            self.lit = on;
        }
        Ok(())
    }
}

/// Connectivity probe over plain TCP: the link is considered up when the
/// upload endpoint accepts a connection.
pub struct TcpConnectivity {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpConnectivity {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }
}

impl Connectivity for TcpConnectivity {
    fn connect(&mut self) -> HwResult<()> {
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| HwError::Uplink(format!("no address for {}", self.host)))?;
        let stream = TcpStream::connect_timeout(&addr, self.timeout)?;
        drop(stream);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_adc_replays_then_holds() {
        let mut adc = SimulatedAdc::scripted(vec![24, 100, 512]);
        let t = Duration::from_millis(10);
        assert_eq!(adc.read(t).unwrap(), 24);
        assert_eq!(adc.read(t).unwrap(), 100);
        assert_eq!(adc.read(t).unwrap(), 512);
        assert_eq!(adc.read(t).unwrap(), 512);
    }

    #[rstest::rstest]
    #[case(0)]
    #[case(3)]
    #[case(175)]
    fn flow_burst_emits_then_goes_quiet(#[case] edges: u32) {
        let mut flow = SimulatedFlow::burst(edges);
        let t = Duration::from_millis(1);
        for _ in 0..edges {
            assert!(flow.wait_edge(t).unwrap());
        }
        assert!(!flow.wait_edge(t).unwrap());
        assert!(!flow.wait_edge(t).unwrap());
    }

    #[test]
    fn log_indicator_tracks_state() {
        let mut led = LogIndicator::default();
        led.set(true).unwrap();
        led.set(true).unwrap();
        led.set(false).unwrap();
    }
}
