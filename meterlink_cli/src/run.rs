//! Node assembly: config mapping, backend selection, and the run loop.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use eyre::{Result, WrapErr};

use meterlink_config::Config;
use meterlink_core::{BoxedNode, EdgePump, LinkState, LinkSupervisor, NodeConfig, PulseCounter};
use meterlink_hardware::{HttpUplink, TcpConnectivity};
use meterlink_traits::{AnalogIn, Indicator, MonotonicClock, PulseSource};

/// Raw count that reads as zero amps with the default calibration.
const SIM_IDLE_RAW: u16 = 536;

fn make_adc(_config: &Config, sim_raw: Option<u16>) -> Result<Box<dyn AnalogIn>> {
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        if sim_raw.is_none() {
            let adc = meterlink_hardware::gpio::Mcp3008Adc::new(0)
                .wrap_err("initializing analog converter")?;
            return Ok(Box::new(adc));
        }
    }
    Ok(Box::new(meterlink_hardware::SimulatedAdc::steady(
        sim_raw.unwrap_or(SIM_IDLE_RAW),
    )))
}

fn make_flow(
    _config: &Config,
    sim_edges: Option<u32>,
) -> Result<Box<dyn PulseSource + Send>> {
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        if sim_edges.is_none() {
            let flow = meterlink_hardware::gpio::GpioFlowSensor::new(_config.pins.flow_in)
                .wrap_err("initializing flow sensor")?;
            return Ok(Box::new(flow));
        }
    }
    Ok(Box::new(meterlink_hardware::SimulatedFlow::burst(
        sim_edges.unwrap_or(0),
    )))
}

fn make_indicator(_config: &Config) -> Result<Box<dyn Indicator>> {
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        let led = meterlink_hardware::gpio::GpioIndicator::new(_config.pins.alarm_led)
            .wrap_err("initializing alarm indicator")?;
        return Ok(Box::new(led));
    }
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    {
        Ok(Box::new(meterlink_hardware::LogIndicator::default()))
    }
}

pub fn run_node(
    config: &Config,
    ticks: Option<u64>,
    sim_raw: Option<u16>,
    sim_edges: Option<u32>,
    offline: bool,
    shutdown: &Arc<AtomicBool>,
) -> Result<()> {
    let io_timeout = Duration::from_millis(config.uplink.io_timeout_ms);
    let uplink = HttpUplink::new(
        config.uplink.host.clone(),
        config.uplink.port,
        config.uplink.path.clone(),
        config.uplink.write_key.clone(),
        io_timeout,
    );

    if offline {
        tracing::info!("skipping connectivity handshake");
    } else {
        let mut transport =
            TcpConnectivity::new(config.uplink.host.clone(), config.uplink.port, io_timeout);
        let mut supervisor = LinkSupervisor::new(&(&config.link).into());
        let clock = MonotonicClock::new();
        if supervisor.establish(&mut transport, &clock) != LinkState::Connected {
            tracing::warn!("starting without connectivity; uploads will be dropped");
        }
    }

    let counter = PulseCounter::new();
    let flow = make_flow(config, sim_edges)?;
    let pump = EdgePump::spawn(
        flow,
        counter.clone(),
        Duration::from_millis(config.timing.sensor_timeout_ms),
    );

    let mut node = BoxedNode::builder()
        .with_adc(make_adc(config, sim_raw)?)
        .with_indicator(make_indicator(config)?)
        .with_uplink(uplink)
        .with_config(NodeConfig::from(config))
        .with_counter(counter)
        .build()
        .wrap_err("assembling telemetry node")?;

    tracing::info!(
        tick_ms = config.timing.tick_ms,
        host = %config.uplink.host,
        "telemetry node running"
    );
    node.run(shutdown, ticks);

    let (power_total_w, volume_total_ml) = node.totals();
    tracing::info!(power_total_w, volume_total_ml, "telemetry node stopped");
    drop(pump);
    Ok(())
}

/// One simulated sample through the conversion path, as a smoke test.
pub fn self_check(config: &Config) -> Result<()> {
    use meterlink_core::CurrentSense;

    let mut adc = meterlink_hardware::SimulatedAdc::steady(SIM_IDLE_RAW);
    let raw = adc
        .read(Duration::from_millis(config.timing.sensor_timeout_ms))
        .map_err(|e| eyre::eyre!("simulated sensor read failed: {e}"))?;
    let sense = CurrentSense::new(&(&config.sense).into());
    let signal = sense.convert(raw);
    println!(
        "self-check ok: raw={} voltage={:.3}V current={:.3}A power={:.3}W",
        raw,
        signal.voltage_v,
        signal.current_a,
        signal.power_w()
    );
    Ok(())
}
