//! Raspberry Pi devices behind the `hardware` feature.
//!
//! The flow sensor is a rising-edge interrupt on a GPIO input, the alarm
//! indicator an output pin, and the analog current channel an MCP3008
//! 10-bit converter on SPI0.

use std::time::Duration;

use rppal::gpio::{Gpio, InputPin, OutputPin, Trigger};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

use meterlink_traits::{AnalogIn, HwResult, Indicator, PulseSource};

use crate::error::{HwError, Result};

fn gpio_err(e: rppal::gpio::Error) -> HwError {
    HwError::Gpio(e.to_string())
}

/// YF-S201 pulse input: one rising edge per vane rotation.
pub struct GpioFlowSensor {
    pin: InputPin,
}

impl GpioFlowSensor {
    pub fn new(bcm_pin: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(gpio_err)?;
        let mut pin = gpio.get(bcm_pin).map_err(gpio_err)?.into_input_pulldown();
        pin.set_interrupt(Trigger::RisingEdge).map_err(gpio_err)?;
        Ok(Self { pin })
    }
}

impl PulseSource for GpioFlowSensor {
    fn wait_edge(&mut self, timeout: Duration) -> HwResult<bool> {
        match self.pin.poll_interrupt(false, Some(timeout)) {
            Ok(Some(_)) => Ok(true),
            Ok(None) => Ok(false),
            Err(e) => Err(Box::new(gpio_err(e))),
        }
    }
}

/// Alarm LED on a GPIO output, active high.
pub struct GpioIndicator {
    pin: OutputPin,
}

impl GpioIndicator {
    pub fn new(bcm_pin: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(gpio_err)?;
        let mut pin = gpio.get(bcm_pin).map_err(gpio_err)?.into_output();
        pin.set_low();
        Ok(Self { pin })
    }
}

impl Indicator for GpioIndicator {
    fn set(&mut self, on: bool) -> HwResult<()> {
        if on {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }
}

/// ACS712 channel behind an MCP3008 converter on SPI0.
pub struct Mcp3008Adc {
    spi: Spi,
    channel: u8,
}

impl Mcp3008Adc {
    pub fn new(channel: u8) -> Result<Self> {
        if channel > 7 {
            return Err(HwError::Gpio(format!("mcp3008 channel {channel} out of range")));
        }
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, 1_350_000, Mode::Mode0)
            .map_err(|e| HwError::Gpio(e.to_string()))?;
        Ok(Self { spi, channel })
    }
}

impl AnalogIn for Mcp3008Adc {
    fn read(&mut self, _timeout: Duration) -> HwResult<u16> {
        // Single-ended conversion: start bit, mode+channel, one clocking byte.
        let tx = [0x01, (0x08 | self.channel) << 4, 0x00];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Gpio(e.to_string()))?;
        let raw = (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2]);
        tracing::trace!(raw, "mcp3008 sample");
        Ok(raw)
    }
}
