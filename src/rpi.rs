//! Raspberry Pi wiring through `rppal`.
//!
//! The defaults match the Waveshare High-Precision AD/DA board: CS on BCM 22,
//! DRDY on BCM 17, RESET on BCM 18, SPI0 at just under 1 MHz in mode 1.

use core::fmt;

use embedded_hal::digital::ErrorType;
use rppal::gpio::{Gpio, InputPin, OutputPin};
use rppal::hal::Delay;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

use crate::{Ads1256, Ads1256Error, Config};

pub type GpioError = <OutputPin as ErrorType>::Error;
pub type SpiError = rppal::spi::Error;
pub type Driver = Ads1256<Spi, OutputPin, InputPin, OutputPin, Delay>;

/// Physical wiring of one chip
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusConfig {
    pub spi_bus: Bus,
    /// Hardware slave select the SPI driver toggles. The chip itself is
    /// selected through `cs_pin`.
    pub slave_select: SlaveSelect,
    pub clock_hz: u32,
    pub mode: Mode,
    /// BCM GPIO numbers
    pub cs_pin: u8,
    pub drdy_pin: u8,
    pub rst_pin: u8,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            spi_bus: Bus::Spi0,
            slave_select: SlaveSelect::Ss0,
            // 250 MHz / 256. SCLK must stay below fCLKIN / 4.
            clock_hz: 976_562,
            mode: Mode::Mode1,
            cs_pin: 22,
            drdy_pin: 17,
            rst_pin: 18,
        }
    }
}

#[derive(Debug)]
pub enum Error {
    Spi(rppal::spi::Error),
    Gpio(rppal::gpio::Error),
    Driver(Ads1256Error<SpiError, GpioError>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Spi(e) => write!(f, "failed to open SPI: {}", e),
            Error::Gpio(e) => write!(f, "failed to claim GPIO: {}", e),
            Error::Driver(e) => write!(f, "ADS1256 did not initialize: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<rppal::spi::Error> for Error {
    fn from(e: rppal::spi::Error) -> Self {
        Error::Spi(e)
    }
}

impl From<rppal::gpio::Error> for Error {
    fn from(e: rppal::gpio::Error) -> Self {
        Error::Gpio(e)
    }
}

impl From<Ads1256Error<SpiError, GpioError>> for Error {
    fn from(e: Ads1256Error<SpiError, GpioError>) -> Self {
        Error::Driver(e)
    }
}

/// Claims the SPI bus and pins described by `bus`, then resets and programs
/// the chip with `config`. Dropping the returned driver (or the parts from
/// [`Ads1256::release`]) frees the bus and pins again.
pub fn open(bus: &BusConfig, config: Config) -> Result<Driver, Error> {
    let spi = Spi::new(bus.spi_bus, bus.slave_select, bus.clock_hz, bus.mode)?;
    let gpio = Gpio::new()?;
    let cs = gpio.get(bus.cs_pin)?.into_output_high();
    let drdy = gpio.get(bus.drdy_pin)?.into_input_pullup();
    let rst = gpio.get(bus.rst_pin)?.into_output_high();
    log::debug!("Opened {:?}", bus);

    let mut adc = Ads1256::new(spi, cs, drdy, rst, Delay::new(), config);
    adc.init()?;
    Ok(adc)
}
