//! Byte-level access to the chip: chip-select bracketing, single-byte
//! exchanges, the DRDY line and microsecond delays.

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiBus,
};

use crate::constants::FILLER;
use crate::error::Ads1256Error;

pub struct Bus<SPI, CS, DRDY, RST, DELAY> {
    pub(crate) spi: SPI,
    pub(crate) cs: CS,
    pub(crate) drdy: DRDY,
    pub(crate) rst: RST,
    pub(crate) delay: DELAY,
}

impl<SPI, CS, DRDY, RST, DELAY, SpiError, GpioError> Bus<SPI, CS, DRDY, RST, DELAY>
where
    SPI: SpiBus<u8, Error = SpiError>,
    CS: OutputPin<Error = GpioError>,
    DRDY: InputPin<Error = GpioError>,
    RST: OutputPin<Error = GpioError>,
    DELAY: DelayNs,
{
    /// Asserts CS (active low)
    pub fn select(&mut self) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.cs.set_low().map_err(Ads1256Error::Gpio)
    }

    /// Waits for the bus to drain, then releases CS
    pub fn deselect(&mut self) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        let flushed = self.spi.flush().map_err(Ads1256Error::Spi);
        self.cs.set_high().map_err(Ads1256Error::Gpio)?;
        flushed
    }

    /// Runs `body` with the chip selected. CS is released even when `body` fails.
    pub fn transaction<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, Ads1256Error<SpiError, GpioError>>,
    ) -> Result<T, Ads1256Error<SpiError, GpioError>> {
        self.select()?;
        let result = body(self);
        let released = self.deselect();
        let value = result?;
        released?;
        Ok(value)
    }

    /// Full-duplex exchange of one byte
    pub fn transfer_byte(&mut self, out: u8) -> Result<u8, Ads1256Error<SpiError, GpioError>> {
        let mut word = [out];
        self.spi
            .transfer_in_place(&mut word)
            .map_err(Ads1256Error::Spi)?;
        log::trace!("SPI 0x{:02X} -> 0x{:02X}", out, word[0]);
        Ok(word[0])
    }

    pub fn send_byte(&mut self, byte: u8) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.transfer_byte(byte).map(|_| ())
    }

    pub fn receive_byte(&mut self) -> Result<u8, Ads1256Error<SpiError, GpioError>> {
        self.transfer_byte(FILLER)
    }

    /// DRDY is active low
    pub fn data_ready(&mut self) -> Result<bool, Ads1256Error<SpiError, GpioError>> {
        self.drdy.is_low().map_err(Ads1256Error::Gpio)
    }

    pub fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    /// Polls DRDY every `poll_us` until it goes low.
    ///
    /// With `timeout_us` set the wait gives up once the accumulated poll delay
    /// reaches it. `None` waits forever.
    pub fn wait_for_drdy(
        &mut self,
        timeout_us: Option<u32>,
        poll_us: u32,
    ) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        let step = poll_us.max(1);
        let mut waited: u32 = 0;
        loop {
            if self.data_ready()? {
                return Ok(());
            }
            if let Some(limit) = timeout_us {
                if waited >= limit {
                    log::error!("DRDY pin did not go low within {} us", limit);
                    return Err(Ads1256Error::Timeout);
                }
            }
            self.delay.delay_us(step);
            waited = waited.saturating_add(step);
        }
    }
}
