//! One conversion: MUX -> SYNC -> WAKEUP -> RDATA.
//!
//! RDATA right after WAKEUP returns the result that was sitting in the output
//! register, i.e. the conversion of the *previous* multiplexer setting. The new
//! setting is converted next and becomes readable once DRDY goes low again.

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiBus,
};

use crate::channel::Channel;
use crate::constants::*;
use crate::driver::Ads1256;
use crate::error::Ads1256Error;

/// Largest positive code, 0x7FFFFF
pub const MAX_CODE: i32 = 0x7F_FFFF;
/// Most negative code, 0x800000 sign-extended
pub const MIN_CODE: i32 = -0x80_0000;

/// Sign-extends a 24-bit two's complement value. Bits above 23 are ignored.
pub fn sign_extend_24(raw: u32) -> i32 {
    let raw = raw & 0x00FF_FFFF;
    if raw & 0x80_0000 != 0 {
        (raw | 0xFF00_0000) as i32
    } else {
        raw as i32
    }
}

/// Converts a raw code to volts at the input pins.
pub fn code_to_voltage(code: i32, gain: Gain, v_ref: f64) -> f64 {
    code as f64 * gain.full_scale_volts(v_ref) / MAX_CODE as f64
}

/// One conversion result and the multiplexer selection it is reported for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    pub channel: Channel,
    pub code: i32,
}

impl Sample {
    pub fn volts(&self, gain: Gain, v_ref: f64) -> f64 {
        code_to_voltage(self.code, gain, v_ref)
    }
}

impl<SPI, CS, DRDY, RST, DELAY, SpiError, GpioError> Ads1256<SPI, CS, DRDY, RST, DELAY>
where
    SPI: SpiBus<u8, Error = SpiError>,
    CS: OutputPin<Error = GpioError>,
    DRDY: InputPin<Error = GpioError>,
    RST: OutputPin<Error = GpioError>,
    DELAY: DelayNs,
{
    /// Waits for DRDY, then reads the output register without touching the multiplexer.
    pub fn read_data(&mut self) -> Result<i32, Ads1256Error<SpiError, GpioError>> {
        self.wait_for_drdy()?;
        self.read_conversion()
    }

    /// Issues RDATA and clocks in the 24-bit result, MSB first.
    pub(crate) fn read_conversion(&mut self) -> Result<i32, Ads1256Error<SpiError, GpioError>> {
        let buffer = self.bus.transaction(|bus| {
            bus.send_byte(CMD_RDATA)?;
            bus.delay_us(DELAY_T6_US);
            let mut buffer = [0u8; 3];
            for byte in buffer.iter_mut() {
                *byte = bus.receive_byte()?;
            }
            Ok(buffer)
        })?;

        log::trace!(
            "Raw data: {:02X} {:02X} {:02X}",
            buffer[0],
            buffer[1],
            buffer[2]
        );
        Ok(sign_extend_24(u32::from_be_bytes([
            0, buffer[0], buffer[1], buffer[2],
        ])))
    }

    /// Selects `channel`, restarts conversion and reads the output register.
    ///
    /// The returned code belongs to the selection that was active *before* this
    /// call. DRDY must already be low.
    pub(crate) fn cycle(
        &mut self,
        channel: Channel,
    ) -> Result<i32, Ads1256Error<SpiError, GpioError>> {
        self.set_channel(channel)?;
        self.send_command(CMD_SYNC)?;
        self.send_command(CMD_WAKEUP)?;
        self.read_conversion()
    }

    /// Waits for DRDY and runs one channel-set/SYNC/WAKEUP/RDATA sequence.
    ///
    /// The sample is labelled with `channel` but carries the previous
    /// selection's conversion. Use [`Ads1256::read_channel`] for a value that
    /// really belongs to `channel`.
    pub fn read_sample(
        &mut self,
        channel: Channel,
    ) -> Result<Sample, Ads1256Error<SpiError, GpioError>> {
        self.wait_for_drdy()?;
        let code = self.cycle(channel)?;
        log::debug!("{}: {}", channel, code);
        Ok(Sample { channel, code })
    }

    /// Selects `channel`, drops the stale result and returns the first
    /// conversion made with the new selection.
    pub fn read_channel(
        &mut self,
        channel: Channel,
    ) -> Result<Sample, Ads1256Error<SpiError, GpioError>> {
        self.wait_for_drdy()?;
        let stale = self.cycle(channel)?;
        log::trace!("Discarding {} read while switching to {}", stale, channel);
        let code = self.read_data()?;
        log::debug!("{}: {}", channel, code);
        Ok(Sample { channel, code })
    }

    /// [`Ads1256::read_channel`] scaled to volts with the current gain
    pub fn read_voltage(
        &mut self,
        channel: Channel,
        v_ref: f64,
    ) -> Result<f64, Ads1256Error<SpiError, GpioError>> {
        let sample = self.read_channel(channel)?;
        Ok(sample.volts(self.config.gain, v_ref))
    }
}
