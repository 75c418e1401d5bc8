use crate::bus::Bus;
use crate::channel::{Channel, Input};
use crate::config::Config;
use crate::constants::*;
use crate::constants::{DataRate, Gain};
use crate::conversion::sign_extend_24;
use crate::error::Ads1256Error;

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiBus,
};

const REGISTER_NAMES: [&str; REGISTER_COUNT] = [
    "STATUS", "MUX", "ADCON", "DRATE", "IO", "OFC0", "OFC1", "OFC2", "FSC0", "FSC1", "FSC2",
];

/// ADS1256 driver
///
/// Owns the SPI bus, the chip-select, DRDY and RESET lines and a delay source.
/// CS is driven by the driver, so `SPI` must be a bare bus and not a device
/// that manages its own chip-select.
pub struct Ads1256<SPI, CS, DRDY, RST, DELAY> {
    pub(crate) bus: Bus<SPI, CS, DRDY, RST, DELAY>,
    pub(crate) config: Config,
}

impl<SPI, CS, DRDY, RST, DELAY, SpiError, GpioError> Ads1256<SPI, CS, DRDY, RST, DELAY>
where
    SPI: SpiBus<u8, Error = SpiError>,
    CS: OutputPin<Error = GpioError>,
    DRDY: InputPin<Error = GpioError>,
    RST: OutputPin<Error = GpioError>,
    DELAY: DelayNs,
{
    /// Creates a new ADS1256 driver instance. Nothing is sent until [`Ads1256::init`].
    pub fn new(spi: SPI, cs: CS, drdy: DRDY, rst: RST, delay: DELAY, config: Config) -> Self {
        Ads1256 {
            bus: Bus {
                spi,
                cs,
                drdy,
                rst,
                delay,
            },
            config,
        }
    }

    /// Gives back the bus, pins and delay.
    pub fn release(self) -> (SPI, CS, DRDY, RST, DELAY) {
        let Bus {
            spi,
            cs,
            drdy,
            rst,
            delay,
        } = self.bus;
        (spi, cs, drdy, rst, delay)
    }

    /// Configuration currently programmed into the chip
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gain(&self) -> Gain {
        self.config.gain
    }

    pub fn data_rate(&self) -> DataRate {
        self.config.data_rate
    }

    /// Resets the chip through the RESET line and programs the configuration.
    ///
    /// Leaves AIN0/AINCOM selected and the chip self-calibrated.
    pub fn init(&mut self) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.bus.deselect()?;
        self.hardware_reset()?;

        // A chip left in RDATAC mode ignores everything except SDATAC.
        self.stop_continuous_read()?;

        self.apply_config()?;
        self.set_single_ended_channel(Input::Ain0)?;
        self.self_calibrate()?;

        log::debug!("ADS1256 ready: {:?}", self.config);
        Ok(())
    }

    /// Pulses the RESET line and waits for the chip to come back.
    pub fn hardware_reset(&mut self) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.bus.rst.set_low().map_err(Ads1256Error::Gpio)?;
        self.bus.delay_us(10);
        self.bus.rst.set_high().map_err(Ads1256Error::Gpio)?;
        self.wait_for_drdy()
    }

    /// Sends RESET, then restores the driver's configuration on the chip.
    pub fn reset(&mut self) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.send_command(CMD_RESET)?;
        self.wait_for_drdy()?;
        self.apply_config()
    }

    fn apply_config(&mut self) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        let Config {
            gain,
            data_rate,
            buffer_enabled,
            ..
        } = self.config;
        // ACAL is on from here, so each change starts a calibration that has to
        // finish before the next write.
        self.set_input_buffer(buffer_enabled)?;
        self.wait_for_drdy()?;
        self.set_gain(gain)?;
        self.wait_for_drdy()?;
        self.set_data_rate(data_rate)?;
        self.wait_for_drdy()
    }

    /// Reads every register in one RREG transaction and logs it.
    pub fn dump_registers(
        &mut self,
    ) -> Result<[u8; REGISTER_COUNT], Ads1256Error<SpiError, GpioError>> {
        let mut registers = [0u8; REGISTER_COUNT];
        self.read_registers(REG_STATUS, &mut registers)?;
        for (name, value) in REGISTER_NAMES.iter().zip(registers.iter()) {
            log::debug!("Register {}: 0x{:02X}", name, value);
        }
        Ok(registers)
    }

    /// Sends a stand-alone command, then waits whatever the chip needs before
    /// it accepts the next one.
    pub fn send_command(&mut self, command: u8) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        log::trace!("Sending command: 0x{:02X}", command);
        self.bus.transaction(|bus| bus.send_byte(command))?;
        match command {
            CMD_SYNC => self.bus.delay_us(DELAY_T11_US),
            CMD_WAKEUP => self.bus.delay_us(DELAY_WAKEUP_US),
            _ => {}
        }
        Ok(())
    }

    pub fn read_register(&mut self, reg: u8) -> Result<u8, Ads1256Error<SpiError, GpioError>> {
        let mut buffer = [0u8; 1];
        self.read_registers(reg, &mut buffer)?;
        Ok(buffer[0])
    }

    pub fn write_register(
        &mut self,
        reg: u8,
        value: u8,
    ) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.write_registers(reg, &[value])
    }

    /// Reads `buffer.len()` consecutive registers starting at `reg`
    pub fn read_registers(
        &mut self,
        reg: u8,
        buffer: &mut [u8],
    ) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        check_register_span(reg, buffer.len())?;
        let command = CMD_RREG | reg;
        let count = (buffer.len() - 1) as u8;

        self.bus.transaction(|bus| {
            bus.send_byte(command)?;
            bus.send_byte(count)?;
            bus.delay_us(DELAY_T6_US);
            for byte in buffer.iter_mut() {
                *byte = bus.receive_byte()?;
            }
            Ok(())
        })?;
        log::debug!("Read 0x{:02X}: {:02X?}", reg, buffer);
        Ok(())
    }

    /// Writes `data` to consecutive registers starting at `reg`. There is no
    /// read-back; the chip is given t11 before the next command.
    pub fn write_registers(
        &mut self,
        reg: u8,
        data: &[u8],
    ) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        check_register_span(reg, data.len())?;
        let command = CMD_WREG | reg;
        let count = (data.len() - 1) as u8;

        log::debug!("Write 0x{:02X}: {:02X?}", reg, data);
        self.bus.transaction(|bus| {
            bus.send_byte(command)?;
            bus.send_byte(count)?;
            for &byte in data {
                bus.send_byte(byte)?;
            }
            Ok(())
        })?;
        self.bus.delay_us(DELAY_T11_US);
        Ok(())
    }

    /// Blocks until DRDY goes low, giving up after `timeout_us` (`None`: never).
    pub fn wait_for_data_ready(
        &mut self,
        timeout_us: Option<u32>,
    ) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        let poll_us = self.config.drdy_poll_us;
        self.bus.wait_for_drdy(timeout_us, poll_us)
    }

    pub(crate) fn wait_for_drdy(&mut self) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.wait_for_data_ready(self.config.drdy_timeout_us)
    }

    /// Factory ID from the top nibble of STATUS. Only useful as a link check.
    pub fn read_chip_identifier(&mut self) -> Result<u8, Ads1256Error<SpiError, GpioError>> {
        self.wait_for_drdy()?;
        let status = self.read_register(REG_STATUS)?;
        Ok(status >> 4)
    }
}

// Chip configuration
impl<SPI, CS, DRDY, RST, DELAY, SpiError, GpioError> Ads1256<SPI, CS, DRDY, RST, DELAY>
where
    SPI: SpiBus<u8, Error = SpiError>,
    CS: OutputPin<Error = GpioError>,
    DRDY: InputPin<Error = GpioError>,
    RST: OutputPin<Error = GpioError>,
    DELAY: DelayNs,
{
    /// Sets the gain for the ADC. Clock output and sensor detect are switched off.
    pub fn set_gain(&mut self, gain: Gain) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.write_register(REG_ADCON, gain.code())?;
        self.config.gain = gain;
        Ok(())
    }

    /// Same as [`Ads1256::set_gain`] from a raw PGA code, rejected before any bus traffic
    pub fn set_gain_code(&mut self, code: u8) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        let gain = Gain::try_from(code).map_err(Ads1256Error::InvalidGain)?;
        self.set_gain(gain)
    }

    /// Sets the data rate for the ADC
    pub fn set_data_rate(
        &mut self,
        data_rate: DataRate,
    ) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.write_register(REG_DRATE, data_rate.code())?;
        self.config.data_rate = data_rate;
        Ok(())
    }

    pub fn set_data_rate_code(
        &mut self,
        code: u8,
    ) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        let data_rate = DataRate::try_from(code).map_err(Ads1256Error::InvalidDataRate)?;
        self.set_data_rate(data_rate)
    }

    /// Switches the analog input buffer.
    ///
    /// STATUS is written whole: ORDER is forced to MSB first and ACAL to on,
    /// whatever they held before.
    pub fn set_input_buffer(
        &mut self,
        enabled: bool,
    ) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        let mut status = STATUS_ACAL;
        if enabled {
            status |= STATUS_BUFEN;
        }
        self.write_register(REG_STATUS, status)?;
        self.config.buffer_enabled = enabled;
        Ok(())
    }

    /// Selects `channel` against AINCOM
    pub fn set_single_ended_channel(
        &mut self,
        channel: Input,
    ) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.set_channel(Channel::SingleEnded(channel))
    }

    pub fn set_differential_channel(
        &mut self,
        positive: Input,
        negative: Input,
    ) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.set_channel(Channel::Differential { positive, negative })
    }

    /// Differential selection from raw multiplexer codes (0..=7, 8 for AINCOM)
    pub fn set_input_codes(
        &mut self,
        positive: u8,
        negative: u8,
    ) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        let positive = Input::try_from(positive).map_err(Ads1256Error::InvalidInputChannel)?;
        let negative = Input::try_from(negative).map_err(Ads1256Error::InvalidInputChannel)?;
        self.set_differential_channel(positive, negative)
    }

    /// Writes the MUX register. The selection only takes effect for the
    /// conversion started by the next SYNC/WAKEUP.
    pub fn set_channel(
        &mut self,
        channel: Channel,
    ) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        log::trace!("Setting MUX register to: 0x{:02X} ({})", channel.mux(), channel);
        self.write_register(REG_MUX, channel.mux())
    }
}

// Implement calibration options
impl<SPI, CS, DRDY, RST, DELAY, SpiError, GpioError> Ads1256<SPI, CS, DRDY, RST, DELAY>
where
    SPI: SpiBus<u8, Error = SpiError>,
    CS: OutputPin<Error = GpioError>,
    DRDY: InputPin<Error = GpioError>,
    RST: OutputPin<Error = GpioError>,
    DELAY: DelayNs,
{
    /// Perform a full self-calibration (both offset and gain)
    pub fn self_calibrate(&mut self) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.calibrate(CMD_SELFCAL)
    }

    pub fn self_offset_calibrate(&mut self) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.calibrate(CMD_SELFOCAL)
    }

    pub fn self_gain_calibrate(&mut self) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.calibrate(CMD_SELFGCAL)
    }

    /// System offset calibration. The selected channel must see zero differential input.
    pub fn system_offset_calibrate(&mut self) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.calibrate(CMD_SYSOCAL)
    }

    /// System gain calibration. The selected channel must see positive full scale,
    /// `2 * VREF / PGA`.
    pub fn system_gain_calibrate(&mut self) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.calibrate(CMD_SYSGCAL)
    }

    fn calibrate(&mut self, command: u8) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.send_command(command)?;
        self.wait_for_drdy()
    }

    /// Offset calibration (OFC2:OFC0), signed 24-bit
    pub fn read_offset_calibration(&mut self) -> Result<i32, Ads1256Error<SpiError, GpioError>> {
        let mut buffer = [0u8; 3];
        self.read_registers(REG_OFC0, &mut buffer)?;
        Ok(sign_extend_24(u32::from_le_bytes([
            buffer[0], buffer[1], buffer[2], 0,
        ])))
    }

    /// Full-scale calibration (FSC2:FSC0), unsigned 24-bit
    pub fn read_fullscale_calibration(&mut self) -> Result<u32, Ads1256Error<SpiError, GpioError>> {
        let mut buffer = [0u8; 3];
        self.read_registers(REG_FSC0, &mut buffer)?;
        Ok(u32::from_le_bytes([buffer[0], buffer[1], buffer[2], 0]))
    }

    /// Only the low 24 bits of `value` are written.
    pub fn write_offset_calibration(
        &mut self,
        value: i32,
    ) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        let bytes = value.to_le_bytes();
        self.write_registers(REG_OFC0, &bytes[..3])
    }

    /// Only the low 24 bits of `value` are written.
    pub fn write_fullscale_calibration(
        &mut self,
        value: u32,
    ) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        let bytes = value.to_le_bytes();
        self.write_registers(REG_FSC0, &bytes[..3])
    }
}

// Power and data modes
impl<SPI, CS, DRDY, RST, DELAY, SpiError, GpioError> Ads1256<SPI, CS, DRDY, RST, DELAY>
where
    SPI: SpiBus<u8, Error = SpiError>,
    CS: OutputPin<Error = GpioError>,
    DRDY: InputPin<Error = GpioError>,
    RST: OutputPin<Error = GpioError>,
    DELAY: DelayNs,
{
    /// Enters standby. Only WAKEUP brings the chip back.
    pub fn standby(&mut self) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.send_command(CMD_STANDBY)
    }

    /// Leaves standby, or completes a pending SYNC.
    pub fn wake_up(&mut self) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.send_command(CMD_WAKEUP)
    }

    pub fn stop_continuous_read(&mut self) -> Result<(), Ads1256Error<SpiError, GpioError>> {
        self.send_command(CMD_SDATAC)
    }
}

fn check_register_span<SpiError, GpioError>(
    reg: u8,
    len: usize,
) -> Result<(), Ads1256Error<SpiError, GpioError>> {
    if len == 0 || reg as usize + len > REGISTER_COUNT {
        return Err(Ads1256Error::InvalidRegister { reg, len });
    }
    Ok(())
}
