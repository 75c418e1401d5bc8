/// ADS1256 Commands
pub const CMD_WAKEUP: u8 = 0x00;
pub const CMD_RDATA: u8 = 0x01;
pub const CMD_SDATAC: u8 = 0x0F;
pub const CMD_RREG: u8 = 0x10;
pub const CMD_WREG: u8 = 0x50;
pub const CMD_SELFCAL: u8 = 0xF0;
pub const CMD_SELFOCAL: u8 = 0xF1;
pub const CMD_SELFGCAL: u8 = 0xF2;
pub const CMD_SYSOCAL: u8 = 0xF3;
pub const CMD_SYSGCAL: u8 = 0xF4;
pub const CMD_SYNC: u8 = 0xFC;
pub const CMD_STANDBY: u8 = 0xFD;
pub const CMD_RESET: u8 = 0xFE;

/// ADS1256 Registers
pub const REG_STATUS: u8 = 0x00;
pub const REG_MUX: u8 = 0x01;
pub const REG_ADCON: u8 = 0x02;
pub const REG_DRATE: u8 = 0x03;
pub const REG_IO: u8 = 0x04;
pub const REG_OFC0: u8 = 0x05;
pub const REG_OFC1: u8 = 0x06;
pub const REG_OFC2: u8 = 0x07;
pub const REG_FSC0: u8 = 0x08;
pub const REG_FSC1: u8 = 0x09;
pub const REG_FSC2: u8 = 0x0A;

/// Number of addressable registers (`STATUS` through `FSC2`).
pub const REGISTER_COUNT: usize = 11;

/// Filler byte clocked out while only receiving.
pub const FILLER: u8 = 0xFF;

// STATUS bits. The upper nibble is the read-only factory ID, bit 0 mirrors DRDY.
pub const STATUS_ORDER: u8 = 1 << 3;
pub const STATUS_ACAL: u8 = 1 << 2;
pub const STATUS_BUFEN: u8 = 1 << 1;

/// ADCON gain field (PGA2..PGA0).
pub const ADCON_PGA_MASK: u8 = 0x07;

/// MUX value for AINCOM on the negative side.
pub const MUX_AINCOM: u8 = 0x08;

// Timing table for fCLKIN = 7.68 MHz (tau = 130 ns), rounded up to whole microseconds.
/// t6: DIN to DOUT, 50 tau after RREG/RDATA before clocking data out.
pub const DELAY_T6_US: u32 = 7;
/// t11: 24 tau between a register write or SYNC and the next command.
pub const DELAY_T11_US: u32 = 3;
/// t11 after WAKEUP: 4 tau before the conversion result can be read.
pub const DELAY_WAKEUP_US: u32 = 1;

/// Gain settings for the ADS1256 programmable gain amplifier (PGA)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gain {
    Gain1 = 0b000,
    Gain2 = 0b001,
    Gain4 = 0b010,
    Gain8 = 0b011,
    Gain16 = 0b100,
    Gain32 = 0b101,
    Gain64 = 0b110,
}

impl Gain {
    /// Returns the gain value as a floating-point number
    pub fn value(&self) -> f64 {
        match self {
            Gain::Gain1 => 1.0,
            Gain::Gain2 => 2.0,
            Gain::Gain4 => 4.0,
            Gain::Gain8 => 8.0,
            Gain::Gain16 => 16.0,
            Gain::Gain32 => 32.0,
            Gain::Gain64 => 64.0,
        }
    }

    /// Positive full-scale input in volts, `2 * v_ref / gain`.
    ///
    /// With the usual 2.5 V reference this is 5 V at x1 down to 78.125 mV at x64.
    pub fn full_scale_volts(&self, v_ref: f64) -> f64 {
        2.0 * v_ref / self.value()
    }

    /// ADCON PGA code
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for Gain {
    type Error = u8;

    /// Accepts the PGA code (0..=6). `0b111` also means x64 on the chip but is not
    /// a documented setting, so it is rejected.
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0b000 => Gain::Gain1,
            0b001 => Gain::Gain2,
            0b010 => Gain::Gain4,
            0b011 => Gain::Gain8,
            0b100 => Gain::Gain16,
            0b101 => Gain::Gain32,
            0b110 => Gain::Gain64,
            other => return Err(other),
        })
    }
}

/// Data rates for the ADS1256
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataRate {
    Sps30000 = 0xF0,
    Sps15000 = 0xE0,
    Sps7500 = 0xD0,
    Sps3750 = 0xC0,
    Sps2000 = 0xB0,
    Sps1000 = 0xA1,
    Sps500 = 0x92,
    Sps100 = 0x82,
    Sps60 = 0x72,
    Sps50 = 0x63,
    Sps30 = 0x53,
    Sps25 = 0x43,
    Sps15 = 0x33,
    Sps10 = 0x23,
    Sps5 = 0x13,
    Sps2_5 = 0x03,
}

impl DataRate {
    pub const ALL: [DataRate; 16] = [
        DataRate::Sps30000,
        DataRate::Sps15000,
        DataRate::Sps7500,
        DataRate::Sps3750,
        DataRate::Sps2000,
        DataRate::Sps1000,
        DataRate::Sps500,
        DataRate::Sps100,
        DataRate::Sps60,
        DataRate::Sps50,
        DataRate::Sps30,
        DataRate::Sps25,
        DataRate::Sps15,
        DataRate::Sps10,
        DataRate::Sps5,
        DataRate::Sps2_5,
    ];

    /// DRATE register code
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Nominal output rate in samples per second
    pub fn samples_per_second(&self) -> f64 {
        match self {
            DataRate::Sps30000 => 30000.0,
            DataRate::Sps15000 => 15000.0,
            DataRate::Sps7500 => 7500.0,
            DataRate::Sps3750 => 3750.0,
            DataRate::Sps2000 => 2000.0,
            DataRate::Sps1000 => 1000.0,
            DataRate::Sps500 => 500.0,
            DataRate::Sps100 => 100.0,
            DataRate::Sps60 => 60.0,
            DataRate::Sps50 => 50.0,
            DataRate::Sps30 => 30.0,
            DataRate::Sps25 => 25.0,
            DataRate::Sps15 => 15.0,
            DataRate::Sps10 => 10.0,
            DataRate::Sps5 => 5.0,
            DataRate::Sps2_5 => 2.5,
        }
    }
}

impl TryFrom<u8> for DataRate {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        DataRate::ALL
            .iter()
            .copied()
            .find(|rate| rate.code() == code)
            .ok_or(code)
    }
}
