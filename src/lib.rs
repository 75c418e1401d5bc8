//! Register-level driver for the TI ADS1256 24-bit delta-sigma ADC.
//!
//! The driver talks to the chip through `embedded-hal` 1.0: a bare
//! [`embedded_hal::spi::SpiBus`] plus chip-select, DRDY and RESET pins and a
//! [`embedded_hal::delay::DelayNs`]. Every register access and command is one
//! chip-select transaction with the datasheet's t6/t11 gaps built in.
//!
//! With the `rpi` feature, [`rpi::open`] wires the driver to a Raspberry Pi.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod bus;
mod channel;
mod config;
mod constants;
mod conversion;
mod driver;
mod error;
mod scan;

#[cfg(feature = "rpi")]
pub mod rpi;

#[cfg(test)]
mod sim;

pub use channel::{Channel, Input};
pub use config::{Config, LagCompensation};
pub use constants::{DataRate, Gain};
pub use conversion::{code_to_voltage, sign_extend_24, Sample, MAX_CODE, MIN_CODE};
pub use driver::Ads1256;
pub use error::Ads1256Error;
pub use scan::{Scan, MAX_DIFFERENTIAL, MAX_SINGLE_ENDED};

/// Opcodes, register addresses and timing constants
pub mod regs {
    pub use crate::constants::{
        ADCON_PGA_MASK, CMD_RDATA, CMD_RESET, CMD_RREG, CMD_SDATAC, CMD_SELFCAL, CMD_SELFGCAL,
        CMD_SELFOCAL, CMD_STANDBY, CMD_SYNC, CMD_SYSGCAL, CMD_SYSOCAL, CMD_WAKEUP, CMD_WREG,
        DELAY_T11_US, DELAY_T6_US, DELAY_WAKEUP_US, REGISTER_COUNT, REG_ADCON, REG_DRATE,
        REG_FSC0, REG_FSC1, REG_FSC2, REG_IO, REG_MUX, REG_OFC0, REG_OFC1, REG_OFC2, REG_STATUS,
        STATUS_ACAL, STATUS_BUFEN, STATUS_ORDER,
    };
}
