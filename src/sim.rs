//! In-memory ADS1256 used by the unit tests.
//!
//! The fakes below implement the `embedded-hal` traits the driver consumes and
//! share one [`State`]. The model covers the register file, the command
//! parser, CS bracketing, the t6/t11 timing table, a DRDY line that asserts a
//! fixed number of delay calls after a conversion starts, and the one-cycle
//! multiplexer lag: a conversion always uses the MUX value latched at the
//! last WAKEUP. With ACAL set, a write that changes the PGA, the data rate or
//! the buffer starts a calibration and holds DRDY high until it is done.

use std::cell::{RefCell, RefMut};
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::{delay, digital, spi};

use crate::bus::Bus;
use crate::config::Config;
use crate::constants::*;
use crate::Ads1256;

pub const CHIP_ID: u8 = 0x3;
const RESET_REGISTERS: [u8; REGISTER_COUNT] = [
    (CHIP_ID << 4) | 0x01,
    0x01,
    0x20,
    0xF0,
    0xE0,
    0x00,
    0x00,
    0x00,
    0x00,
    0x00,
    0x40,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimError;

impl spi::Error for SimError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

impl digital::Error for SimError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Command,
    ReadCount { addr: u8 },
    ReadData { addr: u8, remaining: u8 },
    WriteCount { addr: u8 },
    WriteData { addr: u8, remaining: u8 },
    ReadConversion { index: usize },
    Ignore,
}

pub struct State {
    pub registers: [u8; REGISTER_COUNT],
    pub selected: bool,
    /// Number of CS assertions
    pub transactions: usize,
    /// Every byte the host clocked out, in order
    pub mosi: Vec<u8>,
    /// Command opcodes in order, register commands with the address masked off
    pub commands: Vec<u8>,
    /// Values written per register write transaction, `(address, bytes)`
    pub writes: Vec<(u8, Vec<u8>)>,
    /// `delay_calls` at the moment each RDATA opcode arrived
    pub rdata_at_delay: Vec<usize>,
    pub delay_calls: usize,
    pub elapsed_us: u64,
    pub drdy_polls: usize,
    pub timing_violations: usize,
    /// WREG opcodes that arrived while an auto-calibration was running
    pub writes_during_calibration: usize,
    pub unselected_transfers: usize,
    pub fail_spi: bool,
    /// Delay calls a conversion takes
    pub conversion_delays: usize,
    /// Code each input presents, indexed by MUX nibble
    pub input_codes: [i32; 9],
    phase: Phase,
    drdy: bool,
    countdown: Option<usize>,
    converting_mux: u8,
    output: i32,
    synced_at: Option<u64>,
    /// Time and minimum gap before the next opcode is accepted
    settling: Option<(u64, u32)>,
    write_done: bool,
    calibrating: bool,
    data_phase_at: Option<u64>,
    pending_write: Vec<u8>,
    rst_low: bool,
}

impl State {
    fn new() -> Self {
        Self {
            registers: RESET_REGISTERS,
            selected: false,
            transactions: 0,
            mosi: Vec::new(),
            commands: Vec::new(),
            writes: Vec::new(),
            rdata_at_delay: Vec::new(),
            delay_calls: 0,
            elapsed_us: 0,
            drdy_polls: 0,
            timing_violations: 0,
            writes_during_calibration: 0,
            unselected_transfers: 0,
            fail_spi: false,
            conversion_delays: 16,
            // AINx presents (x - 3) * 100_000, AINCOM sits at 0.
            input_codes: [
                -300_000, -200_000, -100_000, 0, 100_000, 200_000, 300_000, 400_000, 0,
            ],
            phase: Phase::Command,
            drdy: true,
            countdown: None,
            converting_mux: RESET_REGISTERS[REG_MUX as usize],
            output: 0,
            synced_at: None,
            settling: None,
            write_done: false,
            calibrating: false,
            data_phase_at: None,
            pending_write: Vec::new(),
            rst_low: false,
        }
    }

    /// Code a conversion with `mux` selected produces
    pub fn code_for(&self, mux: u8) -> i32 {
        let positive = self.input_codes[(mux >> 4) as usize & 0x0F];
        let negative = self.input_codes[(mux & 0x0F) as usize];
        (positive - negative).clamp(-0x80_0000, 0x7F_FFFF)
    }

    /// Holds DRDY high for `delays` delay calls, then completes a conversion.
    pub fn busy_for(&mut self, delays: usize) {
        self.drdy = false;
        self.countdown = Some(delays);
        if delays == 0 {
            self.finish_conversion();
        }
    }

    /// Holds DRDY high forever.
    pub fn stall(&mut self) {
        self.drdy = false;
        self.countdown = None;
    }

    /// Places a raw 24-bit result in the output register.
    pub fn set_output(&mut self, code: i32) {
        self.output = code;
    }

    pub fn commands_without_register_access(&self) -> Vec<u8> {
        self.commands
            .iter()
            .copied()
            .filter(|&c| c != CMD_RREG && c != CMD_WREG)
            .collect()
    }

    fn start_conversion(&mut self) {
        let delays = self.conversion_delays;
        self.busy_for(delays);
    }

    fn finish_conversion(&mut self) {
        self.output = self.code_for(self.converting_mux);
        self.drdy = true;
        self.countdown = None;
        self.calibrating = false;
    }

    fn tick(&mut self, us: u64) {
        self.delay_calls += 1;
        self.elapsed_us += us;
        if let Some(remaining) = self.countdown {
            if remaining <= 1 {
                self.finish_conversion();
            } else {
                self.countdown = Some(remaining - 1);
            }
        }
    }

    fn reset_registers(&mut self) {
        self.registers = RESET_REGISTERS;
        self.converting_mux = RESET_REGISTERS[REG_MUX as usize];
        self.phase = Phase::Command;
        self.calibrating = false;
        self.start_conversion();
    }

    fn check_settled(&mut self) {
        if let Some((at, gap)) = self.settling.take() {
            if self.elapsed_us - at < gap as u64 {
                self.timing_violations += 1;
            }
        }
    }

    fn check_t6(&mut self) {
        if let Some(start) = self.data_phase_at.take() {
            if self.elapsed_us - start < DELAY_T6_US as u64 {
                self.timing_violations += 1;
            }
        }
    }

    fn exchange(&mut self, out: u8) -> Result<u8, SimError> {
        if self.fail_spi {
            return Err(SimError);
        }
        if !self.selected {
            self.unselected_transfers += 1;
        }
        self.mosi.push(out);

        let (next, reply) = match self.phase {
            Phase::Command => (self.command(out), 0),
            Phase::ReadCount { addr } => {
                self.data_phase_at = Some(self.elapsed_us);
                (
                    Phase::ReadData {
                        addr,
                        remaining: (out & 0x0F) + 1,
                    },
                    0,
                )
            }
            Phase::ReadData { addr, remaining } => {
                self.check_t6();
                let value = self.registers.get(addr as usize).copied().unwrap_or(0);
                let next = if remaining > 1 {
                    Phase::ReadData {
                        addr: addr + 1,
                        remaining: remaining - 1,
                    }
                } else {
                    Phase::Ignore
                };
                (next, value)
            }
            Phase::WriteCount { addr } => (
                Phase::WriteData {
                    addr,
                    remaining: (out & 0x0F) + 1,
                },
                0,
            ),
            Phase::WriteData { addr, remaining } => {
                self.store(addr, out);
                self.pending_write.push(out);
                if remaining > 1 {
                    (
                        Phase::WriteData {
                            addr: addr + 1,
                            remaining: remaining - 1,
                        },
                        0,
                    )
                } else {
                    let start = addr + 1 - self.pending_write.len() as u8;
                    let bytes = std::mem::take(&mut self.pending_write);
                    self.writes.push((start, bytes));
                    self.write_done = true;
                    (Phase::Ignore, 0)
                }
            }
            Phase::ReadConversion { index } => {
                if index == 0 {
                    self.check_t6();
                }
                let raw = (self.output as u32) & 0x00FF_FFFF;
                let byte = (raw >> (16 - 8 * index)) as u8;
                if index == 2 {
                    // DRDY returns high after the last bit; free-running mode
                    // then produces the next result.
                    self.start_conversion();
                    (Phase::Ignore, byte)
                } else {
                    (Phase::ReadConversion { index: index + 1 }, byte)
                }
            }
            Phase::Ignore => (Phase::Ignore, 0),
        };
        self.phase = next;
        Ok(reply)
    }

    fn store(&mut self, addr: u8, value: u8) {
        let Some(slot) = self.registers.get_mut(addr as usize) else {
            return;
        };
        let before = *slot;
        *slot = if addr == REG_STATUS {
            // ID nibble and DRDY mirror are read only.
            (*slot & 0xF1) | (value & 0x0E)
        } else {
            value
        };
        let after = *slot;

        let recalibrates = match addr {
            REG_ADCON => (before ^ after) & ADCON_PGA_MASK != 0,
            REG_DRATE => before != after,
            REG_STATUS => (before ^ after) & STATUS_BUFEN != 0,
            _ => false,
        };
        if recalibrates && self.registers[REG_STATUS as usize] & STATUS_ACAL != 0 {
            self.start_conversion();
            self.calibrating = true;
        }
    }

    fn command(&mut self, opcode: u8) -> Phase {
        self.check_settled();
        match opcode {
            0x10..=0x1F => {
                self.commands.push(CMD_RREG);
                Phase::ReadCount {
                    addr: opcode & 0x0F,
                }
            }
            0x50..=0x5F => {
                self.commands.push(CMD_WREG);
                if self.calibrating {
                    self.writes_during_calibration += 1;
                }
                Phase::WriteCount {
                    addr: opcode & 0x0F,
                }
            }
            CMD_RDATA => {
                self.commands.push(opcode);
                self.rdata_at_delay.push(self.delay_calls);
                self.data_phase_at = Some(self.elapsed_us);
                Phase::ReadConversion { index: 0 }
            }
            CMD_SYNC => {
                self.commands.push(opcode);
                self.synced_at = Some(self.elapsed_us);
                self.stall();
                Phase::Ignore
            }
            CMD_WAKEUP | 0xFF => {
                self.commands.push(CMD_WAKEUP);
                if let Some(at) = self.synced_at.take() {
                    if self.elapsed_us - at < DELAY_T11_US as u64 {
                        self.timing_violations += 1;
                    }
                }
                self.converting_mux = self.registers[REG_MUX as usize];
                self.start_conversion();
                self.settling = Some((self.elapsed_us, DELAY_WAKEUP_US));
                Phase::Ignore
            }
            CMD_RESET => {
                self.commands.push(opcode);
                self.reset_registers();
                Phase::Ignore
            }
            CMD_SELFCAL | CMD_SELFOCAL | CMD_SELFGCAL | CMD_SYSOCAL | CMD_SYSGCAL => {
                self.commands.push(opcode);
                self.start_conversion();
                Phase::Ignore
            }
            _ => {
                self.commands.push(opcode);
                Phase::Ignore
            }
        }
    }
}

/// Handle onto one simulated chip
#[derive(Clone)]
pub struct Chip(Rc<RefCell<State>>);

impl Chip {
    pub fn new() -> Self {
        Chip(Rc::new(RefCell::new(State::new())))
    }

    pub fn state(&self) -> RefMut<'_, State> {
        self.0.borrow_mut()
    }

    pub fn bus(&self) -> Bus<SimSpi, SimCs, SimDrdy, SimRst, SimDelay> {
        Bus {
            spi: SimSpi(self.clone()),
            cs: SimCs(self.clone()),
            drdy: SimDrdy(self.clone()),
            rst: SimRst(self.clone()),
            delay: SimDelay(self.clone()),
        }
    }

    pub fn driver(&self, config: Config) -> SimAds1256 {
        Ads1256::new(
            SimSpi(self.clone()),
            SimCs(self.clone()),
            SimDrdy(self.clone()),
            SimRst(self.clone()),
            SimDelay(self.clone()),
            config,
        )
    }
}

pub type SimAds1256 = Ads1256<SimSpi, SimCs, SimDrdy, SimRst, SimDelay>;

pub struct SimSpi(Chip);
pub struct SimCs(Chip);
pub struct SimDrdy(Chip);
pub struct SimRst(Chip);
pub struct SimDelay(Chip);

impl spi::ErrorType for SimSpi {
    type Error = SimError;
}

impl spi::SpiBus<u8> for SimSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), SimError> {
        let mut state = self.0.state();
        for word in words.iter_mut() {
            *word = state.exchange(FILLER)?;
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), SimError> {
        let mut state = self.0.state();
        for &word in words {
            state.exchange(word)?;
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), SimError> {
        let mut state = self.0.state();
        for i in 0..read.len().max(write.len()) {
            let reply = state.exchange(write.get(i).copied().unwrap_or(FILLER))?;
            if let Some(slot) = read.get_mut(i) {
                *slot = reply;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), SimError> {
        let mut state = self.0.state();
        for word in words.iter_mut() {
            *word = state.exchange(*word)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SimError> {
        Ok(())
    }
}

impl digital::ErrorType for SimCs {
    type Error = SimError;
}

impl digital::OutputPin for SimCs {
    fn set_low(&mut self) -> Result<(), SimError> {
        let mut state = self.0.state();
        if !state.selected {
            state.transactions += 1;
        }
        state.selected = true;
        state.phase = Phase::Command;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), SimError> {
        let mut state = self.0.state();
        state.selected = false;
        state.phase = Phase::Command;
        state.data_phase_at = None;
        state.pending_write.clear();
        if std::mem::take(&mut state.write_done) {
            // Register writes need t11 before the next opcode.
            state.settling = Some((state.elapsed_us, DELAY_T11_US));
        }
        Ok(())
    }
}

impl digital::ErrorType for SimDrdy {
    type Error = SimError;
}

impl digital::InputPin for SimDrdy {
    fn is_high(&mut self) -> Result<bool, SimError> {
        digital::InputPin::is_low(self).map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, SimError> {
        let mut state = self.0.state();
        state.drdy_polls += 1;
        Ok(state.drdy)
    }
}

impl digital::ErrorType for SimRst {
    type Error = SimError;
}

impl digital::OutputPin for SimRst {
    fn set_low(&mut self) -> Result<(), SimError> {
        let mut state = self.0.state();
        state.rst_low = true;
        state.stall();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), SimError> {
        let mut state = self.0.state();
        if state.rst_low {
            state.rst_low = false;
            state.reset_registers();
        }
        Ok(())
    }
}

impl delay::DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.state().tick((ns as u64 + 999) / 1000);
    }

    fn delay_us(&mut self, us: u32) {
        self.0.state().tick(us as u64);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.state().tick(ms as u64 * 1000);
    }
}
