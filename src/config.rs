use crate::constants::{DataRate, Gain};

/// How a scan deals with the chip returning the previous conversion after a
/// multiplexer change.
///
/// After MUX/SYNC/WAKEUP, RDATA returns the result converted with the *old*
/// multiplexer setting. The new setting only shows up in the next read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LagCompensation {
    /// One sequence per channel. Sample `i` is labelled with channel `i` but
    /// carries the conversion of whatever was selected before it.
    None,
    /// `n + 1` sequences for `n` channels. The first read is dropped and read
    /// `k + 1` is reported for channel `k`.
    Pipelined,
}

/// Driver configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    pub gain: Gain,
    pub data_rate: DataRate,
    pub buffer_enabled: bool,
    /// Upper bound for a DRDY wait. `None` waits forever.
    pub drdy_timeout_us: Option<u32>,
    /// Delay between two DRDY polls.
    pub drdy_poll_us: u32,
    pub lag_compensation: LagCompensation,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gain: Gain::Gain1,
            data_rate: DataRate::Sps30000,
            buffer_enabled: false,
            // Self-calibration at 2.5 SPS takes about 1.2 s.
            drdy_timeout_us: Some(2_000_000),
            drdy_poll_us: 1,
            lag_compensation: LagCompensation::Pipelined,
        }
    }
}

impl Config {
    pub fn gain(mut self, gain: Gain) -> Self {
        self.gain = gain;
        self
    }

    pub fn data_rate(mut self, data_rate: DataRate) -> Self {
        self.data_rate = data_rate;
        self
    }

    pub fn buffer_enabled(mut self, enabled: bool) -> Self {
        self.buffer_enabled = enabled;
        self
    }

    pub fn drdy_timeout_us(mut self, timeout_us: Option<u32>) -> Self {
        self.drdy_timeout_us = timeout_us;
        self
    }

    pub fn drdy_poll_us(mut self, poll_us: u32) -> Self {
        self.drdy_poll_us = poll_us;
        self
    }

    pub fn lag_compensation(mut self, lag_compensation: LagCompensation) -> Self {
        self.lag_compensation = lag_compensation;
        self
    }
}
