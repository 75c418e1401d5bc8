//! Multi-channel scans built on the conversion sequence.
//!
//! The chip has a single converter, so channels are sampled one after the
//! other in the order given. How the one-cycle multiplexer lag is handled is
//! chosen by [`LagCompensation`] in the driver's [`crate::Config`].

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiBus,
};
use heapless::Vec;

use crate::channel::{Channel, Input};
use crate::config::LagCompensation;
use crate::constants::{DataRate, Gain};
use crate::conversion::Sample;
use crate::driver::Ads1256;
use crate::error::Ads1256Error;

/// Most inputs a single-ended scan accepts
pub const MAX_SINGLE_ENDED: usize = 8;
/// Most pairs a differential scan accepts
pub const MAX_DIFFERENTIAL: usize = 4;

/// Result of one pass over a channel list
#[derive(Clone, Debug, PartialEq)]
pub struct Scan {
    /// Gain in effect while the samples were taken
    pub gain: Gain,
    /// Data rate in effect while the samples were taken
    pub data_rate: DataRate,
    /// One sample per requested channel, in request order
    pub samples: Vec<Sample, MAX_SINGLE_ENDED>,
}

impl Scan {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = i32> + '_ {
        self.samples.iter().map(|sample| sample.code)
    }

    /// Samples converted to volts with the scan's gain
    pub fn volts(&self, v_ref: f64) -> impl Iterator<Item = f64> + '_ {
        self.samples
            .iter()
            .map(move |sample| sample.volts(self.gain, v_ref))
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
    /// Samples each input against AINCOM, 1 to 8 inputs.
    pub fn scan_single_ended(
        &mut self,
        inputs: &[Input],
    ) -> Result<Scan, Ads1256Error<SpiError, GpioError>> {
        let channels = collect_channels(
            inputs.iter().map(|&input| Channel::SingleEnded(input)),
            inputs.len(),
            MAX_SINGLE_ENDED,
        )?;
        self.scan(&channels)
    }

    /// Samples each `(positive, negative)` pair, 1 to 4 pairs.
    pub fn scan_differential(
        &mut self,
        pairs: &[(Input, Input)],
    ) -> Result<Scan, Ads1256Error<SpiError, GpioError>> {
        let channels = collect_channels(
            pairs.iter().map(|&pair| Channel::from(pair)),
            pairs.len(),
            MAX_DIFFERENTIAL,
        )?;
        self.scan(&channels)
    }

    /// Samples an arbitrary mix of selections, 1 to 8 channels.
    pub fn scan(
        &mut self,
        channels: &[Channel],
    ) -> Result<Scan, Ads1256Error<SpiError, GpioError>> {
        check_count(channels.len(), MAX_SINGLE_ENDED)?;

        let mut samples = Vec::new();
        match self.config.lag_compensation {
            LagCompensation::None => {
                for &channel in channels {
                    let sample = self.read_sample(channel)?;
                    push(&mut samples, sample)?;
                }
            }
            LagCompensation::Pipelined => {
                // Each cycle reads what the previous selection converted.
                self.wait_for_drdy()?;
                let stale = self.cycle(channels[0])?;
                log::trace!("Discarding {} read while switching to {}", stale, channels[0]);
                for window in channels.windows(2) {
                    self.wait_for_drdy()?;
                    let code = self.cycle(window[1])?;
                    push(&mut samples, Sample { channel: window[0], code })?;
                }
                let last = channels[channels.len() - 1];
                let code = self.read_data()?;
                push(&mut samples, Sample { channel: last, code })?;
            }
        }

        for sample in samples.iter() {
            log::debug!("{}: {}", sample.channel, sample.code);
        }
        Ok(Scan {
            gain: self.config.gain,
            data_rate: self.config.data_rate,
            samples,
        })
    }
}

fn check_count<SpiError, GpioError>(
    count: usize,
    max: usize,
) -> Result<(), Ads1256Error<SpiError, GpioError>> {
    if count == 0 || count > max {
        return Err(Ads1256Error::InvalidChannelCount { count, max });
    }
    Ok(())
}

fn collect_channels<SpiError, GpioError>(
    channels: impl Iterator<Item = Channel>,
    count: usize,
    max: usize,
) -> Result<Vec<Channel, MAX_SINGLE_ENDED>, Ads1256Error<SpiError, GpioError>> {
    check_count(count, max)?;
    Ok(channels.collect())
}

fn push<SpiError, GpioError>(
    samples: &mut Vec<Sample, MAX_SINGLE_ENDED>,
    sample: Sample,
) -> Result<(), Ads1256Error<SpiError, GpioError>> {
    let count = samples.len() + 1;
    samples
        .push(sample)
        .map_err(|_| Ads1256Error::InvalidChannelCount {
            count,
            max: MAX_SINGLE_ENDED,
        })
}
