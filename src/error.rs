use core::fmt;

#[derive(Debug, PartialEq)]
pub enum Ads1256Error<SpiError, GpioError> {
    Spi(SpiError),
    Gpio(GpioError),
    /// DRDY did not go low before the configured deadline.
    Timeout,
    /// Raw multiplexer code outside AIN0..AIN7/AINCOM.
    InvalidInputChannel(u8),
    /// Raw ADCON PGA code outside the seven documented gains.
    InvalidGain(u8),
    /// Raw DRATE code that is not one of the sixteen documented rates.
    InvalidDataRate(u8),
    /// Register span outside STATUS..=FSC2, or empty.
    InvalidRegister { reg: u8, len: usize },
    /// Scan list empty or longer than the orchestrator accepts.
    InvalidChannelCount { count: usize, max: usize },
}

impl<SpiError: fmt::Debug, GpioError: fmt::Debug> fmt::Display
    for Ads1256Error<SpiError, GpioError>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ads1256Error::Spi(e) => write!(f, "SPI error: {:?}", e),
            Ads1256Error::Gpio(e) => write!(f, "GPIO error: {:?}", e),
            Ads1256Error::Timeout => write!(f, "conversion timeout: DRDY never asserted"),
            Ads1256Error::InvalidInputChannel(code) => {
                write!(f, "invalid input channel code 0x{:02X}", code)
            }
            Ads1256Error::InvalidGain(code) => write!(f, "invalid PGA code 0x{:02X}", code),
            Ads1256Error::InvalidDataRate(code) => write!(f, "invalid DRATE code 0x{:02X}", code),
            Ads1256Error::InvalidRegister { reg, len } => {
                write!(f, "invalid register span: {} byte(s) at 0x{:02X}", len, reg)
            }
            Ads1256Error::InvalidChannelCount { count, max } => {
                write!(f, "scan needs 1 to {} channels, got {}", max, count)
            }
        }
    }
}

#[cfg(feature = "std")]
impl<SpiError: fmt::Debug, GpioError: fmt::Debug> std::error::Error
    for Ads1256Error<SpiError, GpioError>
{
}
