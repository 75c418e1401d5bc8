//! Analog inputs and multiplexer selections.

use core::fmt;

use crate::constants::MUX_AINCOM;

/// One of the nine physical analog inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Input {
    Ain0 = 0,
    Ain1 = 1,
    Ain2 = 2,
    Ain3 = 3,
    Ain4 = 4,
    Ain5 = 5,
    Ain6 = 6,
    Ain7 = 7,
    AinCom = MUX_AINCOM,
}

impl Input {
    /// The eight numbered inputs, in order.
    pub const NUMBERED: [Input; 8] = [
        Input::Ain0,
        Input::Ain1,
        Input::Ain2,
        Input::Ain3,
        Input::Ain4,
        Input::Ain5,
        Input::Ain6,
        Input::Ain7,
    ];

    /// 4-bit multiplexer code
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for Input {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0..=7 => Ok(Input::NUMBERED[code as usize]),
            MUX_AINCOM => Ok(Input::AinCom),
            other => Err(other),
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::AinCom => write!(f, "AINCOM"),
            other => write!(f, "AIN{}", other.code()),
        }
    }
}

/// What the multiplexer feeds into the converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    /// `input` against AINCOM
    SingleEnded(Input),
    /// `positive - negative`. Selecting the same input twice is not rejected;
    /// the chip's behaviour is then undefined.
    Differential { positive: Input, negative: Input },
}

impl Channel {
    pub fn single_ended(input: Input) -> Self {
        Channel::SingleEnded(input)
    }

    pub fn differential(positive: Input, negative: Input) -> Self {
        Channel::Differential { positive, negative }
    }

    pub fn positive(&self) -> Input {
        match *self {
            Channel::SingleEnded(input) => input,
            Channel::Differential { positive, .. } => positive,
        }
    }

    pub fn negative(&self) -> Input {
        match *self {
            Channel::SingleEnded(_) => Input::AinCom,
            Channel::Differential { negative, .. } => negative,
        }
    }

    /// MUX register value: PSEL in bits 7..4, NSEL in bits 3..0.
    pub fn mux(&self) -> u8 {
        (self.positive().code() << 4) | self.negative().code()
    }
}

impl From<Input> for Channel {
    fn from(input: Input) -> Self {
        Channel::SingleEnded(input)
    }
}

impl From<(Input, Input)> for Channel {
    fn from((positive, negative): (Input, Input)) -> Self {
        Channel::Differential { positive, negative }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::SingleEnded(input) => write!(f, "{}", input),
            Channel::Differential { positive, negative } => write!(f, "{}-{}", positive, negative),
        }
    }
}
