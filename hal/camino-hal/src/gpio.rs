//! GPIO abstractions
//!
//! Pins are addressed by number, the way the master names them on the wire.
//! Implementations map numbers onto the chip's ports and reject (ignore)
//! numbers they do not own.

/// Pin direction / pull configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// High-impedance input
    Input,
    /// Push-pull output
    Output,
    /// Input with the internal pull-up enabled
    InputPullup,
}

// Wire format values
const MODE_INPUT: u8 = 0x00;
const MODE_OUTPUT: u8 = 0x01;
const MODE_INPUT_PULLUP: u8 = 0x02;

impl PinMode {
    /// Parse a mode from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            MODE_INPUT => Some(PinMode::Input),
            MODE_OUTPUT => Some(PinMode::Output),
            MODE_INPUT_PULLUP => Some(PinMode::InputPullup),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            PinMode::Input => MODE_INPUT,
            PinMode::Output => MODE_OUTPUT,
            PinMode::InputPullup => MODE_INPUT_PULLUP,
        }
    }
}

/// Pin-numbered digital and analog I/O
///
/// Backs the built-in pin callables. Every call must return quickly: it
/// runs inside the receive event that completed the command frame.
pub trait PinIo {
    /// Configure a pin's direction
    fn pin_mode(&mut self, pin: u8, mode: PinMode);

    /// Drive an output pin high or low
    fn digital_write(&mut self, pin: u8, high: bool);

    /// Sample a digital input
    fn digital_read(&mut self, pin: u8) -> bool;

    /// Sample an analog input
    fn analog_read(&mut self, pin: u8) -> i16;

    /// Set a PWM duty cycle (0-255)
    fn analog_write(&mut self, pin: u8, duty: u8);
}
