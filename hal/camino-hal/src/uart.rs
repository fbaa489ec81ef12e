//! UART serial communication abstractions
//!
//! Two flavors of serial access live here:
//!
//! - [`SerialLink`]: the interrupt-driven, one-byte-at-a-time transport a
//!   slave is built on. The platform calls into the engine on "byte
//!   received" and "ready for next byte"; the engine calls back through
//!   this trait to push bytes out.
//! - [`UartTx`] / [`UartRx`]: blocking byte streams, used by the master.

/// Interrupt-driven serial transport
///
/// Implementations wrap the transmit data register and the
/// "transmit buffer empty" interrupt enable of a USART.
pub trait SerialLink {
    /// Put one byte into the transmit register
    fn send_byte(&mut self, byte: u8);

    /// Enable or disable the "ready for next byte" notification
    ///
    /// While enabled, the platform must call the engine's tx-ready handler
    /// each time the transmitter can accept another byte.
    fn set_tx_ready_notify(&mut self, enabled: bool);
}

/// UART transmitter
///
/// Blocking trait for sending data over a UART interface.
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
///
/// Blocking trait for receiving data from a UART interface.
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read data from the UART
    ///
    /// Blocks until the buffer is filled, the line goes quiet, or an error
    /// occurs. Returns the number of bytes actually read.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Read a single byte from the UART
    ///
    /// Returns `Ok(None)` when no byte arrived before the port's own
    /// read timeout.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        let mut buf = [0u8; 1];
        match self.read_blocking(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }
}

/// Adapter from an `embedded-io` byte stream to [`UartTx`] / [`UartRx`]
///
/// Lets the master run on anything that already speaks `embedded-io`
/// (host serial ports via adapters, USB CDC classes, test pipes).
pub struct IoUart<T> {
    inner: T,
}

impl<T> IoUart<T> {
    /// Wrap a stream
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped stream
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Borrow the wrapped stream mutably
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwrap the stream
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: embedded_io::Write> UartTx for IoUart<T> {
    type Error = T::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}

impl<T: embedded_io::Read> UartRx for IoUart<T> {
    type Error = T::Error;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..])? {
                // Stream went quiet
                0 => break,
                n => filled += n,
            }
        }
        Ok(filled)
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::new(115200)
    }
}

impl UartConfig {
    /// 8N1 at the given baud rate
    pub const fn new(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }

    /// Time to shift one character out, in microseconds
    ///
    /// Counts start bit, data bits, parity and stop bits.
    pub fn char_time_us(&self) -> u32 {
        let data = match self.data_bits {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
            DataBits::Nine => 9,
        };
        let parity = if self.parity == Parity::None { 0 } else { 1 };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        let bits: u32 = 1 + data + parity + stop;
        (bits * 1_000_000).div_ceil(self.baudrate.max(1))
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopBits {
    One,
    Two,
}
