//! Blocking master client

use camino_hal::{PinMode, UartRx, UartTx};
use camino_protocol::builtin::{self, MAX_CALLABLES, MAX_NAME_LEN};
use camino_protocol::{CommandFrame, FrameError, Response, ResponseParser, ReturnValue, MAX_DATA_LENGTH};
use heapless::{String, Vec};

/// Resends attempted after the first try before giving up
pub const DEFAULT_MAX_RETRIES: u8 = 3;

/// Master errors
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MasterError<E> {
    /// The UART failed
    Io(E),
    /// The line went quiet before a full response arrived
    Timeout,
    /// A frame could not be built, or a response failed its checksum
    Frame(FrameError),
    /// The slave kept asking for a resend
    ResendLimit,
    /// The reply's shape does not fit the call
    UnexpectedReply,
    /// No callable with that name
    UnknownCallable,
    /// A discovered name is not UTF-8 or is too long
    InvalidName,
}

impl<E> From<FrameError> for MasterError<E> {
    fn from(e: FrameError) -> Self {
        MasterError::Frame(e)
    }
}

/// A successful reply
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// The callable returned nothing
    NoData,
    /// The callable returned an array, possibly empty
    Data(Vec<u8, MAX_DATA_LENGTH>),
}

impl Reply {
    /// Payload bytes, if the callable returned any
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Reply::NoData => None,
            Reply::Data(d) => Some(d.as_slice()),
        }
    }

    /// Decode a little-endian value of exactly `T::SIZE` bytes
    pub fn decode<T: ReturnValue>(&self) -> Option<T> {
        T::read_le(self.data()?)
    }
}

/// Client for one slave address
pub struct Master<U> {
    uart: U,
    address: u8,
    max_retries: u8,
    names: Vec<String<MAX_NAME_LEN>, MAX_CALLABLES>,
}

impl<U> Master<U> {
    /// Create a client for the slave at `address`
    pub fn new(uart: U, address: u8) -> Self {
        Self {
            uart,
            address,
            max_retries: DEFAULT_MAX_RETRIES,
            names: Vec::new(),
        }
    }

    /// Set how many resends to attempt after the first try
    pub fn with_max_retries(mut self, max_retries: u8) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Slave address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Talk to a different slave, forgetting the discovered table
    pub fn set_address(&mut self, address: u8) {
        self.address = address;
        self.names.clear();
    }

    /// Callable names found by the last [`discover`](Self::discover)
    pub fn names(&self) -> &[String<MAX_NAME_LEN>] {
        &self.names
    }

    /// Number of callables found by the last discovery
    pub fn callable_count(&self) -> usize {
        self.names.len()
    }

    /// Id of a discovered callable
    pub fn find(&self, name: &str) -> Option<u8> {
        self.names
            .iter()
            .position(|n| n.as_str() == name)
            .map(|i| i as u8)
    }

    /// Borrow the UART
    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    /// Unwrap the UART
    pub fn into_inner(self) -> U {
        self.uart
    }
}

impl<U, E> Master<U>
where
    U: UartTx<Error = E> + UartRx<Error = E>,
{
    /// Call callable `command` and wait for its reply
    ///
    /// A resend request repeats the same frame, at most `max_retries`
    /// times.
    pub fn call(&mut self, command: u8, payload: &[u8]) -> Result<Reply, MasterError<E>> {
        let frame = CommandFrame::new(self.address, command, payload)?.encode_to_vec()?;

        let mut resends = 0;
        loop {
            self.uart.write_blocking(&frame).map_err(MasterError::Io)?;
            self.uart.flush().map_err(MasterError::Io)?;

            match self.read_response()? {
                Response::NoData => return Ok(Reply::NoData),
                Response::Data(data) => return Ok(Reply::Data(data)),
                Response::ResendRequest if resends < self.max_retries => {
                    resends += 1;
                    debug!("Resend {=u8} of command {=u8}", resends, command);
                }
                Response::ResendRequest => {
                    warn!("Command {=u8} still rejected after {=u8} resends", command, resends);
                    return Err(MasterError::ResendLimit);
                }
            }
        }
    }

    fn read_response(&mut self) -> Result<Response, MasterError<E>> {
        let mut parser = ResponseParser::new();
        loop {
            let byte = self
                .uart
                .read_byte()
                .map_err(MasterError::Io)?
                .ok_or(MasterError::Timeout)?;
            if let Some(response) = parser.feed(byte)? {
                return Ok(response);
            }
        }
    }

    /// Call a discovered callable by name, discovering first if needed
    pub fn call_by_name(&mut self, name: &str, payload: &[u8]) -> Result<Reply, MasterError<E>> {
        if self.names.is_empty() {
            self.discover()?;
        }
        let id = self.find(name).ok_or(MasterError::UnknownCallable)?;
        self.call(id, payload)
    }

    /// Read the slave's callable table
    pub fn discover(&mut self) -> Result<&[String<MAX_NAME_LEN>], MasterError<E>> {
        self.names.clear();
        let count = self.num_calls()?;
        for id in 0..count {
            let name = self.nth_call(id)?.ok_or(MasterError::UnexpectedReply)?;
            self.names
                .push(name)
                .map_err(|_| MasterError::UnexpectedReply)?;
        }
        debug!("Slave {=u8} exposes {=usize} callables", self.address, self.names.len());
        Ok(self.names.as_slice())
    }

    /// Total number of callables on the slave
    pub fn num_calls(&mut self) -> Result<u8, MasterError<E>> {
        self.call_for(builtin::NUM_CALLS, &[])
    }

    /// Name of callable `id`, or `None` past the end of the table
    pub fn nth_call(&mut self, id: u8) -> Result<Option<String<MAX_NAME_LEN>>, MasterError<E>> {
        let Reply::Data(data) = self.call(builtin::GET_NTH_CALL, &[id])? else {
            return Ok(None);
        };
        let text = core::str::from_utf8(&data).map_err(|_| MasterError::InvalidName)?;
        let mut name = String::new();
        name.push_str(text).map_err(|_| MasterError::InvalidName)?;
        Ok(Some(name))
    }

    /// Send `data` and return what the slave echoed
    pub fn echo(&mut self, data: &[u8]) -> Result<Vec<u8, MAX_DATA_LENGTH>, MasterError<E>> {
        match self.call(builtin::ECHO, data)? {
            Reply::Data(echoed) => Ok(echoed),
            Reply::NoData => Err(MasterError::UnexpectedReply),
        }
    }

    /// Configure a pin
    pub fn pin_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), MasterError<E>> {
        self.call_no_data(builtin::PIN_MODE, &[pin, mode.to_byte()])
    }

    /// Drive a pin high or low
    pub fn digital_write(&mut self, pin: u8, high: bool) -> Result<(), MasterError<E>> {
        self.call_no_data(builtin::DIGITAL_WRITE, &[pin, u8::from(high)])
    }

    /// Read a pin's logic level
    pub fn digital_read(&mut self, pin: u8) -> Result<bool, MasterError<E>> {
        self.call_for::<u8>(builtin::DIGITAL_READ, &[pin])
            .map(|level| level != 0)
    }

    /// Read an analog input
    pub fn analog_read(&mut self, pin: u8) -> Result<i16, MasterError<E>> {
        self.call_for(builtin::ANALOG_READ, &[pin])
    }

    /// Set a PWM duty cycle
    pub fn analog_write(&mut self, pin: u8, duty: u8) -> Result<(), MasterError<E>> {
        self.call_no_data(builtin::ANALOG_WRITE, &[pin, duty])
    }

    fn call_for<T: ReturnValue>(&mut self, command: u8, payload: &[u8]) -> Result<T, MasterError<E>> {
        self.call(command, payload)?
            .decode()
            .ok_or(MasterError::UnexpectedReply)
    }

    fn call_no_data(&mut self, command: u8, payload: &[u8]) -> Result<(), MasterError<E>> {
        match self.call(command, payload)? {
            Reply::NoData => Ok(()),
            Reply::Data(_) => Err(MasterError::UnexpectedReply),
        }
    }
}
