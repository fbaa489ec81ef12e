//! Response frames: encoding on the slave, decoding on the master.

use heapless::Vec;

use crate::frame::{
    checksum, FrameError, MAX_DATA_LENGTH, RESPONSE_NO_DATA, RESPONSE_RESEND, RESPONSE_WITH_DATA,
};

/// An outgoing response, borrowing its payload from the staging buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseFrame<'a> {
    /// The callable returned nothing: `A9 A9`
    NoData,
    /// The callable returned a (possibly empty) array: `AC AC len data.. sum`
    WithData(&'a [u8]),
    /// The command failed its checksum: `B8 B8`
    ResendRequest,
}

impl ResponseFrame<'_> {
    /// Number of bytes [`encode`](Self::encode) will write
    pub fn encoded_len(&self) -> usize {
        match self {
            ResponseFrame::NoData | ResponseFrame::ResendRequest => 2,
            ResponseFrame::WithData(data) => 4 + data.len(),
        }
    }

    /// Encode this response into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        match self {
            ResponseFrame::NoData => {
                buffer[0] = RESPONSE_NO_DATA;
                buffer[1] = RESPONSE_NO_DATA;
            }
            ResponseFrame::ResendRequest => {
                buffer[0] = RESPONSE_RESEND;
                buffer[1] = RESPONSE_RESEND;
            }
            ResponseFrame::WithData(data) => {
                if data.len() > MAX_DATA_LENGTH {
                    return Err(FrameError::PayloadTooLarge);
                }
                let length = data.len() as u8;
                buffer[0] = RESPONSE_WITH_DATA;
                buffer[1] = RESPONSE_WITH_DATA;
                buffer[2] = length;
                buffer[3..3 + data.len()].copy_from_slice(data);
                buffer[3 + data.len()] = length.wrapping_add(checksum(data));
            }
        }

        Ok(frame_len)
    }
}

/// A decoded response, owning its payload
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// `A9 A9`
    NoData,
    /// `AC AC ...` with the payload
    Data(Vec<u8, MAX_DATA_LENGTH>),
    /// `B8 B8`
    ResendRequest,
}

/// State machine for parsing response frames on the master side
#[derive(Debug, Clone)]
pub struct ResponseParser {
    state: ParseState,
    buffer: Vec<u8, MAX_DATA_LENGTH>,
    expected_length: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for the first header byte
    WaitingForHeader,
    /// Got one header byte, waiting for its twin
    WaitingForSecondHeader(u8),
    /// Got `AC AC`, waiting for LENGTH
    WaitingForLength,
    /// Reading payload bytes
    ReadingPayload,
    /// Waiting for CHECKSUM
    WaitingForChecksum,
}

fn is_response_header(byte: u8) -> bool {
    matches!(
        byte,
        RESPONSE_NO_DATA | RESPONSE_WITH_DATA | RESPONSE_RESEND
    )
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseParser {
    /// Create a new response parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForHeader,
            buffer: Vec::new(),
            expected_length: 0,
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForHeader;
        self.buffer.clear();
        self.expected_length = 0;
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(response))` when a complete response is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on a bad checksum.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Response>, FrameError> {
        match self.state {
            ParseState::WaitingForHeader => {
                if is_response_header(byte) {
                    self.state = ParseState::WaitingForSecondHeader(byte);
                }
                // Silently ignore line noise while waiting
                Ok(None)
            }
            ParseState::WaitingForSecondHeader(first) => {
                if byte != first {
                    // A different header byte may be the start of the real frame
                    self.state = if is_response_header(byte) {
                        ParseState::WaitingForSecondHeader(byte)
                    } else {
                        ParseState::WaitingForHeader
                    };
                    return Ok(None);
                }
                match byte {
                    RESPONSE_NO_DATA => {
                        self.reset();
                        Ok(Some(Response::NoData))
                    }
                    RESPONSE_RESEND => {
                        self.reset();
                        Ok(Some(Response::ResendRequest))
                    }
                    _ => {
                        self.state = ParseState::WaitingForLength;
                        Ok(None)
                    }
                }
            }
            ParseState::WaitingForLength => {
                self.expected_length = byte;
                self.buffer.clear();
                self.state = if byte == 0 {
                    ParseState::WaitingForChecksum
                } else {
                    ParseState::ReadingPayload
                };
                Ok(None)
            }
            ParseState::ReadingPayload => {
                if self.buffer.push(byte).is_err() {
                    self.reset();
                    return Err(FrameError::BufferTooSmall);
                }
                if self.buffer.len() == self.expected_length as usize {
                    self.state = ParseState::WaitingForChecksum;
                }
                Ok(None)
            }
            ParseState::WaitingForChecksum => {
                let expected = self.expected_length.wrapping_add(checksum(&self.buffer));
                if byte != expected {
                    self.reset();
                    return Err(FrameError::InvalidChecksum);
                }
                let response = Response::Data(self.buffer.clone());
                self.reset();
                Ok(Some(response))
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete response found, if any.
    /// Remaining bytes after a complete response are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Response>, FrameError> {
        for &byte in bytes {
            if let Some(response) = self.feed(byte)? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}
