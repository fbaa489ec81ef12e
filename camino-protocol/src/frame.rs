//! Command frame encoding and the shared wire constants.
//!
//! Frame format (master → slave):
//! - HEADER (2 bytes): 0xAA 0x55
//! - ADDRESS (1 byte): target slave address
//! - COMMAND (1 byte): callable id
//! - LENGTH (1 byte): payload length (0-255)
//! - DATA (0-255 bytes): callable arguments
//! - CHECKSUM (1 byte): wrapping sum of ADDRESS, COMMAND, LENGTH and DATA

use heapless::Vec;

/// First command preamble byte
pub const COMMAND_HEADER_1: u8 = 0xAA;

/// Second command preamble byte
pub const COMMAND_HEADER_2: u8 = 0x55;

/// Header byte (sent twice) of a response carrying no data
pub const RESPONSE_NO_DATA: u8 = 0xA9;

/// Header byte (sent twice) of a response carrying data
pub const RESPONSE_WITH_DATA: u8 = 0xAC;

/// Header byte (sent twice) of a resend request
pub const RESPONSE_RESEND: u8 = 0xB8;

/// Largest payload the one-byte length field can describe
pub const MAX_DATA_LENGTH: usize = 255;

/// Maximum complete command frame size (HEADER + ADDRESS + COMMAND + LENGTH + DATA + CHECKSUM)
pub const MAX_COMMAND_FRAME_SIZE: usize = 2 + 1 + 1 + 1 + MAX_DATA_LENGTH + 1;

/// Maximum complete response frame size (HEADER + LENGTH + DATA + CHECKSUM)
pub const MAX_RESPONSE_FRAME_SIZE: usize = 2 + 1 + MAX_DATA_LENGTH + 1;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds the one-byte length field
    PayloadTooLarge,
    /// Checksum mismatch
    InvalidChecksum,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// 8-bit wrapping sum over `bytes`
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// A command addressed to one slave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFrame<'a> {
    /// Target slave address
    pub address: u8,
    /// Callable id
    pub command: u8,
    /// Callable arguments
    pub payload: &'a [u8],
}

impl<'a> CommandFrame<'a> {
    /// Create a new command frame
    pub fn new(address: u8, command: u8, payload: &'a [u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_DATA_LENGTH {
            return Err(FrameError::PayloadTooLarge);
        }
        Ok(Self {
            address,
            command,
            payload,
        })
    }

    /// Checksum byte this frame carries on the wire
    pub fn checksum(&self) -> u8 {
        self.address
            .wrapping_add(self.command)
            .wrapping_add(self.payload.len() as u8)
            .wrapping_add(checksum(self.payload))
    }

    /// Number of bytes [`encode`](Self::encode) will write
    pub fn encoded_len(&self) -> usize {
        6 + self.payload.len()
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        if self.payload.len() > MAX_DATA_LENGTH {
            return Err(FrameError::PayloadTooLarge);
        }
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = COMMAND_HEADER_1;
        buffer[1] = COMMAND_HEADER_2;
        buffer[2] = self.address;
        buffer[3] = self.command;
        buffer[4] = self.payload.len() as u8;
        buffer[5..5 + self.payload.len()].copy_from_slice(self.payload);
        buffer[frame_len - 1] = self.checksum();

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_COMMAND_FRAME_SIZE>, FrameError> {
        let mut vec = Vec::new();
        vec.resize(self.encoded_len(), 0)
            .map_err(|_| FrameError::BufferTooSmall)?;
        let len = self.encode(&mut vec)?;
        vec.truncate(len);
        Ok(vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_wraps() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
        assert_eq!(checksum(&[0x80, 0x80, 0x80]), 0x80);
    }

    #[test]
    fn test_encode_echo_command() {
        let frame = CommandFrame::new(0x01, 0x02, &[0x10, 0x20]).unwrap();
        let encoded = frame.encode_to_vec().unwrap();
        assert_eq!(
            encoded.as_slice(),
            &[0xAA, 0x55, 0x01, 0x02, 0x02, 0x10, 0x20, 0x35]
        );
    }

    #[test]
    fn test_encode_empty_payload() {
        let frame = CommandFrame::new(0x07, 0x00, &[]).unwrap();
        let mut buffer = [0u8; 8];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 6);
        assert_eq!(&buffer[..len], &[0xAA, 0x55, 0x07, 0x00, 0x00, 0x07]);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let frame = CommandFrame::new(0x01, 0x02, &[1, 2, 3]).unwrap();
        let mut buffer = [0u8; 8];
        assert_eq!(frame.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_payload_too_large() {
        let large_payload = [0u8; MAX_DATA_LENGTH + 1];
        let result = CommandFrame::new(0x01, 0x02, &large_payload);
        assert_eq!(result, Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_max_payload_fits() {
        let payload = [0x11u8; MAX_DATA_LENGTH];
        let frame = CommandFrame::new(0x01, 0x02, &payload).unwrap();
        let encoded = frame.encode_to_vec().unwrap();
        assert_eq!(encoded.len(), MAX_COMMAND_FRAME_SIZE);
        assert_eq!(encoded[4], 0xFF);
    }

    #[test]
    fn test_encode_to_vec_rejects_oversized_literal() {
        let payload = [0u8; MAX_DATA_LENGTH + 1];
        let frame = CommandFrame {
            address: 0x01,
            command: 0x02,
            payload: &payload,
        };
        assert_eq!(frame.encode_to_vec(), Err(FrameError::BufferTooSmall));
    }
}
