//! Command frame receiver
//!
//! A byte-at-a-time state machine that synchronizes on the two-byte
//! preamble and assembles one command frame at a time. It is meant to be
//! fed straight from a "byte received" interrupt: every call does a bounded
//! amount of work and never blocks.
//!
//! The receiver is address-agnostic. It reports every checksum-valid frame
//! and leaves filtering on the local address to the caller.

use heapless::Vec;

use crate::frame::{COMMAND_HEADER_1, COMMAND_HEADER_2};

/// What to do with a frame whose declared length exceeds the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OversizePolicy {
    /// Consume the frame to its checksum byte, then drop it with no reply
    #[default]
    Reject,
    /// Keep the bytes that fit and dispatch with the declared length
    Truncate,
}

/// Receiver states, one per field of the command frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxState {
    /// Waiting for 0xAA
    WaitHeader1,
    /// Got 0xAA, waiting for 0x55
    WaitHeader2,
    /// Waiting for the slave address
    WaitAddress,
    /// Waiting for the command id
    WaitCommand,
    /// Waiting for the payload length
    WaitLength,
    /// Reading payload bytes
    WaitData,
    /// Waiting for the checksum
    WaitChecksum,
}

/// A complete, checksum-valid command frame
///
/// Borrows the receiver's payload buffer; it is only valid until the next
/// byte is fed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceivedFrame<'a> {
    /// Address the frame was sent to
    pub address: u8,
    /// Callable id
    pub command: u8,
    /// Length field as sent by the master
    pub data_length: u8,
    /// Payload bytes that were stored (shorter than `data_length` only
    /// when the frame overflowed and the policy is `Truncate`)
    pub payload: &'a [u8],
}

impl ReceivedFrame<'_> {
    /// True if payload bytes were dropped for lack of space
    pub fn is_truncated(&self) -> bool {
        self.payload.len() < self.data_length as usize
    }
}

/// Outcome of a byte that completed a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxEvent<'a> {
    /// A checksum-valid frame, for any address
    Frame(ReceivedFrame<'a>),
    /// The checksum byte did not match; the master should resend
    ChecksumMismatch,
    /// The declared length exceeded the buffer and the policy is `Reject`
    Oversized {
        /// Address the frame was sent to
        address: u8,
        /// Declared payload length
        data_length: u8,
    },
}

/// Receive-side counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxStats {
    /// Frames that passed the checksum
    pub frames: u32,
    /// Frames that failed the checksum
    pub checksum_errors: u32,
    /// Partial frames abandoned after the timeout
    pub timeouts: u32,
    /// Preambles broken by an unexpected second byte
    pub sync_losses: u32,
    /// Frames whose declared length exceeded the buffer
    pub overflows: u32,
}

/// State machine for assembling incoming command frames
///
/// `N` is the payload buffer capacity. Declared lengths above `N` are
/// handled according to the [`OversizePolicy`].
#[derive(Debug, Clone)]
pub struct FrameReceiver<const N: usize> {
    state: RxState,
    policy: OversizePolicy,
    timeout_ms: u32,
    /// Time the first preamble byte arrived
    packet_start_ms: u32,
    address: u8,
    command: u8,
    data_length: u8,
    /// Payload bytes counted so far, stored or not
    receive_index: u8,
    checksum: u8,
    buffer: Vec<u8, N>,
    stats: RxStats,
}

impl<const N: usize> FrameReceiver<N> {
    /// Create a new receiver
    ///
    /// A partial frame older than `timeout_ms` (measured from its first
    /// preamble byte) is abandoned when the next byte arrives.
    pub fn new(timeout_ms: u32, policy: OversizePolicy) -> Self {
        Self {
            state: RxState::WaitHeader1,
            policy,
            timeout_ms,
            packet_start_ms: 0,
            address: 0,
            command: 0,
            data_length: 0,
            receive_index: 0,
            checksum: 0,
            buffer: Vec::new(),
            stats: RxStats::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> RxState {
        self.state
    }

    /// Counters since creation
    pub fn stats(&self) -> RxStats {
        self.stats
    }

    /// Payload buffer capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Abandon any partial frame
    pub fn reset(&mut self) {
        self.state = RxState::WaitHeader1;
        self.buffer.clear();
        self.receive_index = 0;
    }

    /// Feed a single byte received at `now_ms`
    ///
    /// Returns `Some(event)` when the byte completed a frame (valid or not),
    /// `None` otherwise.
    pub fn feed(&mut self, byte: u8, now_ms: u32) -> Option<RxEvent<'_>> {
        // A stalled partial frame is dropped before this byte is looked at,
        // so the byte itself gets a chance to start a new preamble.
        if self.state != RxState::WaitHeader1
            && now_ms.wrapping_sub(self.packet_start_ms) >= self.timeout_ms
        {
            self.stats.timeouts = self.stats.timeouts.wrapping_add(1);
            self.reset();
        }

        match self.state {
            RxState::WaitHeader1 => {
                if byte == COMMAND_HEADER_1 {
                    self.packet_start_ms = now_ms;
                    self.state = RxState::WaitHeader2;
                }
                None
            }
            RxState::WaitHeader2 => {
                if byte == COMMAND_HEADER_2 {
                    self.state = RxState::WaitAddress;
                } else {
                    self.stats.sync_losses = self.stats.sync_losses.wrapping_add(1);
                    self.state = RxState::WaitHeader1;
                }
                None
            }
            RxState::WaitAddress => {
                self.address = byte;
                self.checksum = byte;
                self.state = RxState::WaitCommand;
                None
            }
            RxState::WaitCommand => {
                self.command = byte;
                self.checksum = self.checksum.wrapping_add(byte);
                self.state = RxState::WaitLength;
                None
            }
            RxState::WaitLength => {
                self.data_length = byte;
                self.checksum = self.checksum.wrapping_add(byte);
                self.receive_index = 0;
                self.buffer.clear();
                self.state = if byte == 0 {
                    RxState::WaitChecksum
                } else {
                    RxState::WaitData
                };
                None
            }
            RxState::WaitData => {
                // Bytes beyond capacity still count toward the length and
                // the checksum; they are just not kept.
                let _ = self.buffer.push(byte);
                self.receive_index += 1;
                self.checksum = self.checksum.wrapping_add(byte);
                if self.receive_index == self.data_length {
                    self.state = RxState::WaitChecksum;
                }
                None
            }
            RxState::WaitChecksum => {
                self.state = RxState::WaitHeader1;
                let oversized = self.data_length as usize > N;
                if oversized {
                    self.stats.overflows = self.stats.overflows.wrapping_add(1);
                    if self.policy == OversizePolicy::Reject {
                        return Some(RxEvent::Oversized {
                            address: self.address,
                            data_length: self.data_length,
                        });
                    }
                }

                if byte != self.checksum {
                    self.stats.checksum_errors = self.stats.checksum_errors.wrapping_add(1);
                    return Some(RxEvent::ChecksumMismatch);
                }

                self.stats.frames = self.stats.frames.wrapping_add(1);
                Some(RxEvent::Frame(ReceivedFrame {
                    address: self.address,
                    command: self.command,
                    data_length: self.data_length,
                    payload: &self.buffer,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::CommandFrame;

    const TIMEOUT: u32 = 100;

    /// Feed all bytes at one instant, keeping the last event kind
    fn feed_all<const N: usize>(rx: &mut FrameReceiver<N>, bytes: &[u8], now: u32) -> Option<Kind> {
        let mut last = None;
        for &b in bytes {
            if let Some(event) = rx.feed(b, now) {
                last = Some(Kind::from(event));
            }
        }
        last
    }

    /// Owned summary of an event for assertions
    #[derive(Debug, PartialEq)]
    enum Kind {
        Frame {
            address: u8,
            command: u8,
            data_length: u8,
            payload: heapless::Vec<u8, 16>,
        },
        Checksum,
        Oversized(u8),
    }

    impl From<RxEvent<'_>> for Kind {
        fn from(event: RxEvent<'_>) -> Self {
            match event {
                RxEvent::Frame(f) => Kind::Frame {
                    address: f.address,
                    command: f.command,
                    data_length: f.data_length,
                    payload: heapless::Vec::from_slice(&f.payload[..f.payload.len().min(16)])
                        .unwrap(),
                },
                RxEvent::ChecksumMismatch => Kind::Checksum,
                RxEvent::Oversized { data_length, .. } => Kind::Oversized(data_length),
            }
        }
    }

    fn frame(payload: &[u8]) -> Kind {
        Kind::Frame {
            address: 0x01,
            command: 0x02,
            data_length: payload.len() as u8,
            payload: heapless::Vec::from_slice(payload).unwrap(),
        }
    }

    #[test]
    fn test_parse_echo_frame() {
        let mut rx = FrameReceiver::<32>::new(TIMEOUT, OversizePolicy::Reject);
        let event = feed_all(&mut rx, &[0xAA, 0x55, 0x01, 0x02, 0x02, 0x10, 0x20, 0x35], 0);
        assert_eq!(event, Some(frame(&[0x10, 0x20])));
        assert_eq!(rx.state(), RxState::WaitHeader1);
        assert_eq!(rx.stats().frames, 1);
    }

    #[test]
    fn test_zero_length_skips_data_state() {
        let mut rx = FrameReceiver::<32>::new(TIMEOUT, OversizePolicy::Reject);
        for &b in &[0xAA, 0x55, 0x01, 0x02, 0x00] {
            assert!(rx.feed(b, 0).is_none());
        }
        assert_eq!(rx.state(), RxState::WaitChecksum);
        assert_eq!(feed_all(&mut rx, &[0x03], 0), Some(frame(&[])));
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut rx = FrameReceiver::<32>::new(TIMEOUT, OversizePolicy::Reject);
        let event = feed_all(&mut rx, &[0xAA, 0x55, 0x01, 0x02, 0x02, 0x10, 0x20, 0x36], 0);
        assert_eq!(event, Some(Kind::Checksum));
        assert_eq!(rx.state(), RxState::WaitHeader1);
        assert_eq!(rx.stats().checksum_errors, 1);
    }

    #[test]
    fn test_foreign_address_still_reported() {
        let mut rx = FrameReceiver::<32>::new(TIMEOUT, OversizePolicy::Reject);
        let encoded = CommandFrame::new(0x09, 0x00, &[]).unwrap().encode_to_vec().unwrap();
        match feed_all(&mut rx, &encoded, 0) {
            Some(Kind::Frame { address, .. }) => assert_eq!(address, 0x09),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_resync_after_garbage() {
        let mut rx = FrameReceiver::<32>::new(TIMEOUT, OversizePolicy::Reject);
        let mut data = heapless::Vec::<u8, 32>::new();
        // 0xAA followed by a non-0x55 byte is a broken preamble
        data.extend_from_slice(&[0x00, 0xAA, 0x12, 0xFF]).unwrap();
        data.extend_from_slice(&[0xAA, 0x55, 0x01, 0x02, 0x01, 0x7F, 0x83])
            .unwrap();
        assert_eq!(feed_all(&mut rx, &data, 0), Some(frame(&[0x7F])));
        assert_eq!(rx.stats().sync_losses, 1);
    }

    #[test]
    fn test_repeated_header1_restarts() {
        let mut rx = FrameReceiver::<32>::new(TIMEOUT, OversizePolicy::Reject);
        // AA AA: the second AA breaks the preamble and is not re-tested
        let event = feed_all(&mut rx, &[0xAA, 0xAA, 0x55, 0x01, 0x02, 0x00, 0x03], 0);
        assert_eq!(event, None);
    }

    #[test]
    fn test_timeout_resets_and_retests_byte() {
        let mut rx = FrameReceiver::<32>::new(TIMEOUT, OversizePolicy::Reject);
        // Partial frame starting at t=0
        assert_eq!(feed_all(&mut rx, &[0xAA, 0x55, 0x01, 0x02, 0x04, 0x01], 10), None);
        assert_eq!(rx.state(), RxState::WaitData);

        // Stream resumes after the timeout with a fresh frame; its first
        // byte must be taken as a preamble candidate.
        let event = feed_all(&mut rx, &[0xAA, 0x55, 0x01, 0x02, 0x00, 0x03], 10 + TIMEOUT);
        assert_eq!(event, Some(frame(&[])));
        assert_eq!(rx.stats().timeouts, 1);
    }

    #[test]
    fn test_no_timeout_within_window() {
        let mut rx = FrameReceiver::<32>::new(TIMEOUT, OversizePolicy::Reject);
        assert_eq!(feed_all(&mut rx, &[0xAA, 0x55, 0x01], 1000), None);
        assert_eq!(
            feed_all(&mut rx, &[0x02, 0x00, 0x03], 1000 + TIMEOUT - 1),
            Some(frame(&[]))
        );
        assert_eq!(rx.stats().timeouts, 0);
    }

    #[test]
    fn test_timeout_across_clock_wrap() {
        let mut rx = FrameReceiver::<32>::new(TIMEOUT, OversizePolicy::Reject);
        let start = u32::MAX - 10;
        assert_eq!(feed_all(&mut rx, &[0xAA, 0x55, 0x01], start), None);
        // 20 ms later, after the counter wrapped: still inside the window
        assert_eq!(feed_all(&mut rx, &[0x02, 0x00, 0x03], 9), Some(frame(&[])));
    }

    #[test]
    fn test_oversize_rejected() {
        let mut rx = FrameReceiver::<4>::new(TIMEOUT, OversizePolicy::Reject);
        let payload = [1u8, 2, 3, 4, 5, 6];
        let encoded = CommandFrame::new(0x01, 0x02, &payload)
            .unwrap()
            .encode_to_vec()
            .unwrap();
        assert_eq!(feed_all(&mut rx, &encoded, 0), Some(Kind::Oversized(6)));
        assert_eq!(rx.state(), RxState::WaitHeader1);
        assert_eq!(rx.stats().overflows, 1);
    }

    #[test]
    fn test_oversize_truncated() {
        let mut rx = FrameReceiver::<4>::new(TIMEOUT, OversizePolicy::Truncate);
        let payload = [1u8, 2, 3, 4, 5, 6];
        let encoded = CommandFrame::new(0x01, 0x02, &payload)
            .unwrap()
            .encode_to_vec()
            .unwrap();

        let mut seen = false;
        for &b in encoded.iter() {
            if let Some(RxEvent::Frame(f)) = rx.feed(b, 0) {
                assert_eq!(f.data_length, 6);
                assert_eq!(f.payload, &[1, 2, 3, 4]);
                assert!(f.is_truncated());
                seen = true;
            }
        }
        assert!(seen);
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut rx = FrameReceiver::<32>::new(TIMEOUT, OversizePolicy::Reject);
        let a = CommandFrame::new(0x01, 0x02, &[0x05]).unwrap().encode_to_vec().unwrap();
        let b = CommandFrame::new(0x01, 0x02, &[0x06]).unwrap().encode_to_vec().unwrap();
        assert_eq!(feed_all(&mut rx, &a, 0), Some(frame(&[0x05])));
        assert_eq!(feed_all(&mut rx, &b, 1), Some(frame(&[0x06])));
        assert_eq!(rx.stats().frames, 2);
    }
}
