//! Interrupt-driven response transmitter
//!
//! A response is encoded in full when it is queued. The first byte goes out
//! immediately and each "transmitter ready" event sends the next one, so
//! no call ever waits on the line.

use camino_hal::{SerialLink, TransmissionHooks};
use camino_protocol::{FrameError, ResponseFrame, MAX_RESPONSE_FRAME_SIZE};
use heapless::Vec;

/// Transmit errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxError {
    /// A response is still going out
    Busy,
    /// The response could not be encoded
    Encode(FrameError),
}

impl From<FrameError> for TxError {
    fn from(e: FrameError) -> Self {
        TxError::Encode(e)
    }
}

/// Byte-at-a-time response sender
#[derive(Debug, Clone)]
pub struct FrameTransmitter {
    frame: Vec<u8, MAX_RESPONSE_FRAME_SIZE>,
    /// Next byte to send
    index: usize,
    busy: bool,
}

impl Default for FrameTransmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTransmitter {
    /// Create an idle transmitter
    pub const fn new() -> Self {
        Self {
            frame: Vec::new(),
            index: 0,
            busy: false,
        }
    }

    /// True while a response is going out
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Bytes of the current response not yet handed to the link
    pub fn remaining(&self) -> usize {
        if self.busy {
            self.frame.len() - self.index
        } else {
            0
        }
    }

    /// Queue `response` and send its first byte
    ///
    /// Calls `begin_transmission` before the first byte and arms the ready
    /// notification for the rest. Fails without touching the link if a
    /// response is already in flight.
    pub fn start<L, H>(
        &mut self,
        response: &ResponseFrame<'_>,
        link: &mut L,
        hooks: &mut H,
    ) -> Result<(), TxError>
    where
        L: SerialLink,
        H: TransmissionHooks,
    {
        if self.busy {
            return Err(TxError::Busy);
        }

        let len = response.encoded_len();
        self.frame.clear();
        self.frame
            .resize_default(len)
            .map_err(|_| TxError::Encode(FrameError::BufferTooSmall))?;
        if let Err(e) = response.encode(&mut self.frame) {
            self.frame.clear();
            return Err(e.into());
        }

        trace!("Transmit {=usize} bytes", len);

        hooks.begin_transmission();
        self.busy = true;
        self.index = 1;
        link.send_byte(self.frame[0]);
        link.set_tx_ready_notify(true);
        Ok(())
    }

    /// Handle a "transmitter ready" event
    ///
    /// Sends the next byte, or once every byte has gone out disarms the
    /// notification and calls `end_transmission`. While idle this only
    /// disarms the notification.
    pub fn on_tx_ready<L, H>(&mut self, link: &mut L, hooks: &mut H)
    where
        L: SerialLink,
        H: TransmissionHooks,
    {
        if !self.busy {
            link.set_tx_ready_notify(false);
            return;
        }

        if let Some(&byte) = self.frame.get(self.index) {
            self.index += 1;
            link.send_byte(byte);
            return;
        }

        link.set_tx_ready_notify(false);
        self.busy = false;
        self.index = 0;
        hooks.end_transmission();
    }
}
