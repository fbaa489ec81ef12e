//! Slave session
//!
//! [`Slave`] owns every piece of per-device state and exposes the two event
//! handlers the platform's interrupts call into.

use camino_hal::{Clock, FullDuplex, SerialLink, TransmissionHooks};
use camino_protocol::{FrameReceiver, ResponseFrame, RxEvent, RxState, RxStats};

use crate::config::{SlaveConfig, UnknownCommandPolicy, DEFAULT_MAX_DATA_LENGTH};
use crate::dispatch::dispatch;
use crate::registry::Registry;
use crate::transmitter::FrameTransmitter;

/// One slave device on one serial line
///
/// - `L`: byte transport
/// - `C`: millisecond clock
/// - `B`: application board state handed to every callable
/// - `H`: bus direction hooks
/// - `N`: payload capacity of both the receive and the staging buffer
pub struct Slave<L, C, B, H = FullDuplex, const N: usize = DEFAULT_MAX_DATA_LENGTH> {
    config: SlaveConfig,
    receiver: FrameReceiver<N>,
    registry: Registry<B>,
    staging: [u8; N],
    transmitter: FrameTransmitter,
    link: L,
    clock: C,
    board: B,
    hooks: H,
}

impl<L, C, B, H, const N: usize> Slave<L, C, B, H, N>
where
    L: SerialLink,
    C: Clock,
    H: TransmissionHooks,
{
    /// Create a slave and run the one-time transmission setup
    pub fn new(
        config: SlaveConfig,
        link: L,
        clock: C,
        board: B,
        mut hooks: H,
        registry: Registry<B>,
    ) -> Self {
        hooks.init_transmissions();
        debug!(
            "Slave {=u8} ready, {=usize} callables",
            config.address,
            registry.len()
        );
        Self {
            config,
            receiver: FrameReceiver::new(config.command_timeout_ms, config.oversize),
            registry,
            staging: [0; N],
            transmitter: FrameTransmitter::new(),
            link,
            clock,
            board,
            hooks,
        }
    }

    /// Handle one received byte
    ///
    /// Call from the "byte received" interrupt. A byte that completes a
    /// frame addressed here runs the callable and starts the response.
    pub fn on_byte_received(&mut self, byte: u8) {
        let now_ms = self.clock.now_ms();
        let Some(event) = self.receiver.feed(byte, now_ms) else {
            return;
        };

        match event {
            RxEvent::Frame(frame) => {
                if frame.address != self.config.address {
                    trace!(
                        "Frame for {=u8} ignored (we are {=u8})",
                        frame.address,
                        self.config.address
                    );
                    return;
                }
                if frame.is_truncated() {
                    warn!(
                        "Payload truncated: {=u8} declared, {=usize} kept",
                        frame.data_length,
                        frame.payload.len()
                    );
                }
                if self.transmitter.is_busy() {
                    warn!("Command {=u8} dropped, still transmitting", frame.command);
                    return;
                }

                match dispatch(&self.registry, &frame, &mut self.board, &mut self.staging) {
                    Some(response) => {
                        Self::respond(&mut self.transmitter, &response, &mut self.link, &mut self.hooks)
                    }
                    None => match self.config.unknown_command {
                        UnknownCommandPolicy::NoData => Self::respond(
                            &mut self.transmitter,
                            &ResponseFrame::NoData,
                            &mut self.link,
                            &mut self.hooks,
                        ),
                        UnknownCommandPolicy::Silent => {}
                    },
                }
            }
            RxEvent::ChecksumMismatch => {
                debug!("Checksum mismatch, requesting resend");
                Self::respond(
                    &mut self.transmitter,
                    &ResponseFrame::ResendRequest,
                    &mut self.link,
                    &mut self.hooks,
                );
            }
            RxEvent::Oversized {
                address,
                data_length,
            } => {
                warn!(
                    "Frame for {=u8} dropped: {=u8} bytes exceed capacity {=usize}",
                    address,
                    data_length,
                    N
                );
            }
        }
    }

    /// Handle a "transmitter ready" event
    ///
    /// Call from the transmit interrupt while notification is armed.
    pub fn on_tx_ready(&mut self) {
        self.transmitter.on_tx_ready(&mut self.link, &mut self.hooks);
    }

    fn respond(
        transmitter: &mut FrameTransmitter,
        response: &ResponseFrame<'_>,
        link: &mut L,
        hooks: &mut H,
    ) {
        if let Err(e) = transmitter.start(response, link, hooks) {
            warn!("Response dropped: {}", e);
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &SlaveConfig {
        &self.config
    }

    /// Callable table
    pub fn registry(&self) -> &Registry<B> {
        &self.registry
    }

    /// Byte transport
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Byte transport, mutably
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Application board state
    pub fn board(&self) -> &B {
        &self.board
    }

    /// Application board state, mutably
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// Bus direction hooks
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Receive-side counters
    pub fn rx_stats(&self) -> RxStats {
        self.receiver.stats()
    }

    /// Receiver state
    pub fn rx_state(&self) -> RxState {
        self.receiver.state()
    }

    /// True while a response is going out
    pub fn is_transmitting(&self) -> bool {
        self.transmitter.is_busy()
    }

    /// Give back the transport, clock, board and hooks
    pub fn into_parts(self) -> (L, C, B, H) {
        (self.link, self.clock, self.board, self.hooks)
    }
}
