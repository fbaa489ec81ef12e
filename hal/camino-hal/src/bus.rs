//! Bus-direction hooks
//!
//! On half-duplex or shared lines (RS-485, single-wire) the slave must take
//! the bus before it answers and release it once the last byte has left.
//! Full-duplex links need none of this and use [`FullDuplex`].

/// Transmission hooks around each response
///
/// Every method defaults to a no-op.
pub trait TransmissionHooks {
    /// Called once when the engine starts
    fn init_transmissions(&mut self) {}

    /// Called before the first byte of a response is sent
    fn begin_transmission(&mut self) {}

    /// Called after the last byte of a response has been sent
    fn end_transmission(&mut self) {}
}

/// Hooks for a dedicated full-duplex line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FullDuplex;

impl TransmissionHooks for FullDuplex {}
