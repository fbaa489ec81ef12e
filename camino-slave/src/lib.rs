//! Slave-side engine for the Camino serial protocol
//!
//! This crate turns a serial port into a remotely callable device:
//!
//! - Callable registry (built-ins plus application extensions)
//! - Dispatcher from command id to callable
//! - Byte-streaming transmit state machine
//! - [`Slave`], the session object driven by two event handlers
//!
//! There is no executor and no blocking anywhere. The platform calls
//! [`Slave::on_byte_received`] from its "byte received" interrupt and
//! [`Slave::on_tx_ready`] from its "transmit register empty" interrupt; the
//! two must never preempt each other.
//!
//! ```text
//!  byte ──▶ FrameReceiver ──▶ dispatch ──▶ Callable ──▶ Returns
//!                                                         │
//!  wire ◀── FrameTransmitter ◀── ResponseFrame ◀──────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod builtins;
pub mod config;
pub mod dispatch;
pub mod registry;
pub mod slave;
pub mod transmitter;

pub use config::{ConfigError, SlaveConfig, UnknownCommandPolicy, DEFAULT_MAX_DATA_LENGTH};
pub use registry::{Callable, Handler, Invocation, Registry, RegistryError};
pub use slave::Slave;
pub use transmitter::{FrameTransmitter, TxError};

pub use camino_protocol::OversizePolicy;
