//! Camino Hardware Abstraction Layer
//!
//! This crate defines the hardware seams the protocol engine needs from its
//! environment. Chip support crates (or test mocks) implement them; the
//! engine itself never touches a register.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  camino-slave / camino-master           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  camino-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ MCU USART     │       │ host serial   │
//! │ + timer + IO  │       │ port          │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::SerialLink`] - Interrupt-driven byte transport (slave side)
//! - [`uart::UartTx`], [`uart::UartRx`] - Blocking serial (master side)
//! - [`time::Clock`] - Millisecond time source
//! - [`bus::TransmissionHooks`] - Bus-direction control on shared lines
//! - [`gpio::PinIo`] - Pin-numbered digital and analog I/O

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod gpio;
pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use bus::{FullDuplex, TransmissionHooks};
pub use gpio::{PinIo, PinMode};
pub use time::Clock;
pub use uart::{IoUart, SerialLink, UartConfig, UartRx, UartTx};
