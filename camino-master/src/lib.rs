//! Master-side client for the Camino serial protocol
//!
//! [`Master`] sends command frames to one slave address over a blocking
//! UART and waits for the matching response, resending on request. It can
//! discover the slave's callable table and call entries by name.
//!
//! ```text
//!  call(cmd, payload) ──▶ CommandFrame ──▶ UartTx
//!                                             │
//!  Reply ◀── ResponseParser ◀── UartRx ◀──────┘
//!    ▲            │
//!    └─ resend ◀──┘  (B8 B8, up to max_retries)
//! ```

#![no_std]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod master;

pub use master::{Master, MasterError, Reply, DEFAULT_MAX_RETRIES};
