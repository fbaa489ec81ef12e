//! Camino Serial Protocol
//!
//! This crate defines the byte-level protocol between a controller (the
//! master) and one or more microcontrollers (slaves) sharing a serial line.
//! The master invokes a numbered callable on one slave; the slave answers
//! with exactly one response frame.
//!
//! # Protocol Overview
//!
//! Command (master → slave):
//! ```text
//! ┌──────┬──────┬─────────┬─────────┬────────┬─────────────┬──────────┐
//! │ 0xAA │ 0x55 │ ADDRESS │ COMMAND │ LENGTH │ DATA        │ CHECKSUM │
//! │ 1B   │ 1B   │ 1B      │ 1B      │ 1B     │ 0–255B      │ 1B       │
//! └──────┴──────┴─────────┴─────────┴────────┴─────────────┴──────────┘
//! ```
//!
//! Responses (slave → master):
//! ```text
//! no data:  ┌──────┬──────┐
//!           │ 0xA9 │ 0xA9 │
//!           └──────┴──────┘
//! data:     ┌──────┬──────┬────────┬────────┬──────────┐
//!           │ 0xAC │ 0xAC │ LENGTH │ DATA   │ CHECKSUM │
//!           └──────┴──────┴────────┴────────┴──────────┘
//! resend:   ┌──────┬──────┐
//!           │ 0xB8 │ 0xB8 │
//!           └──────┴──────┘
//! ```
//!
//! Checksums are the 8-bit wrapping sum of every byte after the header.
//! "No data" and "empty data" are distinct: a callable that returns a
//! zero-length array still produces `AC AC 00 00`.

#![no_std]
#![deny(unsafe_code)]

pub mod builtin;
pub mod codec;
pub mod frame;
pub mod receiver;
pub mod response;

pub use codec::{ReturnValue, Returns};
pub use frame::{
    checksum, CommandFrame, FrameError, COMMAND_HEADER_1, COMMAND_HEADER_2, MAX_COMMAND_FRAME_SIZE,
    MAX_DATA_LENGTH, MAX_RESPONSE_FRAME_SIZE,
};
pub use receiver::{FrameReceiver, OversizePolicy, ReceivedFrame, RxEvent, RxState, RxStats};
pub use response::{Response, ResponseFrame, ResponseParser};
