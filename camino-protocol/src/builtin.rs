//! Built-in callable table
//!
//! Every slave exposes these at fixed ids, ahead of its own extensions.
//! The master relies on `NUM_CALLS` and `GET_NTH_CALL` to discover the
//! rest of the table.

/// Number of callables (built-in plus extension); returns `u8`
pub const NUM_CALLS: u8 = 0;
/// Name of callable `[n]`; returns its name as bytes
pub const GET_NTH_CALL: u8 = 1;
/// Returns its payload unchanged
pub const ECHO: u8 = 2;
/// `[pin, mode]`; no data
pub const PIN_MODE: u8 = 3;
/// `[pin, level]`; no data
pub const DIGITAL_WRITE: u8 = 4;
/// `[pin]`; returns `u8` 0 or 1
pub const DIGITAL_READ: u8 = 5;
/// `[pin]`; returns `i16`
pub const ANALOG_READ: u8 = 6;
/// `[pin, duty]`; no data
pub const ANALOG_WRITE: u8 = 7;

/// Short names, indexed by id
pub const NAMES: [&str; 8] = [
    "num_calls",
    "get_nth_call",
    "echo",
    "pin_mode",
    "digital_write",
    "digital_read",
    "analog_read",
    "analog_write",
];

/// Number of built-in callables
pub const COUNT: usize = NAMES.len();

/// Upper bound on the combined callable table
pub const MAX_CALLABLES: usize = 64;

/// Upper bound on a callable's short name
pub const MAX_NAME_LEN: usize = 32;
