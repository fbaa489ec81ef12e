//! Built-in callables
//!
//! Introspection (`num_calls`, `get_nth_call`), `echo`, and pass-through
//! pin I/O. A call whose payload is too short for its arguments does
//! nothing and answers with no data.

use camino_hal::{PinIo, PinMode};
use camino_protocol::builtin::{COUNT, NAMES};

use crate::registry::{Callable, Invocation};

/// The built-in table, in id order
pub fn table<B: PinIo>() -> [Callable<B>; COUNT] {
    [
        Callable::new(NAMES[0], num_calls::<B>),
        Callable::new(NAMES[1], get_nth_call::<B>),
        Callable::new(NAMES[2], echo::<B>),
        Callable::new(NAMES[3], pin_mode::<B>),
        Callable::new(NAMES[4], digital_write::<B>),
        Callable::new(NAMES[5], digital_read::<B>),
        Callable::new(NAMES[6], analog_read::<B>),
        Callable::new(NAMES[7], analog_write::<B>),
    ]
}

/// Returns the total callable count as one byte
fn num_calls<B>(inv: &mut Invocation<'_, B>) {
    let count = inv.callable_count() as u8;
    inv.returns(count);
}

/// `[n]` → name of callable `n`
fn get_nth_call<B>(inv: &mut Invocation<'_, B>) {
    let Some(&nth) = inv.payload().first() else {
        return;
    };
    if let Some(name) = inv.callable_name(nth) {
        inv.returns_str(name);
    }
}

fn echo<B>(inv: &mut Invocation<'_, B>) {
    let payload = inv.payload();
    inv.returns_bytes(payload);
}

/// `[pin, mode]`
fn pin_mode<B: PinIo>(inv: &mut Invocation<'_, B>) {
    let &[pin, mode, ..] = inv.payload() else {
        return;
    };
    if let Some(mode) = PinMode::from_byte(mode) {
        inv.board().pin_mode(pin, mode);
    }
}

/// `[pin, level]`, any nonzero level drives high
fn digital_write<B: PinIo>(inv: &mut Invocation<'_, B>) {
    let &[pin, level, ..] = inv.payload() else {
        return;
    };
    inv.board().digital_write(pin, level != 0);
}

/// `[pin]` → `u8` 0 or 1
fn digital_read<B: PinIo>(inv: &mut Invocation<'_, B>) {
    let &[pin, ..] = inv.payload() else {
        return;
    };
    let high = inv.board().digital_read(pin);
    inv.returns(u8::from(high));
}

/// `[pin]` → `i16`
fn analog_read<B: PinIo>(inv: &mut Invocation<'_, B>) {
    let &[pin, ..] = inv.payload() else {
        return;
    };
    let value = inv.board().analog_read(pin);
    inv.returns(value);
}

/// `[pin, duty]`
fn analog_write<B: PinIo>(inv: &mut Invocation<'_, B>) {
    let &[pin, duty, ..] = inv.payload() else {
        return;
    };
    inv.board().analog_write(pin, duty);
}
