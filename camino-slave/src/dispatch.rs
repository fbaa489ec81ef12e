//! Command dispatch
//!
//! Maps a received frame's command id onto the registry and runs the
//! selected callable against the staging buffer.

use camino_protocol::{ReceivedFrame, ResponseFrame};

use crate::registry::{Invocation, Registry};

/// Run the callable selected by `frame`
///
/// Returns the response the callable produced, borrowing `staging`, or
/// `None` when the command id has no callable. Every borrow is held until
/// the response is dropped.
pub fn dispatch<'a, B>(
    registry: &'a Registry<B>,
    frame: &ReceivedFrame<'a>,
    board: &'a mut B,
    staging: &'a mut [u8],
) -> Option<ResponseFrame<'a>> {
    let Some(callable) = registry.get(frame.command) else {
        warn!("No callable for command {=u8}", frame.command);
        return None;
    };

    debug!(
        "Dispatch {=u8} ({=str}), {=usize} payload bytes",
        frame.command,
        callable.short_name,
        frame.payload.len()
    );

    let mut invocation = Invocation::new(
        frame.command,
        frame.data_length,
        frame.payload,
        board,
        registry.as_slice(),
        staging,
    );
    (callable.handler)(&mut invocation);
    Some(invocation.into_response())
}
