//! Callable registry
//!
//! One ordered table of named handlers. The built-ins occupy ids
//! `0..builtin::COUNT`; application extensions follow in the order they
//! were supplied. Command ids index the table directly.

use core::fmt;

use camino_protocol::builtin::{self, MAX_CALLABLES};
use camino_protocol::{ResponseFrame, ReturnValue, Returns};
use heapless::Vec;

use camino_hal::PinIo;

use crate::builtins;

/// Handler signature shared by built-in and extension callables
pub type Handler<B> = fn(&mut Invocation<'_, B>);

/// A named, invocable operation
pub struct Callable<B> {
    /// Name reported to the master during discovery
    pub short_name: &'static str,
    /// Code run when the callable's id is received
    pub handler: Handler<B>,
}

impl<B> Callable<B> {
    /// Create a callable
    pub const fn new(short_name: &'static str, handler: Handler<B>) -> Self {
        Self {
            short_name,
            handler,
        }
    }
}

// Manual impls: a derive would demand `B: Clone`
impl<B> Clone for Callable<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for Callable<B> {}

impl<B> fmt::Debug for Callable<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callable").field(&self.short_name).finish()
    }
}

/// Registry construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Built-ins plus extensions exceed the table capacity
    TooManyCallables {
        /// Number of callables requested
        requested: usize,
    },
}

/// One call of one callable
///
/// Gives the handler its arguments, the application's board, read access to
/// the callable table, and the response writer. Borrows everything for the
/// duration of the call only.
pub struct Invocation<'a, B> {
    command: u8,
    data_length: u8,
    payload: &'a [u8],
    board: &'a mut B,
    callables: &'a [Callable<B>],
    returns: Returns<'a>,
}

impl<'a, B> Invocation<'a, B> {
    /// Set up a call; `staging` receives whatever the handler returns
    pub fn new(
        command: u8,
        data_length: u8,
        payload: &'a [u8],
        board: &'a mut B,
        callables: &'a [Callable<B>],
        staging: &'a mut [u8],
    ) -> Self {
        Self {
            command,
            data_length,
            payload,
            board,
            callables,
            returns: Returns::new(staging),
        }
    }

    /// Command id that selected this callable
    pub fn command(&self) -> u8 {
        self.command
    }

    /// Payload length as declared by the master
    pub fn data_length(&self) -> u8 {
        self.data_length
    }

    /// Payload bytes
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// The application's board
    pub fn board(&mut self) -> &mut B {
        &mut *self.board
    }

    /// Total number of callables, built-in plus extension
    pub fn callable_count(&self) -> usize {
        self.callables.len()
    }

    /// Short name of callable `id`
    pub fn callable_name(&self, id: u8) -> Option<&'static str> {
        self.callables.get(id as usize).map(|c| c.short_name)
    }

    /// Return a raw byte array
    pub fn returns_bytes(&mut self, data: &[u8]) {
        self.returns.bytes(data);
    }

    /// Return a string
    pub fn returns_str(&mut self, s: &str) {
        self.returns.str(s);
    }

    /// Return a little-endian value
    pub fn returns<T: ReturnValue>(&mut self, value: T) {
        self.returns.value(value);
    }

    /// True once the handler has returned something
    pub fn has_returned(&self) -> bool {
        self.returns.has_data()
    }

    /// Finish the call, yielding the response it describes
    pub fn into_response(self) -> ResponseFrame<'a> {
        self.returns.into_response()
    }
}

/// Ordered table of callables
pub struct Registry<B> {
    callables: Vec<Callable<B>, MAX_CALLABLES>,
}

impl<B: PinIo> Default for Registry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: PinIo> Registry<B> {
    /// Registry holding only the built-ins
    pub fn new() -> Self {
        let mut callables = Vec::new();
        for callable in builtins::table::<B>() {
            // Capacity is well above the built-in count
            let _ = callables.push(callable);
        }
        Self { callables }
    }

    /// Registry holding the built-ins followed by `extensions`
    pub fn with_extensions(extensions: &[Callable<B>]) -> Result<Self, RegistryError> {
        let requested = builtin::COUNT + extensions.len();
        if requested > MAX_CALLABLES {
            return Err(RegistryError::TooManyCallables { requested });
        }
        let mut registry = Self::new();
        for callable in extensions {
            registry
                .callables
                .push(*callable)
                .map_err(|_| RegistryError::TooManyCallables { requested })?;
        }
        Ok(registry)
    }
}

impl<B> Registry<B> {
    /// Number of callables
    pub fn len(&self) -> usize {
        self.callables.len()
    }

    /// True if the table holds no callables
    pub fn is_empty(&self) -> bool {
        self.callables.is_empty()
    }

    /// Number of built-in callables at the front of the table
    pub fn builtin_count(&self) -> usize {
        builtin::COUNT
    }

    /// Callable for a command id, if in range
    pub fn get(&self, id: u8) -> Option<&Callable<B>> {
        self.callables.get(id as usize)
    }

    /// Short name for a command id
    pub fn name(&self, id: u8) -> Option<&'static str> {
        self.get(id).map(|c| c.short_name)
    }

    /// Id of the first callable named `name`
    pub fn find(&self, name: &str) -> Option<u8> {
        self.callables
            .iter()
            .position(|c| c.short_name == name)
            .map(|i| i as u8)
    }

    /// All callables in id order
    pub fn as_slice(&self) -> &[Callable<B>] {
        &self.callables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_hal::PinMode;

    struct NoPins;

    impl PinIo for NoPins {
        fn pin_mode(&mut self, _pin: u8, _mode: PinMode) {}
        fn digital_write(&mut self, _pin: u8, _high: bool) {}
        fn digital_read(&mut self, _pin: u8) -> bool {
            false
        }
        fn analog_read(&mut self, _pin: u8) -> i16 {
            0
        }
        fn analog_write(&mut self, _pin: u8, _duty: u8) {}
    }

    fn reset(_: &mut Invocation<'_, NoPins>) {}

    fn version(inv: &mut Invocation<'_, NoPins>) {
        inv.returns(3u16);
    }

    #[test]
    fn test_builtins_first_in_fixed_order() {
        let registry = Registry::<NoPins>::new();
        assert_eq!(registry.len(), builtin::COUNT);
        for (id, name) in builtin::NAMES.iter().enumerate() {
            assert_eq!(registry.name(id as u8), Some(*name));
        }
    }

    #[test]
    fn test_extensions_follow_builtins() {
        let extensions: [Callable<NoPins>; 2] =
            [Callable::new("reset", reset), Callable::new("version", version)];
        let registry = Registry::with_extensions(&extensions).unwrap();
        assert_eq!(registry.len(), builtin::COUNT + 2);
        assert_eq!(registry.find("reset"), Some(builtin::COUNT as u8));
        assert_eq!(registry.find("version"), Some(builtin::COUNT as u8 + 1));
        assert!(registry.get(builtin::COUNT as u8 + 2).is_none());
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let extensions: [Callable<NoPins>; 1] = [Callable::new("echo", reset)];
        let registry = Registry::with_extensions(&extensions).unwrap();
        assert_eq!(registry.find("echo"), Some(builtin::ECHO));
        assert_eq!(registry.name(builtin::COUNT as u8), Some("echo"));
    }

    #[test]
    fn test_too_many_extensions() {
        let extensions: [Callable<NoPins>; MAX_CALLABLES] = [Callable::new("x", reset); MAX_CALLABLES];
        let result = Registry::with_extensions(&extensions);
        assert!(matches!(
            result,
            Err(RegistryError::TooManyCallables { requested }) if requested == MAX_CALLABLES + builtin::COUNT
        ));
    }

    #[test]
    fn test_invocation_accessors() {
        let registry = Registry::<NoPins>::new();
        let mut board = NoPins;
        let mut staging = [0u8; 8];
        let mut inv = Invocation::new(
            builtin::ECHO,
            3,
            &[1, 2, 3],
            &mut board,
            registry.as_slice(),
            &mut staging,
        );
        assert_eq!(inv.command(), builtin::ECHO);
        assert_eq!(inv.data_length(), 3);
        assert_eq!(inv.payload(), &[1, 2, 3]);
        assert_eq!(inv.callable_count(), builtin::COUNT);
        assert_eq!(inv.callable_name(0), Some("num_calls"));
        assert!(!inv.has_returned());
        inv.returns_str("ok");
        assert!(inv.has_returned());
        assert_eq!(inv.into_response(), ResponseFrame::WithData(b"ok"));
    }
}
