//! Slave configuration
//!
//! Fixed for the lifetime of the engine. With the `serde` feature the
//! configuration can be stored as postcard binary data.

use camino_hal::UartConfig;
use camino_protocol::OversizePolicy;

/// Default payload buffer capacity
pub const DEFAULT_MAX_DATA_LENGTH: usize = 64;

/// Default time a partial command frame may take before it is abandoned
pub const DEFAULT_COMMAND_TIMEOUT_MS: u32 = 100;

/// Bytes of framing around a command payload
const COMMAND_OVERHEAD: u32 = 6;

/// What to answer when the command id is outside the callable table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnknownCommandPolicy {
    /// Reply `A9 A9` so the master does not sit out its timeout
    #[default]
    NoData,
    /// Send nothing
    Silent,
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The command timeout is zero
    ZeroTimeout,
    /// The command timeout is shorter than a full frame takes on the wire
    TimeoutTooShort {
        /// Smallest workable timeout at the configured baud rate
        min_ms: u32,
    },
    /// Serialized form does not fit the buffer
    Encode,
    /// Stored bytes are not a valid configuration
    Decode,
}

/// Slave engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlaveConfig {
    /// Address this slave answers to (0-255)
    pub address: u8,
    /// Partial frames older than this are dropped (ms from first preamble byte)
    pub command_timeout_ms: u32,
    /// Handling of declared lengths above the payload buffer
    pub oversize: OversizePolicy,
    /// Handling of command ids outside the callable table
    pub unknown_command: UnknownCommandPolicy,
    /// Serial line settings, used by the platform when opening the port
    pub uart: UartConfig,
}

impl Default for SlaveConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SlaveConfig {
    /// Defaults for a slave at `address`
    pub const fn new(address: u8) -> Self {
        Self {
            address,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            oversize: OversizePolicy::Reject,
            unknown_command: UnknownCommandPolicy::NoData,
            uart: UartConfig::new(115200),
        }
    }

    /// Set the baud rate
    pub const fn with_baudrate(mut self, baudrate: u32) -> Self {
        self.uart = UartConfig::new(baudrate);
        self
    }

    /// Set the command timeout
    pub const fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.command_timeout_ms = timeout_ms;
        self
    }

    /// Set the oversize policy
    pub const fn with_oversize(mut self, policy: OversizePolicy) -> Self {
        self.oversize = policy;
        self
    }

    /// Set the unknown-command policy
    pub const fn with_unknown_command(mut self, policy: UnknownCommandPolicy) -> Self {
        self.unknown_command = policy;
        self
    }

    /// Time a full command frame with a `max_data_length` payload spends
    /// on the wire, rounded up to whole milliseconds
    pub fn frame_time_ms(&self, max_data_length: usize) -> u32 {
        let chars = COMMAND_OVERHEAD + max_data_length.min(255) as u32;
        (chars * self.uart.char_time_us()).div_ceil(1000)
    }

    /// Check the configuration against a payload capacity
    pub fn validate(&self, max_data_length: usize) -> Result<(), ConfigError> {
        if self.command_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let min_ms = self.frame_time_ms(max_data_length);
        if self.command_timeout_ms < min_ms {
            return Err(ConfigError::TimeoutTooShort { min_ms });
        }
        Ok(())
    }

    /// Serialize to postcard bytes, returning the used prefix of `buf`
    #[cfg(feature = "serde")]
    pub fn to_bytes<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Encode)
    }

    /// Deserialize from postcard bytes
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        postcard::from_bytes(bytes).map_err(|_| ConfigError::Decode)
    }
}
