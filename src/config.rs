//! Link configuration.
//!
//! Every field has a default; a settings file only needs the values it
//! overrides.
//!
//! # Example
//!
//! ```
//! use bearing_wire::config::LinkConfig;
//!
//! let config = LinkConfig::from_json(r#"{ "stream": { "channel_capacity": 8 } }"#).unwrap();
//! assert_eq!(config.stream.channel_capacity, 8);
//! assert_eq!(config.stream.max_payload_size, 5_000_000);
//! assert_eq!(config.acquisition.device_id, 0x16);
//! ```

use serde::{Deserialize, Serialize};

use crate::acquisition::DEFAULT_DEVICE_ID;
use crate::error::Result;
use crate::protocol::MAX_PAYLOAD_SIZE;

/// Default read buffer size for the stream reader (64 KiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Default capacity of the reader and writer channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Stream connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Largest accepted payload; larger headers discard the buffer.
    pub max_payload_size: u32,
    /// Bytes requested per socket read.
    pub read_buffer_size: usize,
    /// Queue depth between the I/O tasks and their users.
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD_SIZE,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Bus acquisition settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Identifier sent as the first command byte.
    pub device_id: u8,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            device_id: DEFAULT_DEVICE_ID,
        }
    }
}

/// Complete link configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub stream: StreamConfig,
    pub acquisition: AcquisitionConfig,
}

impl LinkConfig {
    /// Parse a JSON settings document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
