//! Error types for bearing-wire.

use thiserror::Error;

use crate::acquisition::Marker;

/// Errors raised by the stream side: framing, payload decoding, encoding
/// and connection I/O.
#[derive(Debug, Error)]
pub enum WireError {
    /// Header magic did not match; the receive buffer was discarded.
    #[error("Stream sync lost: bad magic 0x{magic:08X}")]
    SyncLost { magic: u32 },

    /// Declared payload length exceeds the safety bound.
    #[error("Payload size {length} exceeds maximum {max}")]
    OversizedPacket { length: u32, max: u32 },

    /// Payload ended before its declared fields.
    #[error("Short payload: needed {needed} bytes, {available} available")]
    ShortPayload { needed: usize, available: usize },

    /// A three-axis payload declared zero samples.
    #[error("Three-axis batch declares no samples")]
    EmptyBatch,

    /// Bytes left over after the declared fields.
    #[error("{count} trailing bytes after payload fields")]
    TrailingBytes { count: usize },

    /// Packet type tag is not one of the known message kinds.
    #[error("Unknown packet type: {0}")]
    UnknownType(u16),

    /// A length-prefixed string was not valid UTF-8.
    #[error("Invalid UTF-8 in string field")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Axis vectors handed to the encoder differ in length or are empty.
    #[error("Axis size mismatch: x={x}, y={y}, z={z}")]
    SizeMismatch { x: usize, y: usize, z: usize },

    /// The transport accepted fewer bytes than the packet holds.
    #[error("Incomplete write: {written} of {expected} bytes")]
    IncompleteWrite { written: usize, expected: usize },

    /// I/O error on the stream connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Outbound queue is full.
    #[error("Writer queue full")]
    Backpressure,
}

impl WireError {
    /// True for errors that discard the whole receive buffer rather than a
    /// single packet.
    pub fn is_stream_fatal(&self) -> bool {
        matches!(
            self,
            WireError::SyncLost { .. } | WireError::OversizedPacket { .. }
        )
    }
}

/// Errors raised by one ADC burst acquisition.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The set-sampling transaction did not answer with the end marker.
    #[error("Setup check failed: response {response:02X?}")]
    SetupCheckFailed { response: [u8; 2] },

    /// A marker in the returned frame was not where it belongs.
    #[error("Frame sync error at {marker:?} marker: found {found:02X?}")]
    FrameSyncError { marker: Marker, found: [u8; 2] },

    /// The transport returned a frame of the wrong size.
    #[error("Frame length {actual}, expected {expected}")]
    FrameLength { expected: usize, actual: usize },

    /// The bus transport failed.
    #[error("Bus transport error: {0}")]
    Transport(#[from] std::io::Error),
}

/// Result type alias using WireError.
pub type Result<T> = std::result::Result<T, WireError>;
