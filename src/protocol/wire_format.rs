//! Wire format encoding and decoding.
//!
//! Implements the 10-byte packet header:
//! ```text
//! ┌──────────┬──────────┬──────────┬─────────────────┐
//! │ Magic    │ Type     │ Length   │ Payload         │
//! │ 4 bytes  │ 2 bytes  │ 4 bytes  │ `Length` bytes  │
//! │ uint32 BE│ uint16 BE│ uint32 BE│ type-specific   │
//! └──────────┴──────────┴──────────┴─────────────────┘
//! ```
//!
//! All multi-byte integers are Big Endian.

use crate::error::{Result, WireError};

/// Header size in bytes (fixed, exactly 10).
pub const HEADER_SIZE: usize = 10;

/// Sentinel opening every packet.
pub const HEADER_MAGIC: u32 = 0xAA55_AA55;

/// Largest payload a framer accepts before discarding the stream buffer.
pub const MAX_PAYLOAD_SIZE: u32 = 5_000_000;

/// Stream-fatal header defect found by [`Header::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeaderFault {
    /// First four bytes are not [`HEADER_MAGIC`].
    #[error("invalid magic 0x{magic:08X}")]
    BadMagic { magic: u32 },

    /// Declared payload length over the bound.
    #[error("payload length {length} exceeds maximum {max}")]
    Oversized { length: u32, max: u32 },
}

impl From<HeaderFault> for WireError {
    fn from(fault: HeaderFault) -> Self {
        match fault {
            HeaderFault::BadMagic { magic } => WireError::SyncLost { magic },
            HeaderFault::Oversized { length, max } => WireError::OversizedPacket { length, max },
        }
    }
}

/// Message kind carried in the header `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum PacketType {
    /// Batch of three-axis acceleration samples.
    ThreeAxis = 0x0001,
    /// Classifier result: class name and confidence.
    ModelOutput = 0x0002,
    /// Device state string.
    State = 0x0003,
}

impl PacketType {
    /// Wire tag for this type.
    #[inline]
    pub fn tag(self) -> u16 {
        self as u16
    }

    /// Map a wire tag back to a packet type.
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            0x0001 => Some(PacketType::ThreeAxis),
            0x0002 => Some(PacketType::ModelOutput),
            0x0003 => Some(PacketType::State),
            _ => None,
        }
    }
}

impl TryFrom<u16> for PacketType {
    type Error = WireError;

    fn try_from(tag: u16) -> Result<Self> {
        PacketType::from_tag(tag).ok_or(WireError::UnknownType(tag))
    }
}

/// Decoded header from wire format.
///
/// The type field is kept as the raw tag so that packets of unknown type can
/// still be framed and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Stream sentinel, `HEADER_MAGIC` on a synchronized stream.
    pub magic: u32,
    /// Raw packet type tag.
    pub packet_type: u16,
    /// Payload length in bytes.
    pub payload_length: u32,
}

impl Header {
    /// Create a header carrying the standard magic.
    pub fn new(packet_type: PacketType, payload_length: u32) -> Self {
        Self {
            magic: HEADER_MAGIC,
            packet_type: packet_type.tag(),
            payload_length,
        }
    }

    /// Encode header to bytes (Big Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use bearing_wire::protocol::{Header, PacketType};
    ///
    /// let bytes = Header::new(PacketType::State, 7).encode();
    /// assert_eq!(bytes, [0xAA, 0x55, 0xAA, 0x55, 0, 3, 0, 0, 0, 7]);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode header into an existing buffer.
    ///
    /// # Panics
    ///
    /// Panics if buffer is smaller than `HEADER_SIZE` (10 bytes).
    pub fn encode_into(&self, buf: &mut [u8]) {
        buf[0..4].copy_from_slice(&self.magic.to_be_bytes());
        buf[4..6].copy_from_slice(&self.packet_type.to_be_bytes());
        buf[6..10].copy_from_slice(&self.payload_length.to_be_bytes());
    }

    /// Decode header from bytes (Big Endian) without checking the magic.
    ///
    /// Returns `None` if buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            magic: u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]),
            packet_type: u16::from_be_bytes([buf[4], buf[5]]),
            payload_length: u32::from_be_bytes([buf[6], buf[7], buf[8], buf[9]]),
        })
    }

    /// Validate the header for stream integrity.
    ///
    /// Checks the magic first, then the payload bound. The type tag is not
    /// checked here: unknown types are framed and left to the dispatcher.
    pub fn validate(&self, max_payload_size: u32) -> std::result::Result<(), HeaderFault> {
        if self.magic != HEADER_MAGIC {
            return Err(HeaderFault::BadMagic { magic: self.magic });
        }

        if self.payload_length > max_payload_size {
            return Err(HeaderFault::Oversized {
                length: self.payload_length,
                max: max_payload_size,
            });
        }

        Ok(())
    }

    /// Known packet type, if the tag is recognized.
    #[inline]
    pub fn known_type(&self) -> Option<PacketType> {
        PacketType::from_tag(self.packet_type)
    }

    /// Total packet size on the wire (header + payload).
    #[inline]
    pub fn packet_size(&self) -> usize {
        HEADER_SIZE + self.payload_length as usize
    }
}
