//! Packet struct with typed accessors.
//!
//! A packet is the unit the framer hands out: the header's type tag plus the
//! complete payload. Uses `bytes::Bytes` so the payload is split off the
//! receive buffer without copying.

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{Header, PacketType, HEADER_SIZE};

/// A complete packet extracted from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Raw type tag (may be unknown to this build).
    pub packet_type: u16,
    /// Payload bytes, exactly as long as the header declared.
    pub payload: Bytes,
}

impl Packet {
    /// Create a packet from a type tag and payload.
    pub fn new(packet_type: u16, payload: Bytes) -> Self {
        Self {
            packet_type,
            payload,
        }
    }

    /// Known packet type, if the tag is recognized.
    #[inline]
    pub fn known_type(&self) -> Option<PacketType> {
        PacketType::from_tag(self.packet_type)
    }

    /// Payload bytes, header excluded.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Header describing this packet on the wire.
    pub fn header(&self) -> Header {
        Header {
            magic: super::wire_format::HEADER_MAGIC,
            packet_type: self.packet_type,
            payload_length: self.payload.len() as u32,
        }
    }

    /// Serialize header and payload into one contiguous buffer.
    pub fn to_bytes(&self) -> Bytes {
        build_packet(self.packet_type, &self.payload)
    }
}

/// Build a complete packet (header + payload) as a single buffer.
///
/// The caller is responsible for keeping `payload` within the framer bound;
/// the encoders in [`crate::codec`] enforce it.
///
/// # Example
///
/// ```
/// use bearing_wire::protocol::{build_packet, PacketType, HEADER_SIZE};
///
/// let bytes = build_packet(PacketType::State.tag(), b"hello");
/// assert_eq!(bytes.len(), HEADER_SIZE + 5);
/// ```
pub fn build_packet(packet_type: u16, payload: &[u8]) -> Bytes {
    let header = Header {
        magic: super::wire_format::HEADER_MAGIC,
        packet_type,
        payload_length: payload.len() as u32,
    };
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_slice(&header.encode());
    buf.put_slice(payload);
    buf.freeze()
}
