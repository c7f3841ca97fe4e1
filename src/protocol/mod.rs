//! Protocol module - wire format, framing, and packet types.
//!
//! This module implements the stream side of the link:
//! - 10-byte header encoding/decoding
//! - Packet framer for accumulating partial reads
//! - Packet struct with typed accessors

mod packet;
mod packet_framer;
mod wire_format;

pub use packet::{build_packet, Packet};
pub use packet_framer::{FramerEvent, PacketFramer};
pub use wire_format::{
    Header, HeaderFault, PacketType, HEADER_MAGIC, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
