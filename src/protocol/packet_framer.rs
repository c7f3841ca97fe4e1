//! Incremental packet framer for a byte stream.
//!
//! Uses `bytes::BytesMut` as the single per-connection receive buffer.
//! Implements a state machine over that buffer:
//! - `WaitingForHeader`: Need at least 10 bytes
//! - `WaitingForPayload`: Header validated, need the full payload
//!
//! The header stays in the buffer until the whole packet is present, so no
//! partial payload is ever exposed.
//!
//! # Example
//!
//! ```
//! use bearing_wire::codec::encode_state;
//! use bearing_wire::protocol::{FramerEvent, PacketFramer};
//!
//! let bytes = encode_state("Online").unwrap();
//! let mut framer = PacketFramer::new();
//!
//! let (head, tail) = bytes.split_at(4);
//! assert!(framer.feed(head).is_empty());
//! let events = framer.feed(tail);
//! assert!(matches!(events.as_slice(), [FramerEvent::Packet(_)]));
//! ```

use bytes::BytesMut;

use super::wire_format::{Header, HeaderFault, HEADER_SIZE, MAX_PAYLOAD_SIZE};
use super::Packet;

/// Initial receive buffer capacity; one ADC batch packet fits.
const INITIAL_CAPACITY: usize = 64 * 1024;

/// Outcome of feeding bytes to the framer, in stream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramerEvent {
    /// A complete packet.
    Packet(Packet),
    /// Bad magic; `discarded` buffered bytes were dropped.
    SyncLost { magic: u32, discarded: usize },
    /// Declared length over the bound; `discarded` buffered bytes were dropped.
    OversizedPacket { length: u32, discarded: usize },
}

impl FramerEvent {
    /// The packet carried by this event, if any.
    pub fn into_packet(self) -> Option<Packet> {
        match self {
            FramerEvent::Packet(packet) => Some(packet),
            _ => None,
        }
    }
}

/// State machine for packet parsing.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Waiting for a complete header (need 10 bytes).
    WaitingForHeader,
    /// Header validated and still buffered, waiting for payload bytes.
    WaitingForPayload { header: Header },
}

/// Buffer for accumulating stream bytes and extracting complete packets.
///
/// One framer serves exactly one connection. It is not `Sync`-shared:
/// callers drive `feed` from that connection's read path only.
#[derive(Debug)]
pub struct PacketFramer {
    /// Unconsumed bytes from stream reads.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Maximum allowed payload size.
    max_payload_size: u32,
}

impl PacketFramer {
    /// Create a framer with the default 5,000,000 byte payload bound.
    pub fn new() -> Self {
        Self::with_max_payload(MAX_PAYLOAD_SIZE)
    }

    /// Create a framer with a custom payload bound.
    pub fn with_max_payload(max_payload_size: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY),
            state: State::WaitingForHeader,
            max_payload_size,
        }
    }

    /// Append stream bytes and extract every complete packet.
    ///
    /// Returns the events produced by this call in arrival order: zero or
    /// more packets, possibly followed by a single `SyncLost` or
    /// `OversizedPacket` after which the buffer is empty.
    pub fn feed(&mut self, data: &[u8]) -> Vec<FramerEvent> {
        self.buffer.extend_from_slice(data);

        let mut events = Vec::new();

        loop {
            match self.try_extract_one() {
                Ok(Some(packet)) => events.push(FramerEvent::Packet(packet)),
                Ok(None) => break,
                Err(err) => {
                    events.push(self.discard(err));
                    break;
                }
            }
        }

        events
    }

    /// Try to extract a single packet from the buffer.
    ///
    /// Returns:
    /// - `Ok(Some(packet))` if a complete packet was extracted
    /// - `Ok(None)` if more data is needed
    /// - `Err(fault)` on bad magic or an oversized length
    fn try_extract_one(&mut self) -> Result<Option<Packet>, HeaderFault> {
        let header = match self.state {
            State::WaitingForHeader => {
                let header = match Header::decode(&self.buffer) {
                    Some(header) => header,
                    None => return Ok(None),
                };

                header.validate(self.max_payload_size)?;
                self.state = State::WaitingForPayload { header };
                header
            }
            State::WaitingForPayload { header } => header,
        };

        if self.buffer.len() < header.packet_size() {
            return Ok(None);
        }

        let _ = self.buffer.split_to(HEADER_SIZE);
        let payload = self
            .buffer
            .split_to(header.payload_length as usize)
            .freeze();
        self.state = State::WaitingForHeader;

        tracing::debug!(
            packet_type = header.packet_type,
            length = header.payload_length,
            "extracted packet"
        );

        Ok(Some(Packet::new(header.packet_type, payload)))
    }

    /// Drop everything buffered after a stream-fatal header.
    fn discard(&mut self, fault: HeaderFault) -> FramerEvent {
        let discarded = self.buffer.len();
        self.clear();

        match fault {
            HeaderFault::Oversized { length, max } => {
                tracing::warn!(length, max, discarded, "oversized packet, buffer discarded");
                FramerEvent::OversizedPacket { length, discarded }
            }
            HeaderFault::BadMagic { magic } => {
                tracing::warn!(magic, discarded, "stream sync lost, buffer discarded");
                FramerEvent::SyncLost { magic, discarded }
            }
        }
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Payload bound this framer enforces.
    pub fn max_payload_size(&self) -> u32 {
        self.max_payload_size
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForHeader;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match &self.state {
            State::WaitingForHeader => "WaitingForHeader",
            State::WaitingForPayload { .. } => "WaitingForPayload",
        }
    }
}

impl Default for PacketFramer {
    fn default() -> Self {
        Self::new()
    }
}
