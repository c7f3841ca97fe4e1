//! Packet dispatcher: maps a framed packet to its payload decoder.
//!
//! A malformed payload drops only its own packet. The outer length was
//! already authoritative, so the framer stays aligned and nothing needs to
//! be resynchronized.

use super::message::{DecodedMessage, ModelOutput, ThreeAxisBatch};
use crate::codec::{PayloadReader, TRIPLE_SIZE};
use crate::error::{Result, WireError};
use crate::protocol::{Packet, PacketType};

/// Decode a three-axis payload: `u32 count` then `count` `(x, y, z)` triples.
///
/// The count must be non-zero and account for the payload exactly.
pub fn decode_three_axis(payload: &[u8]) -> Result<ThreeAxisBatch> {
    let mut reader = PayloadReader::new(payload);
    let count = reader.read_u32()? as usize;
    if count == 0 {
        return Err(WireError::EmptyBatch);
    }

    let needed = count.saturating_mul(TRIPLE_SIZE);
    if reader.remaining() < needed {
        return Err(WireError::ShortPayload {
            needed,
            available: reader.remaining(),
        });
    }

    let mut batch = ThreeAxisBatch {
        x: Vec::with_capacity(count),
        y: Vec::with_capacity(count),
        z: Vec::with_capacity(count),
    };
    for _ in 0..count {
        batch.x.push(reader.read_f64()?);
        batch.y.push(reader.read_f64()?);
        batch.z.push(reader.read_f64()?);
    }

    reader.finish()?;
    Ok(batch)
}

/// Decode a model output payload: length-prefixed class name, `f64` confidence.
pub fn decode_model_output(payload: &[u8]) -> Result<ModelOutput> {
    let mut reader = PayloadReader::new(payload);
    let class_name = reader.read_string()?;
    let confidence = reader.read_f64()?;
    reader.finish()?;

    Ok(ModelOutput {
        class_name,
        confidence,
    })
}

/// Decode a state payload: one length-prefixed string.
pub fn decode_state(payload: &[u8]) -> Result<String> {
    let mut reader = PayloadReader::new(payload);
    let text = reader.read_string()?;
    reader.finish()?;
    Ok(text)
}

/// Turns packets into typed messages, counting what it drops.
#[derive(Debug, Default)]
pub struct MessageDispatcher {
    dispatched: u64,
    dropped: u64,
}

impl MessageDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one packet.
    ///
    /// Returns the reason on failure; the caller drops the packet and keeps
    /// reading.
    pub fn dispatch(&mut self, packet: &Packet) -> Result<DecodedMessage> {
        let result = Self::decode(packet);

        match &result {
            Ok(_) => self.dispatched += 1,
            Err(err) => {
                self.dropped += 1;
                tracing::warn!(
                    packet_type = packet.packet_type,
                    length = packet.payload_len(),
                    error = %err,
                    "dropping packet"
                );
            }
        }

        result
    }

    /// Stateless decode of a single packet.
    pub fn decode(packet: &Packet) -> Result<DecodedMessage> {
        let packet_type = PacketType::try_from(packet.packet_type)?;
        let payload = packet.payload();

        match packet_type {
            PacketType::ThreeAxis => decode_three_axis(payload).map(DecodedMessage::ThreeAxis),
            PacketType::ModelOutput => {
                decode_model_output(payload).map(DecodedMessage::ModelOutput)
            }
            PacketType::State => decode_state(payload).map(DecodedMessage::State),
        }
    }

    /// Packets decoded successfully so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Packets dropped so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_model_output, encode_state, encode_three_axis};
    use crate::protocol::{build_packet, PacketFramer, HEADER_SIZE};
    use bytes::Bytes;

    fn packet_of(bytes: &[u8]) -> Packet {
        let mut framer = PacketFramer::new();
        framer
            .feed(bytes)
            .into_iter()
            .next()
            .and_then(|e| e.into_packet())
            .unwrap()
    }

    #[test]
    fn test_three_axis_roundtrip() {
        let x = vec![0.25, -1.5, 4.0];
        let y = vec![1.0, 2.0, 3.0];
        let z = vec![-0.0, f64::MAX, f64::MIN_POSITIVE];
        let packet = packet_of(&encode_three_axis(&x, &y, &z).unwrap());

        let msg = MessageDispatcher::decode(&packet).unwrap();
        assert_eq!(msg, DecodedMessage::ThreeAxis(ThreeAxisBatch::new(x, y, z)));
    }

    #[test]
    fn test_model_output_roundtrip() {
        let packet = packet_of(&encode_model_output("Outer race 1.3", 88.25).unwrap());
        let msg = MessageDispatcher::decode(&packet).unwrap();
        assert_eq!(
            msg,
            DecodedMessage::ModelOutput(ModelOutput::new("Outer race 1.3", 88.25))
        );
    }

    #[test]
    fn test_state_roundtrip() {
        let packet = packet_of(&encode_state("Mode: Monitoring").unwrap());
        let msg = MessageDispatcher::decode(&packet).unwrap();
        assert_eq!(msg, DecodedMessage::State("Mode: Monitoring".to_string()));
    }

    #[test]
    fn test_zero_count_is_dropped() {
        let packet = Packet::new(1, Bytes::from_static(&[0, 0, 0, 0]));

        let err = MessageDispatcher::decode(&packet).unwrap_err();
        assert!(matches!(err, WireError::EmptyBatch));
        assert!(!err.is_stream_fatal());

        let mut dispatcher = MessageDispatcher::new();
        assert!(dispatcher.dispatch(&packet).is_err());
        assert_eq!(dispatcher.dropped(), 1);
    }

    #[test]
    fn test_count_claims_more_triples_than_payload() {
        let mut payload = vec![0, 0, 0, 3];
        payload.extend_from_slice(&[0u8; 24]);
        let packet = Packet::new(1, Bytes::from(payload));

        let err = MessageDispatcher::decode(&packet).unwrap_err();
        assert!(matches!(
            err,
            WireError::ShortPayload {
                needed: 72,
                available: 24
            }
        ));
    }

    #[test]
    fn test_huge_count_does_not_allocate() {
        let packet = Packet::new(1, Bytes::from_static(&[0xFF, 0xFF, 0xFF, 0xFF]));
        assert!(matches!(
            MessageDispatcher::decode(&packet),
            Err(WireError::ShortPayload { available: 0, .. })
        ));
    }

    #[test]
    fn test_count_smaller_than_payload() {
        let mut payload = vec![0, 0, 0, 1];
        payload.extend_from_slice(&[0u8; 48]);
        let packet = Packet::new(1, Bytes::from(payload));

        assert!(matches!(
            MessageDispatcher::decode(&packet),
            Err(WireError::TrailingBytes { count: 24 })
        ));
    }

    #[test]
    fn test_missing_count_field() {
        let packet = Packet::new(1, Bytes::from_static(&[0, 0]));
        assert!(matches!(
            MessageDispatcher::decode(&packet),
            Err(WireError::ShortPayload {
                needed: 4,
                available: 2
            })
        ));
    }

    #[test]
    fn test_model_output_missing_confidence() {
        let mut payload = vec![0, 0, 0, 2];
        payload.extend_from_slice(b"ok");
        let packet = Packet::new(2, Bytes::from(payload));

        assert!(matches!(
            MessageDispatcher::decode(&packet),
            Err(WireError::ShortPayload { needed: 8, .. })
        ));
    }

    #[test]
    fn test_unknown_type() {
        let packet = Packet::new(7, Bytes::from_static(b"whatever"));
        assert!(matches!(
            MessageDispatcher::decode(&packet),
            Err(WireError::UnknownType(7))
        ));
    }

    #[test]
    fn test_dispatcher_counts_and_continues() {
        let mut dispatcher = MessageDispatcher::new();
        let mut framer = PacketFramer::new();

        let mut stream = build_packet(9, b"junk").to_vec();
        stream.extend_from_slice(&build_packet(1, &[0, 0, 0, 5]));
        stream.extend_from_slice(&encode_state("still here").unwrap());

        let results: Vec<_> = framer
            .feed(&stream)
            .into_iter()
            .filter_map(|e| e.into_packet())
            .map(|p| dispatcher.dispatch(&p))
            .collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_err());
        assert!(results[1].is_err());
        assert_eq!(
            results[2].as_ref().unwrap(),
            &DecodedMessage::State("still here".to_string())
        );
        assert_eq!(dispatcher.dropped(), 2);
        assert_eq!(dispatcher.dispatched(), 1);
        assert!(framer.is_empty());
    }

    #[test]
    fn test_message_encode_matches_encoder() {
        let msg = DecodedMessage::State("Idle".to_string());
        assert_eq!(msg.packet_type(), PacketType::State);
        assert_eq!(msg.encode().unwrap(), encode_state("Idle").unwrap());
        assert_eq!(msg.encode().unwrap().len(), HEADER_SIZE + 8);
    }
}
