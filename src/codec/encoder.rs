//! Packet encoders for the three application message kinds.
//!
//! Each function returns a complete packet (header + payload) ready to be
//! written to the stream. Encoding is pure; short writes are the caller's
//! concern.

use bytes::Bytes;

use super::payload::PayloadWriter;
use crate::error::{Result, WireError};
use crate::protocol::{build_packet, PacketType, MAX_PAYLOAD_SIZE};

/// Bytes per `(x, y, z)` sample triple.
pub const TRIPLE_SIZE: usize = 3 * 8;

/// Encode a three-axis sample batch.
///
/// Fails with `SizeMismatch` if the axes differ in length or are empty.
///
/// # Example
///
/// ```
/// use bearing_wire::codec::encode_three_axis;
///
/// let packet = encode_three_axis(&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]).unwrap();
/// // header + count + two triples
/// assert_eq!(packet.len(), 10 + 4 + 2 * 24);
/// ```
pub fn encode_three_axis(x: &[f64], y: &[f64], z: &[f64]) -> Result<Bytes> {
    if x.is_empty() || x.len() != y.len() || x.len() != z.len() {
        return Err(WireError::SizeMismatch {
            x: x.len(),
            y: y.len(),
            z: z.len(),
        });
    }

    let payload_len = 4 + x.len() * TRIPLE_SIZE;
    check_payload_len(payload_len)?;

    let mut writer = PayloadWriter::with_capacity(payload_len);
    writer.put_u32(x.len() as u32);
    for ((x, y), z) in x.iter().zip(y).zip(z) {
        writer.put_f64(*x);
        writer.put_f64(*y);
        writer.put_f64(*z);
    }

    finish(PacketType::ThreeAxis, writer)
}

/// Encode a classifier result: class name, then confidence.
pub fn encode_model_output(class_name: &str, confidence: f64) -> Result<Bytes> {
    let mut writer = PayloadWriter::with_capacity(4 + class_name.len() + 8);
    writer.put_string(class_name)?;
    writer.put_f64(confidence);

    finish(PacketType::ModelOutput, writer)
}

/// Encode a device state string.
pub fn encode_state(text: &str) -> Result<Bytes> {
    let mut writer = PayloadWriter::with_capacity(4 + text.len());
    writer.put_string(text)?;

    finish(PacketType::State, writer)
}

fn check_payload_len(len: usize) -> Result<()> {
    if len > MAX_PAYLOAD_SIZE as usize {
        return Err(WireError::OversizedPacket {
            length: u32::try_from(len).unwrap_or(u32::MAX),
            max: MAX_PAYLOAD_SIZE,
        });
    }
    Ok(())
}

fn finish(packet_type: PacketType, writer: PayloadWriter) -> Result<Bytes> {
    check_payload_len(writer.len())?;
    let payload = writer.freeze();
    Ok(build_packet(packet_type.tag(), &payload))
}
