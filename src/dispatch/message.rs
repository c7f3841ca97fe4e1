//! Typed application messages carried by the stream.

use bytes::Bytes;

use crate::codec::{encode_model_output, encode_state, encode_three_axis};
use crate::error::Result;
use crate::protocol::PacketType;

/// One batch of three-axis samples. All three axes have equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThreeAxisBatch {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl ThreeAxisBatch {
    /// Wrap three axis vectors; lengths are checked on encode.
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Self {
        Self { x, y, z }
    }

    /// Number of samples per axis.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Encode as a complete ThreeAxis packet.
    pub fn encode(&self) -> Result<Bytes> {
        encode_three_axis(&self.x, &self.y, &self.z)
    }
}

/// Classifier result.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    pub class_name: String,
    /// Confidence in percent (0.0 - 100.0).
    pub confidence: f64,
}

impl ModelOutput {
    pub fn new(class_name: impl Into<String>, confidence: f64) -> Self {
        Self {
            class_name: class_name.into(),
            confidence,
        }
    }

    pub fn encode(&self) -> Result<Bytes> {
        encode_model_output(&self.class_name, self.confidence)
    }
}

/// A decoded packet payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedMessage {
    ThreeAxis(ThreeAxisBatch),
    ModelOutput(ModelOutput),
    State(String),
}

impl DecodedMessage {
    /// Packet type this message travels as.
    pub fn packet_type(&self) -> PacketType {
        match self {
            DecodedMessage::ThreeAxis(_) => PacketType::ThreeAxis,
            DecodedMessage::ModelOutput(_) => PacketType::ModelOutput,
            DecodedMessage::State(_) => PacketType::State,
        }
    }

    /// Encode back into a complete packet.
    pub fn encode(&self) -> Result<Bytes> {
        match self {
            DecodedMessage::ThreeAxis(batch) => batch.encode(),
            DecodedMessage::ModelOutput(output) => output.encode(),
            DecodedMessage::State(text) => encode_state(text),
        }
    }
}

impl From<ThreeAxisBatch> for DecodedMessage {
    fn from(batch: ThreeAxisBatch) -> Self {
        DecodedMessage::ThreeAxis(batch)
    }
}

impl From<ModelOutput> for DecodedMessage {
    fn from(output: ModelOutput) -> Self {
        DecodedMessage::ModelOutput(output)
    }
}
