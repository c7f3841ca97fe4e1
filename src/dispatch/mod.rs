//! Dispatch module - typed decoding of framed packets.
//!
//! - [`MessageDispatcher`] - maps a packet's type tag to its payload decoder
//! - [`DecodedMessage`] - the typed result handed to the consumer
//!
//! # Example
//!
//! ```
//! use bearing_wire::codec::encode_model_output;
//! use bearing_wire::dispatch::{DecodedMessage, MessageDispatcher};
//! use bearing_wire::protocol::PacketFramer;
//!
//! let mut framer = PacketFramer::new();
//! let mut dispatcher = MessageDispatcher::new();
//!
//! let bytes = encode_model_output("Healthy", 99.0).unwrap();
//! for packet in framer.feed(&bytes).into_iter().filter_map(|e| e.into_packet()) {
//!     match dispatcher.dispatch(&packet) {
//!         Ok(DecodedMessage::ModelOutput(out)) => assert_eq!(out.class_name, "Healthy"),
//!         other => panic!("unexpected: {:?}", other),
//!     }
//! }
//! ```

mod dispatcher;
mod message;

pub use dispatcher::{decode_model_output, decode_state, decode_three_axis, MessageDispatcher};
pub use message::{DecodedMessage, ModelOutput, ThreeAxisBatch};
