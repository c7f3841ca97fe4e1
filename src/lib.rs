//! # bearing-wire
//!
//! Binary protocol layer for a vibration-based bearing-diagnosis appliance.
//!
//! Two boundaries are covered:
//!
//! - **Acquisition** (bus): one request/response burst from the FPGA ADC
//!   front end, marker-checked and decoded into three axes of 10-bit codes.
//! - **Stream** (TCP): length-prefixed, big-endian packets carrying sample
//!   batches, classifier results and state strings, with an incremental
//!   framer that survives arbitrary read boundaries.
//!
//! ## Example
//!
//! ```
//! use bearing_wire::codec::encode_three_axis;
//! use bearing_wire::dispatch::{DecodedMessage, MessageDispatcher};
//! use bearing_wire::protocol::PacketFramer;
//!
//! let bytes = encode_three_axis(&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]).unwrap();
//!
//! let mut framer = PacketFramer::new();
//! let mut dispatcher = MessageDispatcher::new();
//! let mut messages = Vec::new();
//! for chunk in bytes.chunks(3) {
//!     for packet in framer.feed(chunk).into_iter().filter_map(|e| e.into_packet()) {
//!         messages.push(dispatcher.dispatch(&packet).unwrap());
//!     }
//! }
//!
//! match &messages[..] {
//!     [DecodedMessage::ThreeAxis(batch)] => assert_eq!(batch.z, vec![5.0, 6.0]),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

pub mod acquisition;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod reader;
pub mod writer;

pub use acquisition::{AdcBurst, AdcBurstAcquirer, SpiTransport};
pub use config::LinkConfig;
pub use dispatch::{DecodedMessage, MessageDispatcher};
pub use error::{AcquisitionError, WireError};
pub use protocol::{FramerEvent, Packet, PacketFramer};
pub use reader::{spawn_reader_task, ReaderStats};
pub use writer::{spawn_writer_task, WriterHandle};
