//! Codec module - payload field encoding and packet encoders.
//!
//! - [`PayloadReader`] / [`PayloadWriter`] - big-endian `u32`, `f64` and
//!   length-prefixed string fields
//! - [`encode_three_axis`], [`encode_model_output`], [`encode_state`] -
//!   complete packets for each message kind
//!
//! # Design
//!
//! Encoders are free functions over borrowed data rather than methods on the
//! message types, so a producer holding plain sample vectors never has to
//! build an owned message first.

mod encoder;
mod payload;

pub use encoder::{encode_model_output, encode_state, encode_three_axis, TRIPLE_SIZE};
pub use payload::{PayloadReader, PayloadWriter, NULL_STRING_LENGTH};
