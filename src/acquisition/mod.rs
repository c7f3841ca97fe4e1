//! Acquisition module - FPGA/ADC burst transactions.
//!
//! Drives the fixed-function bus protocol that reads one three-axis burst:
//! command bytes out, a marker-delimited raw frame back, decoded into 10-bit
//! sample codes.

mod acquirer;
mod raw_frame;

pub use acquirer::{
    code_to_voltage, AdcBurst, AdcBurstAcquirer, SpiTransport, DEFAULT_DEVICE_ID, OP_GET_DATA,
    OP_SET_SAMPLING,
};
pub use raw_frame::{
    sample_code, Axis, Marker, RawFrame, AXIS_BYTES, MARKER_SIZE, MAX_SAMPLE_CODE,
    RAW_FRAME_SIZE, SAMPLES_PER_AXIS,
};
