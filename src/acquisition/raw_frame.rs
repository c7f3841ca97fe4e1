//! Raw ADC frame returned by the get-data bus transaction.
//!
//! ```text
//! ┌───────┬──────────┬──────┬──────────┬──────┬──────────┬───────┐
//! │ Start │ X axis   │ Sep1 │ Y axis   │ Sep2 │ Z axis   │ End   │
//! │ AA 55 │ 2048 B   │ 5A A5│ 2048 B   │ 7B 89│ 2048 B   │ FF EE │
//! └───────┴──────────┴──────┴──────────┴──────┴──────────┴───────┘
//! ```
//!
//! Each axis region holds 1024 samples of two bytes. A sample code is
//! `(b0 << 2) | b1`, which always lands in the 10-bit range.

use crate::error::AcquisitionError;

/// Raw bytes per axis region.
pub const AXIS_BYTES: usize = 2048;

/// Samples per axis in one burst.
pub const SAMPLES_PER_AXIS: usize = AXIS_BYTES / 2;

/// Bytes per marker.
pub const MARKER_SIZE: usize = 2;

/// Total frame size: four markers and three axis regions.
pub const RAW_FRAME_SIZE: usize = 4 * MARKER_SIZE + 3 * AXIS_BYTES;

/// Largest sample code a 10-bit converter produces.
pub const MAX_SAMPLE_CODE: u16 = 0x03FF;

/// Structural markers, in frame order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Start,
    Separator1,
    Separator2,
    End,
}

impl Marker {
    /// All markers in the order they are validated.
    pub const ALL: [Marker; 4] = [
        Marker::Start,
        Marker::Separator1,
        Marker::Separator2,
        Marker::End,
    ];

    /// Expected marker bytes.
    pub const fn bytes(self) -> [u8; MARKER_SIZE] {
        match self {
            Marker::Start => [0xAA, 0x55],
            Marker::Separator1 => [0x5A, 0xA5],
            Marker::Separator2 => [0x7B, 0x89],
            Marker::End => [0xFF, 0xEE],
        }
    }

    /// Byte offset of the marker inside a raw frame.
    pub const fn offset(self) -> usize {
        match self {
            Marker::Start => 0,
            Marker::Separator1 => MARKER_SIZE + AXIS_BYTES,
            Marker::Separator2 => 2 * (MARKER_SIZE + AXIS_BYTES),
            Marker::End => 3 * (MARKER_SIZE + AXIS_BYTES),
        }
    }
}

/// Accelerometer axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Byte offset of the axis region inside a raw frame.
    pub const fn offset(self) -> usize {
        match self {
            Axis::X => MARKER_SIZE,
            Axis::Y => 2 * MARKER_SIZE + AXIS_BYTES,
            Axis::Z => 3 * MARKER_SIZE + 2 * AXIS_BYTES,
        }
    }
}

/// Combine one sample's two bytes into a 10-bit code.
#[inline]
pub fn sample_code(b0: u8, b1: u8) -> u16 {
    ((u16::from(b0) << 2) | u16::from(b1)) & MAX_SAMPLE_CODE
}

/// Owned, length-checked raw frame.
#[derive(Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Vec<u8>,
}

impl RawFrame {
    /// Wrap transport bytes, rejecting any length other than `RAW_FRAME_SIZE`.
    pub fn from_vec(bytes: Vec<u8>) -> Result<Self, AcquisitionError> {
        if bytes.len() != RAW_FRAME_SIZE {
            return Err(AcquisitionError::FrameLength {
                expected: RAW_FRAME_SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self { bytes })
    }

    /// Bytes found at a marker position.
    pub fn marker(&self, marker: Marker) -> [u8; MARKER_SIZE] {
        let at = marker.offset();
        [self.bytes[at], self.bytes[at + 1]]
    }

    /// Raw bytes of one axis region.
    pub fn axis_bytes(&self, axis: Axis) -> &[u8] {
        let at = axis.offset();
        &self.bytes[at..at + AXIS_BYTES]
    }

    /// Check all four markers; the first mismatch is reported.
    pub fn validate(&self) -> Result<(), AcquisitionError> {
        for marker in Marker::ALL {
            let found = self.marker(marker);
            if found != marker.bytes() {
                return Err(AcquisitionError::FrameSyncError { marker, found });
            }
        }
        Ok(())
    }

    /// Decode one axis region into sample codes.
    pub fn decode_axis(&self, axis: Axis) -> [u16; SAMPLES_PER_AXIS] {
        let region = self.axis_bytes(axis);
        std::array::from_fn(|i| sample_code(region[2 * i], region[2 * i + 1]))
    }
}

impl std::fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFrame")
            .field("start", &self.marker(Marker::Start))
            .field("separator1", &self.marker(Marker::Separator1))
            .field("separator2", &self.marker(Marker::Separator2))
            .field("end", &self.marker(Marker::End))
            .finish()
    }
}
