//! ADC burst acquisition over the FPGA bus.
//!
//! One [`AdcBurstAcquirer::acquire`] call runs two transactions:
//! 1. set-sampling: `[device_id, 0x3F]`, expects the end marker back
//! 2. get-data: `[device_id, 0xF6]`, expects a full [`RawFrame`]
//!
//! Failures are all-or-nothing and never retried here; the caller decides
//! whether to poll again.

use crate::config::AcquisitionConfig;
use crate::dispatch::ThreeAxisBatch;
use crate::error::AcquisitionError;

use super::raw_frame::{Axis, Marker, RawFrame, MARKER_SIZE, RAW_FRAME_SIZE, SAMPLES_PER_AXIS};

/// Device identifier the FPGA answers to.
pub const DEFAULT_DEVICE_ID: u8 = 0x16;

/// Opcode that arms a sampling burst.
pub const OP_SET_SAMPLING: u8 = 0x3F;

/// Opcode that reads the sampled burst back.
pub const OP_GET_DATA: u8 = 0xF6;

/// Full-scale span of the converter input in volts.
const VOLTAGE_SPAN: f64 = 10.0;

/// Voltage offset of code 0.
const VOLTAGE_OFFSET: f64 = -5.0;

/// Half-duplex "write N bytes, then read M bytes" bus primitive.
///
/// Implementations block until the transfer completes or their own timeout
/// expires. The acquirer assumes exclusive use for the duration of a call.
pub trait SpiTransport {
    /// Send `tx`, then fill all of `rx`.
    fn write_then_read(&mut self, tx: &[u8], rx: &mut [u8]) -> std::io::Result<()>;
}

impl<T: SpiTransport + ?Sized> SpiTransport for &mut T {
    fn write_then_read(&mut self, tx: &[u8], rx: &mut [u8]) -> std::io::Result<()> {
        (**self).write_then_read(tx, rx)
    }
}

impl<T: SpiTransport + ?Sized> SpiTransport for Box<T> {
    fn write_then_read(&mut self, tx: &[u8], rx: &mut [u8]) -> std::io::Result<()> {
        (**self).write_then_read(tx, rx)
    }
}

/// Convert a 10-bit code to volts: `code * 10.0 / 1023.0 - 5.0`.
#[inline]
pub fn code_to_voltage(code: u16) -> f64 {
    f64::from(code) * VOLTAGE_SPAN / 1023.0 + VOLTAGE_OFFSET
}

/// One burst of three-axis sample codes, 1024 per axis, each in `[0, 1023]`.
#[derive(Clone, PartialEq, Eq)]
pub struct AdcBurst {
    pub x: [u16; SAMPLES_PER_AXIS],
    pub y: [u16; SAMPLES_PER_AXIS],
    pub z: [u16; SAMPLES_PER_AXIS],
}

impl AdcBurst {
    /// Decode a validated raw frame.
    pub fn from_frame(frame: &RawFrame) -> Self {
        Self {
            x: frame.decode_axis(Axis::X),
            y: frame.decode_axis(Axis::Y),
            z: frame.decode_axis(Axis::Z),
        }
    }

    pub fn axis(&self, axis: Axis) -> &[u16; SAMPLES_PER_AXIS] {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// Derived voltages for one axis. No smoothing is applied.
    pub fn voltages(&self, axis: Axis) -> Vec<f64> {
        self.axis(axis).iter().copied().map(code_to_voltage).collect()
    }

    /// Voltage batch ready for [`crate::codec::encode_three_axis`].
    pub fn to_batch(&self) -> ThreeAxisBatch {
        ThreeAxisBatch::new(
            self.voltages(Axis::X),
            self.voltages(Axis::Y),
            self.voltages(Axis::Z),
        )
    }
}

impl std::fmt::Debug for AdcBurst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdcBurst")
            .field("samples", &SAMPLES_PER_AXIS)
            .field("x0", &self.x[0])
            .field("y0", &self.y[0])
            .field("z0", &self.z[0])
            .finish()
    }
}

/// Drives burst transactions against one FPGA device.
pub struct AdcBurstAcquirer<T> {
    transport: T,
    device_id: u8,
}

impl<T: SpiTransport> AdcBurstAcquirer<T> {
    /// Create an acquirer for the default device id.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, &AcquisitionConfig::default())
    }

    /// Create an acquirer addressing `config.device_id`.
    pub fn with_config(transport: T, config: &AcquisitionConfig) -> Self {
        Self {
            transport,
            device_id: config.device_id,
        }
    }

    pub fn device_id(&self) -> u8 {
        self.device_id
    }

    /// Acquire one burst.
    pub fn acquire(&mut self) -> Result<AdcBurst, AcquisitionError> {
        self.arm_sampling()?;
        let frame = self.read_frame()?;
        frame.validate().inspect_err(|err| {
            tracing::warn!(device_id = self.device_id, error = %err, "burst rejected");
        })?;

        tracing::debug!(device_id = self.device_id, "burst acquired");
        Ok(AdcBurst::from_frame(&frame))
    }

    /// Set-sampling transaction; the device must answer with the end marker.
    fn arm_sampling(&mut self) -> Result<(), AcquisitionError> {
        let mut response = [0u8; MARKER_SIZE];
        self.transport
            .write_then_read(&[self.device_id, OP_SET_SAMPLING], &mut response)?;

        if response != Marker::End.bytes() {
            tracing::warn!(device_id = self.device_id, ?response, "setup check failed");
            return Err(AcquisitionError::SetupCheckFailed { response });
        }
        Ok(())
    }

    /// Get-data transaction.
    fn read_frame(&mut self) -> Result<RawFrame, AcquisitionError> {
        let mut bytes = vec![0u8; RAW_FRAME_SIZE];
        self.transport
            .write_then_read(&[self.device_id, OP_GET_DATA], &mut bytes)?;
        RawFrame::from_vec(bytes)
    }

    /// Release the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::raw_frame::tests::make_frame_bytes;
    use std::collections::VecDeque;

    /// Transport that replays canned responses and records commands.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: VecDeque<std::io::Result<Vec<u8>>>,
        commands: Vec<Vec<u8>>,
    }

    impl ScriptedTransport {
        fn respond(mut self, bytes: Vec<u8>) -> Self {
            self.responses.push_back(Ok(bytes));
            self
        }

        fn fail(mut self, kind: std::io::ErrorKind) -> Self {
            self.responses.push_back(Err(kind.into()));
            self
        }
    }

    impl SpiTransport for ScriptedTransport {
        fn write_then_read(&mut self, tx: &[u8], rx: &mut [u8]) -> std::io::Result<()> {
            self.commands.push(tx.to_vec());
            let bytes = self
                .responses
                .pop_front()
                .unwrap_or_else(|| Err(std::io::ErrorKind::UnexpectedEof.into()))?;
            rx.copy_from_slice(&bytes);
            Ok(())
        }
    }

    fn end_marker() -> Vec<u8> {
        Marker::End.bytes().to_vec()
    }

    #[test]
    fn test_acquire_success() {
        let transport = ScriptedTransport::default()
            .respond(end_marker())
            .respond(make_frame_bytes([(0x00, 0x00), (0xFF, 0xFF), (0x80, 0x01)]));
        let mut acquirer = AdcBurstAcquirer::new(transport);

        let burst = acquirer.acquire().unwrap();

        assert!(burst.x.iter().all(|&c| c == 0));
        assert!(burst.y.iter().all(|&c| c == 1023));
        assert!(burst.z.iter().all(|&c| c == 0x201));

        let transport = acquirer.into_inner();
        assert_eq!(
            transport.commands,
            vec![vec![0x16, OP_SET_SAMPLING], vec![0x16, OP_GET_DATA]]
        );
    }

    #[test]
    fn test_setup_check_failure_skips_read() {
        let transport = ScriptedTransport::default().respond(vec![0xFF, 0x00]);
        let mut acquirer = AdcBurstAcquirer::new(transport);

        let err = acquirer.acquire().unwrap_err();
        assert!(matches!(
            err,
            AcquisitionError::SetupCheckFailed {
                response: [0xFF, 0x00]
            }
        ));
        assert_eq!(acquirer.into_inner().commands.len(), 1);
    }

    #[test]
    fn test_corrupted_separator2_returns_no_data() {
        let mut frame = make_frame_bytes([(1, 1); 3]);
        frame[Marker::Separator2.offset()] = 0x00;
        let transport = ScriptedTransport::default()
            .respond(end_marker())
            .respond(frame);
        let mut acquirer = AdcBurstAcquirer::new(transport);

        match acquirer.acquire() {
            Err(AcquisitionError::FrameSyncError { marker, found }) => {
                assert_eq!(marker, Marker::Separator2);
                assert_eq!(found, [0x00, 0x89]);
            }
            other => panic!("expected FrameSyncError, got {:?}", other),
        }
    }

    #[test]
    fn test_transport_error_propagates() {
        let transport = ScriptedTransport::default()
            .respond(end_marker())
            .fail(std::io::ErrorKind::TimedOut);
        let mut acquirer = AdcBurstAcquirer::new(transport);

        let err = acquirer.acquire().unwrap_err();
        assert!(matches!(err, AcquisitionError::Transport(e) if e.kind() == std::io::ErrorKind::TimedOut));
    }

    #[test]
    fn test_no_state_between_calls() {
        let mut bad = make_frame_bytes([(0, 0); 3]);
        bad[0] = 0x00;
        let transport = ScriptedTransport::default()
            .respond(end_marker())
            .respond(bad)
            .respond(end_marker())
            .respond(make_frame_bytes([(0, 2); 3]));
        let mut acquirer = AdcBurstAcquirer::new(transport);

        assert!(acquirer.acquire().is_err());
        let burst = acquirer.acquire().unwrap();
        assert!(burst.x.iter().all(|&c| c == 2));
    }

    #[test]
    fn test_custom_device_id() {
        let transport = ScriptedTransport::default().respond(vec![0, 0]);
        let config = AcquisitionConfig { device_id: 0x21 };
        let mut acquirer = AdcBurstAcquirer::with_config(transport, &config);
        assert_eq!(acquirer.device_id(), 0x21);

        let _ = acquirer.acquire();
        assert_eq!(acquirer.into_inner().commands[0], vec![0x21, OP_SET_SAMPLING]);
    }

    #[test]
    fn test_code_to_voltage() {
        assert_eq!(code_to_voltage(0), -5.0);
        assert_eq!(code_to_voltage(1023), 5.0);
        assert!((code_to_voltage(512) - 0.004_887_585_532_746_823).abs() < 1e-12);
    }

    #[test]
    fn test_burst_to_batch() {
        let frame = RawFrame::from_vec(make_frame_bytes([(0, 0), (0xFF, 0xFF), (0, 0)])).unwrap();
        let batch = AdcBurst::from_frame(&frame).to_batch();

        assert_eq!(batch.len(), SAMPLES_PER_AXIS);
        assert!(batch.x.iter().all(|&v| v == -5.0));
        assert!(batch.y.iter().all(|&v| v == 5.0));
    }
}
