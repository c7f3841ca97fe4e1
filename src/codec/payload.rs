//! Big-endian field codec shared by every payload kind.
//!
//! Strings are length-prefixed: a `u32` byte count followed by UTF-8 bytes.
//! A count of `0xFFFFFFFF` is the monitoring client's null-string marker and
//! reads as an empty string; the writer never produces it.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, WireError};

/// Length prefix the client serializer writes for a null string.
pub const NULL_STRING_LENGTH: u32 = u32::MAX;

/// Cursor over a payload that reports underruns instead of panicking.
#[derive(Debug)]
pub struct PayloadReader<'a> {
    buf: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    /// Start reading at the first payload byte.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.buf.remaining() < needed {
            return Err(WireError::ShortPayload {
                needed,
                available: self.buf.remaining(),
            });
        }
        Ok(())
    }

    /// Read a big-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    /// Read a big-endian IEEE-754 `f64`.
    pub fn read_f64(&mut self) -> Result<f64> {
        self.ensure(8)?;
        Ok(self.buf.get_f64())
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()?;
        if len == NULL_STRING_LENGTH {
            return Ok(String::new());
        }

        let len = len as usize;
        self.ensure(len)?;
        let text = std::str::from_utf8(&self.buf[..len])?.to_owned();
        self.buf.advance(len);
        Ok(text)
    }

    /// Require that every byte was consumed.
    pub fn finish(self) -> Result<()> {
        match self.buf.remaining() {
            0 => Ok(()),
            count => Err(WireError::TrailingBytes { count }),
        }
    }
}

/// Growable payload builder.
#[derive(Debug, Default)]
pub struct PayloadWriter {
    buf: BytesMut,
}

impl PayloadWriter {
    /// Create a builder with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Append a big-endian `u32`.
    pub fn put_u32(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    /// Append a big-endian IEEE-754 `f64`.
    pub fn put_f64(&mut self, value: f64) {
        self.buf.put_f64(value);
    }

    /// Write a length-prefixed UTF-8 string.
    ///
    /// Fails with `OversizedPacket` if the byte length does not fit the
    /// `u32` prefix.
    pub fn put_string(&mut self, text: &str) -> Result<()> {
        let len = u32::try_from(text.len())
            .ok()
            .filter(|len| *len != NULL_STRING_LENGTH)
            .ok_or(WireError::OversizedPacket {
                length: u32::MAX,
                max: NULL_STRING_LENGTH - 1,
            })?;
        self.buf.put_u32(len);
        self.buf.put_slice(text.as_bytes());
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_fields_big_endian() {
        let mut data = vec![0, 0, 0, 2];
        data.extend_from_slice(&1.5f64.to_be_bytes());

        let mut reader = PayloadReader::new(&data);
        assert_eq!(reader.read_u32().unwrap(), 2);
        assert_eq!(reader.read_f64().unwrap(), 1.5);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_short_read_reports_underrun() {
        let data = [0u8; 5];
        let mut reader = PayloadReader::new(&data);
        reader.read_u32().unwrap();

        let err = reader.read_f64().unwrap_err();
        assert!(matches!(
            err,
            WireError::ShortPayload {
                needed: 8,
                available: 1
            }
        ));
    }

    #[test]
    fn test_string_roundtrip_utf8() {
        let mut writer = PayloadWriter::default();
        writer.put_string("内圈故障 0.7mm").unwrap();
        let bytes = writer.freeze();

        let mut reader = PayloadReader::new(&bytes);
        assert_eq!(reader.read_string().unwrap(), "内圈故障 0.7mm");
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_string_prefix_is_byte_length() {
        let mut writer = PayloadWriter::default();
        writer.put_string("é").unwrap();
        assert_eq!(&writer.freeze()[..], &[0, 0, 0, 2, 0xC3, 0xA9]);
    }

    #[test]
    fn test_null_string_marker_reads_empty() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF];
        let mut reader = PayloadReader::new(&data);
        assert_eq!(reader.read_string().unwrap(), "");
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_string_longer_than_payload() {
        let data = [0, 0, 0, 10, b'a', b'b'];
        let mut reader = PayloadReader::new(&data);
        assert!(matches!(
            reader.read_string(),
            Err(WireError::ShortPayload {
                needed: 10,
                available: 2
            })
        ));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let data = [0, 0, 0, 2, 0xFF, 0xFE];
        let mut reader = PayloadReader::new(&data);
        assert!(matches!(reader.read_string(), Err(WireError::InvalidUtf8(_))));
    }

    #[test]
    fn test_finish_reports_trailing_bytes() {
        let data = [0, 0, 0, 0, 9, 9];
        let mut reader = PayloadReader::new(&data);
        reader.read_u32().unwrap();
        assert!(matches!(
            reader.finish(),
            Err(WireError::TrailingBytes { count: 2 })
        ));
    }
}
