//! This module provides the shared, low-level byte cursor types used by every
//! codec in the crate.
//!
//! The compressed formats are plain little-endian byte streams, but the
//! buffers they live in are caller-owned and arbitrarily aligned. All pointer
//! walking from the original designs is therefore expressed here as
//! bounds-checked slice access with explicit offset tracking; the codecs
//! never index a buffer directly.

use crate::error::LanepackError;

//==================================================================================
// 1. Reader
//==================================================================================

/// A bounds-checked cursor over a compressed input buffer.
///
/// Every read either advances the cursor or fails with
/// [`LanepackError::Corrupt`]; a malformed buffer can never cause an
/// out-of-bounds access.
pub(crate) struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub(crate) fn get_u32_le(&mut self) -> Result<u32, LanepackError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Borrow the next `n` bytes and advance past them.
    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], LanepackError> {
        let slice = self
            .buf
            .get(self.pos..self.pos + n)
            .ok_or_else(|| {
                LanepackError::corrupt(format!(
                    "need {} bytes at offset {}, buffer holds {}",
                    n,
                    self.pos,
                    self.buf.len()
                ))
            })?;
        self.pos += n;
        Ok(slice)
    }

    /// Fails unless the cursor consumed the buffer exactly.
    pub(crate) fn expect_consumed(&self) -> Result<(), LanepackError> {
        if self.remaining() != 0 {
            return Err(LanepackError::corrupt(format!(
                "{} trailing bytes after the declared content",
                self.remaining()
            )));
        }
        Ok(())
    }
}

//==================================================================================
// 2. Writer
//==================================================================================

/// A bounds-checked cursor over a caller-allocated output buffer.
pub(crate) struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn written(&self) -> usize {
        self.pos
    }

    pub(crate) fn put_u32_le(&mut self, value: u32) -> Result<(), LanepackError> {
        self.put_bytes(&value.to_le_bytes())
    }

    pub(crate) fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), LanepackError> {
        let dst = self
            .buf
            .get_mut(self.pos..self.pos + bytes.len())
            .ok_or_else(|| {
                LanepackError::corrupt(format!(
                    "output buffer too small: need {} bytes at offset {}",
                    bytes.len(),
                    self.pos
                ))
            })?;
        dst.copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_roundtrip_and_exhaustion() {
        let bytes = [0x01, 0x00, 0x00, 0x00, 0xAA, 0xBB];
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.get_u32_le().unwrap(), 1);
        assert_eq!(reader.take(2).unwrap(), &[0xAA, 0xBB]);
        assert!(reader.expect_consumed().is_ok());
        assert!(reader.take(1).is_err());
    }

    #[test]
    fn test_reader_reports_trailing_bytes() {
        let bytes = [0u8; 6];
        let mut reader = ByteReader::new(&bytes);
        reader.get_u32_le().unwrap();
        let err = reader.expect_consumed().unwrap_err();
        assert!(matches!(err, LanepackError::Corrupt(_)));
    }

    #[test]
    fn test_writer_tracks_position_and_overflow() {
        let mut buf = [0u8; 8];
        let mut writer = ByteWriter::new(&mut buf);
        writer.put_u32_le(8).unwrap();
        writer.put_u32_le(0xDEAD_BEEF).unwrap();
        assert_eq!(writer.written(), 8);
        assert!(writer.put_bytes(&[1]).is_err());
        assert_eq!(&buf[..4], &8u32.to_le_bytes());
    }
}
