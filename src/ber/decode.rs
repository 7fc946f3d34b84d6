//! BER decoding.
//!
//! Zero-copy decoding using `Bytes` to avoid allocations.

use super::length::decode_length;
use super::tag;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// BER decoder that reads from a byte buffer.
///
/// The decoder tracks its offset, so decoding a complete TLV leaves it
/// positioned at the next one. A datagram holding several SNMP messages
/// back-to-back is consumed by decoding in a loop until
/// [`is_empty`](Decoder::is_empty).
pub struct Decoder {
    data: Bytes,
    offset: usize,
}

impl Decoder {
    /// Create a new decoder from bytes.
    pub fn new(data: Bytes) -> Self {
        Self { data, offset: 0 }
    }

    /// Create a decoder from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Get the current offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Get remaining byte count.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check if all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.offset >= self.data.len() {
            return Err(Error::decode(self.offset, DecodeErrorKind::TruncatedData));
        }
        let byte = self.data[self.offset];
        self.offset += 1;
        Ok(byte)
    }

    /// Read a tag byte.
    pub fn read_tag(&mut self) -> Result<u8> {
        self.read_byte()
    }

    /// Read a length field.
    pub fn read_length(&mut self) -> Result<usize> {
        let (len, consumed) = decode_length(&self.data[self.offset..], self.offset)?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        // saturating_add so a hostile length cannot overflow the bounds check
        if self.offset.saturating_add(len) > self.data.len() {
            return Err(Error::decode(self.offset, DecodeErrorKind::TruncatedData));
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Read and expect a specific tag, returning the content length.
    pub fn expect_tag(&mut self, expected: u8) -> Result<usize> {
        let actual = self.read_tag()?;
        if actual != expected {
            return Err(Error::decode(
                self.offset - 1,
                DecodeErrorKind::UnexpectedTag { expected, actual },
            ));
        }
        self.read_length()
    }

    /// Read a BER INTEGER (signed).
    pub fn read_integer(&mut self) -> Result<i32> {
        let len = self.expect_tag(tag::universal::INTEGER)?;
        self.read_integer_value(len)
    }

    /// Read a signed integer value given its length.
    pub fn read_integer_value(&mut self, len: usize) -> Result<i32> {
        if len == 0 {
            return Err(Error::decode(self.offset, DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 4 {
            // Permissive: truncate with a warning, matching net-snmp
            tracing::warn!(target: "snmp_bulkpoll::ber", offset = self.offset, length = len, "integer too long, truncating to 4 bytes");
        }

        let bytes = self.read_bytes(len)?;

        let mut value: i32 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
        for &byte in bytes.iter().take(4) {
            value = (value << 8) | (byte as i32);
        }

        Ok(value)
    }

    /// Read an unsigned 32-bit value given its length.
    pub fn read_unsigned32_value(&mut self, len: usize) -> Result<u32> {
        if len == 0 {
            return Err(Error::decode(self.offset, DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 5 {
            // 5 bytes max: one leading zero plus four value bytes
            tracing::warn!(target: "snmp_bulkpoll::ber", offset = self.offset, length = len, "unsigned integer too long, truncating to 4 bytes");
        }

        let bytes = self.read_bytes(len)?;
        let mut value: u32 = 0;
        for &byte in bytes.iter().take(5) {
            value = (value << 8) | (byte as u32);
        }

        Ok(value)
    }

    /// Read an unsigned 64-bit value given its length.
    pub fn read_unsigned64_value(&mut self, len: usize) -> Result<u64> {
        if len == 0 {
            return Err(Error::decode(self.offset, DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 9 {
            // 9 bytes max: one leading zero plus eight value bytes
            return Err(Error::decode(
                self.offset,
                DecodeErrorKind::Integer64TooLong { length: len },
            ));
        }

        let bytes = self.read_bytes(len)?;
        let mut value: u64 = 0;
        for &byte in bytes.iter() {
            value = (value << 8) | (byte as u64);
        }

        Ok(value)
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        let len = self.expect_tag(tag::universal::OCTET_STRING)?;
        self.read_bytes(len)
    }

    /// Read a NULL.
    pub fn read_null(&mut self) -> Result<()> {
        let len = self.expect_tag(tag::universal::NULL)?;
        if len != 0 {
            return Err(Error::decode(self.offset, DecodeErrorKind::InvalidNull));
        }
        Ok(())
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let len = self.expect_tag(tag::universal::OBJECT_IDENTIFIER)?;
        self.read_oid_value(len)
    }

    /// Read an OID value given its length.
    pub fn read_oid_value(&mut self, len: usize) -> Result<Oid> {
        let bytes = self.read_bytes(len)?;
        Oid::from_ber(&bytes)
    }

    /// Read a SEQUENCE, returning a decoder scoped to its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        self.read_constructed(tag::universal::SEQUENCE)
    }

    /// Read a constructed type with a specific tag, returning a decoder
    /// scoped to its contents.
    pub fn read_constructed(&mut self, expected: u8) -> Result<Decoder> {
        let len = self.expect_tag(expected)?;
        let content = self.read_bytes(len)?;
        Ok(Decoder {
            data: content,
            offset: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_integer() {
        let mut dec = Decoder::from_slice(&[0x02, 0x01, 0x00]);
        assert_eq!(dec.read_integer().unwrap(), 0);

        let mut dec = Decoder::from_slice(&[0x02, 0x02, 0x00, 0x80]);
        assert_eq!(dec.read_integer().unwrap(), 128);

        let mut dec = Decoder::from_slice(&[0x02, 0x01, 0xFF]);
        assert_eq!(dec.read_integer().unwrap(), -1);
    }

    #[test]
    fn test_decode_sequence() {
        let mut dec = Decoder::from_slice(&[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]);
        let mut seq = dec.read_sequence().unwrap();
        assert_eq!(seq.read_integer().unwrap(), 1);
        assert_eq!(seq.read_integer().unwrap(), 2);
        assert!(seq.is_empty());
        assert!(dec.is_empty());
    }

    #[test]
    fn test_sequence_leaves_outer_positioned_after_it() {
        // Two sequences back-to-back: reading the first must position the
        // decoder exactly at the second
        let mut dec = Decoder::from_slice(&[
            0x30, 0x03, 0x02, 0x01, 0x07, // SEQUENCE { INTEGER 7 }
            0x30, 0x03, 0x02, 0x01, 0x09, // SEQUENCE { INTEGER 9 }
        ]);
        let mut first = dec.read_sequence().unwrap();
        assert_eq!(first.read_integer().unwrap(), 7);
        assert_eq!(dec.offset(), 5);
        let mut second = dec.read_sequence().unwrap();
        assert_eq!(second.read_integer().unwrap(), 9);
        assert!(dec.is_empty());
    }

    #[test]
    fn test_unexpected_tag_reports_kind() {
        let mut dec = Decoder::from_slice(&[0x04, 0x00]);
        let err = dec.read_integer().unwrap_err();
        assert!(matches!(
            *err,
            Error::Decode {
                kind: DecodeErrorKind::UnexpectedTag { expected: 0x02, actual: 0x04 },
                ..
            }
        ));
    }

    #[test]
    fn test_truncated_bytes_rejected() {
        let mut dec = Decoder::from_slice(&[0x01, 0x02]);
        assert!(dec.read_bytes(100).is_err());
    }

    #[test]
    fn test_integer_truncation_permissive() {
        // 5-byte integer truncates to the first 4 bytes, matching net-snmp
        let mut dec = Decoder::from_slice(&[0x02, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05]);
        assert_eq!(dec.read_integer().unwrap(), 0x01020304);
    }
}
