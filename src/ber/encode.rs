//! BER encoding.
//!
//! [`EncodeBuf`] builds a message back-to-front: callers push fields in
//! reverse field order, each push appends the field's bytes reversed, and
//! [`finish`](EncodeBuf::finish) flips the buffer once. Building backwards
//! means a constructed type's content length is known by the time its header
//! is written, so encoding is single-pass with no length back-patching.

use super::length::encode_length;
use super::tag;
use crate::oid::Oid;
use bytes::Bytes;

/// Reverse-building BER encode buffer.
///
/// Within a [`push_sequence`](EncodeBuf::push_sequence) or
/// [`push_constructed`](EncodeBuf::push_constructed) closure, push the
/// *last* field first.
#[derive(Default)]
pub struct EncodeBuf {
    buf: Vec<u8>,
}

impl EncodeBuf {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(128),
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Push a single byte.
    pub fn push_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Push raw bytes; they appear in the output in the order given.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend(bytes.iter().rev());
    }

    /// Push a tag byte. Call after the length, per the reverse build order.
    pub fn push_tag(&mut self, tag: u8) {
        self.buf.push(tag);
    }

    /// Push a length field.
    pub fn push_length(&mut self, len: usize) {
        let (bytes, n) = encode_length(len);
        // encode_length already returns reversed bytes
        self.buf.extend_from_slice(&bytes[..n]);
    }

    /// Push an INTEGER (minimal two's-complement encoding).
    pub fn push_integer(&mut self, value: i32) {
        let be = value.to_be_bytes();
        let mut start = 0;
        // Strip redundant leading bytes, keeping the sign bit intact
        while start < 3 {
            let redundant = (be[start] == 0x00 && be[start + 1] & 0x80 == 0)
                || (be[start] == 0xFF && be[start + 1] & 0x80 != 0);
            if !redundant {
                break;
            }
            start += 1;
        }
        let content = &be[start..];
        self.push_bytes(content);
        self.push_length(content.len());
        self.push_tag(tag::universal::INTEGER);
    }

    /// Push an unsigned 32-bit value under an application tag
    /// (Counter32, Gauge32, TimeTicks).
    pub fn push_unsigned32(&mut self, value_tag: u8, value: u32) {
        self.push_unsigned(value_tag, u64::from(value));
    }

    /// Push an unsigned 64-bit value under an application tag (Counter64).
    pub fn push_unsigned64(&mut self, value_tag: u8, value: u64) {
        self.push_unsigned(value_tag, value);
    }

    fn push_unsigned(&mut self, value_tag: u8, value: u64) {
        let be = value.to_be_bytes();
        let mut start = 0;
        while start < 7 && be[start] == 0 {
            start += 1;
        }
        let mut len = 8 - start;
        self.push_bytes(&be[start..]);
        // Unsigned values with the high bit set need a leading zero so they
        // are not read back as negative
        if be[start] & 0x80 != 0 {
            self.push_byte(0);
            len += 1;
        }
        self.push_length(len);
        self.push_tag(value_tag);
    }

    /// Push an OCTET STRING.
    pub fn push_octet_string(&mut self, bytes: &[u8]) {
        self.push_bytes(bytes);
        self.push_length(bytes.len());
        self.push_tag(tag::universal::OCTET_STRING);
    }

    /// Push arbitrary content under an arbitrary tag (Opaque, IpAddress,
    /// unknown types carried through unmodified).
    pub fn push_tagged_bytes(&mut self, value_tag: u8, bytes: &[u8]) {
        self.push_bytes(bytes);
        self.push_length(bytes.len());
        self.push_tag(value_tag);
    }

    /// Push a NULL.
    pub fn push_null(&mut self) {
        self.push_length(0);
        self.push_tag(tag::universal::NULL);
    }

    /// Push an empty value under an arbitrary tag (v2c exceptions).
    pub fn push_empty(&mut self, value_tag: u8) {
        self.push_length(0);
        self.push_tag(value_tag);
    }

    /// Push an OBJECT IDENTIFIER.
    pub fn push_oid(&mut self, oid: &Oid) {
        let content = oid.to_ber();
        self.push_bytes(&content);
        self.push_length(content.len());
        self.push_tag(tag::universal::OBJECT_IDENTIFIER);
    }

    /// Push a SEQUENCE whose content is written by `f` (last field first).
    pub fn push_sequence(&mut self, f: impl FnOnce(&mut Self)) {
        self.push_constructed(tag::universal::SEQUENCE, f);
    }

    /// Push a constructed type with the given tag, content written by `f`
    /// (last field first).
    pub fn push_constructed(&mut self, constructed_tag: u8, f: impl FnOnce(&mut Self)) {
        let start = self.buf.len();
        f(self);
        let content_len = self.buf.len() - start;
        self.push_length(content_len);
        self.push_tag(constructed_tag);
    }

    /// Reverse the buffer into wire order and return it.
    pub fn finish(mut self) -> Bytes {
        self.buf.reverse();
        Bytes::from(self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn test_integer_encodings() {
        for (value, expected) in [
            (0i32, &[0x02, 0x01, 0x00][..]),
            (127, &[0x02, 0x01, 0x7F]),
            (128, &[0x02, 0x02, 0x00, 0x80]),
            (-1, &[0x02, 0x01, 0xFF]),
            (-128, &[0x02, 0x01, 0x80]),
            (-129, &[0x02, 0x02, 0xFF, 0x7F]),
        ] {
            let mut buf = EncodeBuf::new();
            buf.push_integer(value);
            assert_eq!(&buf.finish()[..], expected, "value {}", value);
        }
    }

    #[test]
    fn test_unsigned_high_bit_gets_leading_zero() {
        let mut buf = EncodeBuf::new();
        buf.push_unsigned32(tag::application::COUNTER32, 0x80000000);
        assert_eq!(&buf.finish()[..], &[0x41, 0x05, 0x00, 0x80, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_sequence_nesting() {
        // SEQUENCE { INTEGER 1, OCTET STRING "ab" }
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            buf.push_octet_string(b"ab");
            buf.push_integer(1);
        });
        assert_eq!(
            &buf.finish()[..],
            &[0x30, 0x07, 0x02, 0x01, 0x01, 0x04, 0x02, b'a', b'b']
        );
    }

    #[test]
    fn test_oid_encoding() {
        let mut buf = EncodeBuf::new();
        buf.push_oid(&oid!(1, 3, 6, 1));
        assert_eq!(&buf.finish()[..], &[0x06, 0x03, 0x2B, 0x06, 0x01]);
    }

    #[test]
    fn test_long_form_length() {
        let payload = vec![0xAAu8; 200];
        let mut buf = EncodeBuf::new();
        buf.push_octet_string(&payload);
        let out = buf.finish();
        assert_eq!(&out[..3], &[0x04, 0x81, 200]);
        assert_eq!(out.len(), 203);
    }
}
