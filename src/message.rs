//! Community-based SNMP message format (v1/v2c).
//!
//! V1 and V2c messages share the same structure:
//! `SEQUENCE { version INTEGER, community OCTET STRING, pdu PDU }`
//!
//! The only difference is the version number (0 for v1, 1 for v2c).

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use crate::pdu::Pdu;
use crate::version::Version;
use bytes::Bytes;

/// Community-based SNMP message (v1/v2c).
#[derive(Debug, Clone)]
pub struct CommunityMessage {
    /// SNMP version
    pub version: Version,
    /// Community string for authentication
    pub community: Bytes,
    /// Protocol data unit
    pub pdu: Pdu,
}

impl CommunityMessage {
    /// Create a new community message.
    pub fn new(version: Version, community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self {
            version,
            community: community.into(),
            pdu,
        }
    }

    /// Encode a GET request message for a chunk of OIDs.
    ///
    /// This is the "build message for version + community + OID list"
    /// primitive the request batcher uses; it never materializes a PDU
    /// struct for the outgoing side.
    pub fn encode_get_request(
        version: Version,
        community: &[u8],
        request_id: i32,
        oids: &[Oid],
    ) -> Bytes {
        let mut buf = EncodeBuf::new();

        buf.push_sequence(|buf| {
            Pdu::encode_get_request(buf, request_id, oids);
            buf.push_octet_string(community);
            buf.push_integer(version.as_i32());
        });

        buf.finish()
    }

    /// Encode to BER.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();

        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.community);
            buf.push_integer(self.version.as_i32());
        });

        buf.finish()
    }

    /// Decode a single message from bytes.
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        Self::decode_from(&mut decoder)
    }

    /// Decode the next message from an existing decoder.
    ///
    /// Consumes exactly one message's bytes and leaves the decoder
    /// positioned at whatever follows. Agents may pack several response
    /// messages into one datagram; calling this in a loop until the decoder
    /// [`is_empty`](Decoder::is_empty) drains all of them.
    pub fn decode_from(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;

        let version_num = seq.read_integer()?;
        let version = Version::from_i32(version_num).ok_or_else(|| {
            Error::decode(seq.offset(), DecodeErrorKind::UnknownVersion(version_num))
        })?;

        let community = seq.read_octet_string()?;
        let pdu = Pdu::decode(&mut seq)?;

        Ok(CommunityMessage {
            version,
            community,
            pdu,
        })
    }

    /// Consume and return the PDU.
    pub fn into_pdu(self) -> Pdu {
        self.pdu
    }
}
