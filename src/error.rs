//! Error types for snmp-bulkpoll.
//!
//! Two layers of errors live here:
//!
//! - [`Error`] - failures of *this* client: network, timeout, malformed
//!   responses, bad configuration. Boxed for a pointer-sized `Result`.
//! - [`ErrorStatus`] - errors reported *by the agent* inside a response PDU
//!   (RFC 3416). These never become `Error`: the poller reacts to `TooBig`
//!   by shrinking its requests and logs everything else.

use std::net::SocketAddr;
use std::time::Duration;

/// Result type alias using the library's boxed error.
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// The main error type for poller operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Network failure (connection refused, unreachable, etc.)
    #[error("network error communicating with {target}: {source}")]
    Network {
        target: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// No response within the timeout, after all retries.
    #[error("timeout after {elapsed:?} waiting for {target} ({retries} retries)")]
    Timeout {
        target: SocketAddr,
        elapsed: Duration,
        retries: u32,
    },

    /// Received data could not be decoded as an SNMP message.
    #[error("malformed response at offset {offset}: {kind}")]
    Decode { offset: usize, kind: DecodeErrorKind },

    /// Invalid OID notation.
    #[error("invalid OID: {0}")]
    InvalidOid(Box<str>),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(Box<str>),
}

impl Error {
    /// Box this error (convenience for constructing boxed errors).
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Construct a boxed decode error.
    pub(crate) fn decode(offset: usize, kind: DecodeErrorKind) -> Box<Self> {
        Box::new(Error::Decode { offset, kind })
    }
}

/// Detail for [`Error::Decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    #[error("unexpected end of input")]
    TruncatedData,
    #[error("indefinite length not supported")]
    IndefiniteLength,
    #[error("invalid length encoding")]
    InvalidLength,
    #[error("length field of {octets} octets")]
    LengthTooLong { octets: usize },
    #[error("length {length} exceeds maximum {max}")]
    LengthExceedsMax { length: usize, max: usize },
    #[error("zero-length integer")]
    ZeroLengthInteger,
    #[error("integer of {length} bytes exceeds 64 bits")]
    Integer64TooLong { length: usize },
    #[error("NULL with non-zero length")]
    InvalidNull,
    #[error("expected tag {expected:#04x}, found {actual:#04x}")]
    UnexpectedTag { expected: u8, actual: u8 },
    #[error("unknown PDU tag {0:#04x}")]
    UnknownPduType(u8),
    #[error("unknown SNMP version {0}")]
    UnknownVersion(i32),
    #[error("invalid OID encoding")]
    InvalidOidEncoding,
    #[error("IP address of {length} bytes")]
    InvalidIpAddressLength { length: usize },
    #[error("TLV extends past end of data")]
    TlvOverflow,
}

/// SNMP agent error status codes (RFC 3416).
///
/// Returned by agents in the `error-status` field of a response PDU. The
/// poller treats [`TooBig`](ErrorStatus::TooBig) as its adaptation signal;
/// every other non-zero status is logged and the affected chunk skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    /// Operation completed successfully (status = 0).
    NoError,
    /// Response would be too large for transport (status = 1).
    TooBig,
    /// Requested OID not found (status = 2). SNMPv1 only.
    NoSuchName,
    /// Invalid value in SET request (status = 3).
    BadValue,
    /// Write to a read-only object (status = 4).
    ReadOnly,
    /// Unspecified error (status = 5).
    GenErr,
    /// Access denied (status = 6).
    NoAccess,
    /// Wrong ASN.1 type (status = 7).
    WrongType,
    /// Wrong length (status = 8).
    WrongLength,
    /// Wrong encoding (status = 9).
    WrongEncoding,
    /// Value out of range (status = 10).
    WrongValue,
    /// Row creation not supported (status = 11).
    NoCreation,
    /// Value inconsistent with other objects (status = 12).
    InconsistentValue,
    /// Required resource unavailable (status = 13).
    ResourceUnavailable,
    /// Commit phase failed (status = 14).
    CommitFailed,
    /// Undo phase failed (status = 15).
    UndoFailed,
    /// Access denied by VACM (status = 16).
    AuthorizationError,
    /// Object not writable (status = 17).
    NotWritable,
    /// Named object cannot be created (status = 18).
    InconsistentName,
    /// Unknown or future status code.
    Unknown(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            other => Self::Unknown(other),
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::AuthorizationError => 16,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::Unknown(code) => *code,
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::NoAccess => write!(f, "noAccess"),
            Self::WrongType => write!(f, "wrongType"),
            Self::WrongLength => write!(f, "wrongLength"),
            Self::WrongEncoding => write!(f, "wrongEncoding"),
            Self::WrongValue => write!(f, "wrongValue"),
            Self::NoCreation => write!(f, "noCreation"),
            Self::InconsistentValue => write!(f, "inconsistentValue"),
            Self::ResourceUnavailable => write!(f, "resourceUnavailable"),
            Self::CommitFailed => write!(f, "commitFailed"),
            Self::UndoFailed => write!(f, "undoFailed"),
            Self::AuthorizationError => write!(f, "authorizationError"),
            Self::NotWritable => write!(f, "notWritable"),
            Self::InconsistentName => write!(f, "inconsistentName"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_is_pointer_sized() {
        assert_eq!(
            std::mem::size_of::<Result<()>>(),
            std::mem::size_of::<*const ()>(),
        );
    }

    #[test]
    fn error_status_roundtrip() {
        for code in 0..=18 {
            assert_eq!(ErrorStatus::from_i32(code).as_i32(), code);
        }
        assert_eq!(ErrorStatus::from_i32(99), ErrorStatus::Unknown(99));
        assert_eq!(ErrorStatus::Unknown(99).as_i32(), 99);
    }

    #[test]
    fn too_big_display() {
        assert_eq!(ErrorStatus::TooBig.to_string(), "tooBig");
        assert_eq!(ErrorStatus::from_i32(1), ErrorStatus::TooBig);
    }
}
