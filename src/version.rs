//! SNMP protocol version.

/// SNMP protocol version supported by the poller.
///
/// Community-based versions only; SNMPv3 is out of scope for this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Version {
    /// SNMPv1 (RFC 1157), wire value 0.
    #[default]
    V1,
    /// SNMPv2c (RFC 1901), wire value 1.
    V2c,
}

impl Version {
    /// Wire value carried in the message header.
    pub fn as_i32(self) -> i32 {
        match self {
            Version::V1 => 0,
            Version::V2c => 1,
        }
    }

    /// Create from a wire value.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Version::V1),
            1 => Some(Version::V2c),
            _ => None,
        }
    }

    /// Map a configuration string to a version.
    ///
    /// Accepts `"1"` and `"2c"`. Anything else falls back to [`Version::V1`];
    /// the fallback is deliberate so that configs with a missing or
    /// misspelled version field still poll rather than fail.
    pub fn from_config_str(s: &str) -> Self {
        match s {
            "1" => Version::V1,
            "2c" => Version::V2c,
            _ => Version::V1,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Version::V1 => write!(f, "1"),
            Version::V2c => write!(f, "2c"),
        }
    }
}
