//! Poller configuration.

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::version::Version;

/// Default SNMP agent port.
pub const DEFAULT_PORT: u16 = 161;

/// Default interval between poll cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Default receive timeout per request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default retries per request.
pub const DEFAULT_RETRIES: u32 = 3;

/// Immutable per-poller settings.
///
/// Created once via [`PollConfig::builder`] and never mutated afterwards;
/// all adaptive state (current split size, request buffer, cycle position)
/// lives in [`BulkPoller`](crate::poller::BulkPoller).
#[derive(Debug, Clone)]
pub struct PollConfig {
    target: SocketAddr,
    interval: Duration,
    version: Version,
    community: Bytes,
    oids: Vec<Oid>,
    initial_split: usize,
    timeout: Duration,
    retries: u32,
}

impl PollConfig {
    /// Start building a configuration for the given target.
    ///
    /// `target` is `host` or `host:port`; without a port,
    /// [`DEFAULT_PORT`] (or the builder's [`port`](PollConfigBuilder::port))
    /// is used.
    pub fn builder(target: impl Into<String>) -> PollConfigBuilder {
        PollConfigBuilder::new(target)
    }

    /// The agent address polled.
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Time between poll cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// SNMP protocol version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Community string.
    pub fn community(&self) -> &[u8] {
        &self.community
    }

    /// The ordered OID list polled each cycle.
    pub fn oids(&self) -> &[Oid] {
        &self.oids
    }

    /// Initial OIDs-per-request limit (the whole list when unset).
    pub fn initial_split(&self) -> usize {
        self.initial_split
    }

    /// Receive timeout per request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retries per request before a cycle is abandoned.
    pub fn retries(&self) -> u32 {
        self.retries
    }
}

/// Builder for [`PollConfig`].
#[derive(Debug)]
pub struct PollConfigBuilder {
    target: String,
    port: u16,
    interval: Duration,
    version: Version,
    community: Bytes,
    oids: Vec<Oid>,
    split: Option<usize>,
    timeout: Duration,
    retries: u32,
}

impl PollConfigBuilder {
    fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            port: DEFAULT_PORT,
            interval: DEFAULT_INTERVAL,
            version: Version::V1,
            community: Bytes::from_static(b"public"),
            oids: Vec::new(),
            split: None,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }

    /// Port used when the target string carries none (default: 161).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the interval between poll cycles (default: 60 seconds).
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the SNMP version (default: v1).
    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Set the SNMP version from a configuration string.
    ///
    /// Accepts `"1"` and `"2c"`; anything else falls back to v1, per
    /// [`Version::from_config_str`].
    pub fn version_str(mut self, version: &str) -> Self {
        self.version = Version::from_config_str(version);
        self
    }

    /// Set the community string (default: "public").
    pub fn community(mut self, community: impl Into<Bytes>) -> Self {
        self.community = community.into();
        self
    }

    /// Set the OIDs to poll. Order is preserved across batching.
    pub fn oids(mut self, oids: impl IntoIterator<Item = Oid>) -> Self {
        self.oids = oids.into_iter().collect();
        self
    }

    /// Set the initial number of OIDs per request.
    ///
    /// Defaults to the full OID count (one request per cycle). The poller
    /// halves this on its own whenever the agent reports `tooBig`.
    pub fn split(mut self, split: usize) -> Self {
        self.split = Some(split);
        self
    }

    /// Set the receive timeout per request (default: 5 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retries per request (default: 3).
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<PollConfig> {
        if self.oids.is_empty() {
            return Err(Error::Config("OID list is empty".into()).boxed());
        }
        if self.split == Some(0) {
            return Err(Error::Config("split size must be at least 1".into()).boxed());
        }

        let target = resolve_target(&self.target, self.port)?;
        let initial_split = self.split.unwrap_or(self.oids.len());

        Ok(PollConfig {
            target,
            interval: self.interval,
            version: self.version,
            community: self.community,
            oids: self.oids,
            initial_split,
            timeout: self.timeout,
            retries: self.retries,
        })
    }
}

/// Resolve `host` or `host:port`, filling in `default_port` when absent.
fn resolve_target(target: &str, default_port: u16) -> Result<SocketAddr> {
    if let Some(addr) = target.to_socket_addrs().ok().and_then(|mut it| it.next()) {
        return Ok(addr);
    }
    if let Some(addr) = (target, default_port)
        .to_socket_addrs()
        .ok()
        .and_then(|mut it| it.next())
    {
        return Ok(addr);
    }
    Err(Error::Config(format!("cannot resolve target {:?}", target).into()).boxed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn test_port_defaults_to_161() {
        let config = PollConfig::builder("192.0.2.10")
            .oids([oid!(1, 3, 6, 1)])
            .build()
            .unwrap();
        assert_eq!(config.target().port(), 161);
    }

    #[test]
    fn test_explicit_port_wins() {
        let config = PollConfig::builder("192.0.2.10:1161")
            .port(9999)
            .oids([oid!(1, 3, 6, 1)])
            .build()
            .unwrap();
        assert_eq!(config.target().port(), 1161);
    }

    #[test]
    fn test_split_defaults_to_oid_count() {
        let config = PollConfig::builder("192.0.2.10")
            .oids([oid!(1, 3, 6, 1), oid!(1, 3, 6, 2), oid!(1, 3, 6, 3)])
            .build()
            .unwrap();
        assert_eq!(config.initial_split(), 3);
    }

    #[test]
    fn test_empty_oids_rejected() {
        let err = PollConfig::builder("192.0.2.10").build().unwrap_err();
        assert!(matches!(*err, Error::Config(_)));
    }

    #[test]
    fn test_zero_split_rejected() {
        let err = PollConfig::builder("192.0.2.10")
            .oids([oid!(1, 3, 6, 1)])
            .split(0)
            .build()
            .unwrap_err();
        assert!(matches!(*err, Error::Config(_)));
    }

    #[test]
    fn test_version_string_fallback() {
        let config = PollConfig::builder("192.0.2.10")
            .version_str("broken")
            .oids([oid!(1, 3, 6, 1)])
            .build()
            .unwrap();
        assert_eq!(config.version(), Version::V1);
    }
}
