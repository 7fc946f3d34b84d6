//! # snmp-bulkpoll
//!
//! Adaptive SNMP bulk poller for Rust.
//!
//! Repeatedly fetches a fixed set of OIDs from an agent over UDP, splitting
//! the OID list across several GET requests when the agent reports the
//! response would be `tooBig`, and delivering every retrieved value to a
//! caller-supplied handler. Built for polling large counter sets from
//! constrained devices whose maximum response size is unknown.
//!
//! ## Features
//!
//! - SNMPv1 and v2c (community-based) polling
//! - Automatic request splitting: per-request OID count halves on `tooBig`
//!   and the cycle restarts, until requests fit
//! - Tolerates agents that pack several response messages into one datagram
//! - Sans-I/O core ([`BulkPoller`]) usable with any transport; a Tokio UDP
//!   driver ([`UdpPoller`]) included
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snmp_bulkpoll::{Oid, PollConfig, SampleError, UdpPoller, VarBind, Version};
//! use std::time::{Duration, SystemTime};
//!
//! #[tokio::main]
//! async fn main() -> snmp_bulkpoll::Result<()> {
//!     let config = PollConfig::builder("192.0.2.1")
//!         .version(Version::V2c)
//!         .community(&b"public"[..])
//!         .interval(Duration::from_secs(30))
//!         .oids([
//!             Oid::parse("1.3.6.1.2.1.1.3.0")?,          // sysUpTime
//!             Oid::parse("1.3.6.1.2.1.2.2.1.10.1")?,     // ifInOctets.1
//!         ])
//!         .build()?;
//!
//!     let poller = UdpPoller::connect(config, |vb: VarBind, at: SystemTime| {
//!         println!("{:?} {}", at, vb);
//!         Ok::<(), SampleError>(())
//!     })
//!     .await?;
//!
//!     poller.run().await;
//!     Ok(())
//! }
//! ```

pub mod ber;
pub mod error;
pub mod message;
pub mod oid;
pub mod pdu;
pub mod poller;
pub mod transport;
pub mod value;
pub mod varbind;
pub mod version;

pub(crate) mod util;

// Re-exports for convenience
pub use error::{DecodeErrorKind, Error, ErrorStatus, Result};
pub use message::CommunityMessage;
pub use oid::Oid;
pub use pdu::{Pdu, PduType};
pub use poller::{
    BulkPoller, NopHandler, PollConfig, PollConfigBuilder, PollHandler, PollOutcome, SampleError,
};
pub use transport::UdpPoller;
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;
