//! Transport drivers.
//!
//! The poll state machine ([`BulkPoller`](crate::poller::BulkPoller)) does
//! no I/O of its own; a driver owns the socket and the schedule and feeds
//! datagrams in. UDP is the only transport SNMP polling realistically uses,
//! so it is the only driver shipped.

mod udp;

pub use udp::UdpPoller;
