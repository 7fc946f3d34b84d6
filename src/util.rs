//! Internal utilities.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

/// Create and bind a UDP socket with proper IPv6 configuration.
///
/// For IPv6 sockets, sets `IPV6_V6ONLY = true` so the socket only handles
/// IPv6 traffic and does not accept IPv4-mapped addresses.
pub(crate) fn bind_udp_socket(addr: SocketAddr) -> io::Result<UdpSocket> {
    let domain = if addr.is_ipv6() {
        Domain::IPV6
    } else {
        Domain::IPV4
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    if addr.is_ipv6() {
        socket.set_only_v6(true)?;
    }

    socket.set_reuse_address(true)?;

    // Must be non-blocking before handing the fd to tokio
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;

    UdpSocket::from_std(socket.into())
}

/// Create an ephemeral UDP socket matching the target's address family.
pub(crate) fn bind_ephemeral_udp_socket(target: SocketAddr) -> io::Result<UdpSocket> {
    let bind_addr: SocketAddr = if target.is_ipv6() {
        "[::]:0".parse().unwrap()
    } else {
        "0.0.0.0:0".parse().unwrap()
    };

    bind_udp_socket(bind_addr)
}

/// Allocate a request ID from a process-wide counter.
///
/// IDs are shared across all poller instances so that concurrently polled
/// hosts never reuse an ID at the same moment. Wraps back to 1, skipping 0.
pub(crate) fn next_request_id() -> i32 {
    static COUNTER: AtomicI32 = AtomicI32::new(1);
    loop {
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        if id != 0 {
            return id;
        }
    }
}
