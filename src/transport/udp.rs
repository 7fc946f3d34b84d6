//! UDP poll driver.

use std::time::{Instant, SystemTime};

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::time::{MissedTickBehavior, timeout};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::poller::{BulkPoller, PollConfig, PollHandler, PollOutcome};
use crate::util::bind_ephemeral_udp_socket;

/// Drives a [`BulkPoller`] over a connected UDP socket.
///
/// Owns the socket, the poll schedule, and the retry bookkeeping; the
/// protocol state stays inside the wrapped poller. One `UdpPoller` polls one
/// agent; run several instances to poll several agents.
///
/// # Example
///
/// ```rust,no_run
/// use snmp_bulkpoll::{Oid, PollConfig, SampleError, UdpPoller, VarBind, Version};
/// use std::time::{Duration, SystemTime};
///
/// # async fn example() -> snmp_bulkpoll::Result<()> {
/// let config = PollConfig::builder("192.0.2.1")
///     .version(Version::V2c)
///     .community(&b"public"[..])
///     .interval(Duration::from_secs(30))
///     .oids([
///         Oid::parse("1.3.6.1.2.1.1.3.0")?,
///         Oid::parse("1.3.6.1.2.1.2.2.1.10.1")?,
///     ])
///     .build()?;
///
/// let poller = UdpPoller::connect(config, |vb: VarBind, _at: SystemTime| {
///     println!("{}", vb);
///     Ok::<(), SampleError>(())
/// })
/// .await?;
///
/// poller.run().await;
/// # Ok(())
/// # }
/// ```
pub struct UdpPoller<H> {
    socket: UdpSocket,
    poller: BulkPoller<H>,
    cancel: CancellationToken,
}

impl<H: PollHandler> UdpPoller<H> {
    /// Bind an ephemeral socket and connect it to the configured target.
    pub async fn connect(config: PollConfig, handler: H) -> Result<Self> {
        let target = config.target();

        tracing::debug!(target: "snmp_bulkpoll::transport", peer = %target, "connecting UDP poller");

        let socket = bind_ephemeral_udp_socket(target).map_err(|source| {
            Error::Network { target, source }.boxed()
        })?;
        socket
            .connect(target)
            .await
            .map_err(|source| Error::Network { target, source }.boxed())?;

        Ok(Self {
            socket,
            poller: BulkPoller::new(config, handler),
            cancel: CancellationToken::new(),
        })
    }

    /// Token that stops [`run`](UdpPoller::run) when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Borrow the wrapped state machine.
    pub fn poller(&self) -> &BulkPoller<H> {
        &self.poller
    }

    /// Consume the driver, returning the handler.
    pub fn into_handler(self) -> H {
        self.poller.into_handler()
    }

    /// Run one complete poll cycle: every chunk sent and answered.
    ///
    /// A timed-out or undecodable exchange re-sends the current chunk. The
    /// retry counter tracks consecutive silence, not total failures: it
    /// resets whenever a datagram arrives. Exhausting the retries abandons
    /// the cycle with an error.
    pub async fn poll_once(&mut self) -> Result<()> {
        let peer = self.poller.config().target();
        let recv_timeout = self.poller.config().timeout();
        let max_retries = self.poller.config().retries();

        let started = Instant::now();
        let mut retries = 0u32;
        let mut buf = vec![0u8; 65535];

        loop {
            let request = self.poller.next_request();
            self.socket
                .send(&request)
                .await
                .map_err(|source| Error::Network { target: peer, source }.boxed())?;
            tracing::trace!(target: "snmp_bulkpoll::transport", peer = %peer, bytes = request.len(), "request sent");

            match timeout(recv_timeout, self.socket.recv(&mut buf)).await {
                Ok(Ok(len)) => {
                    retries = 0;
                    let at = SystemTime::now();
                    tracing::trace!(target: "snmp_bulkpoll::transport", peer = %peer, bytes = len, "datagram received");

                    let data = Bytes::copy_from_slice(&buf[..len]);
                    match self.poller.handle_datagram(data, at) {
                        Ok(PollOutcome::CycleComplete) => return Ok(()),
                        Ok(PollOutcome::MorePending) | Ok(PollOutcome::SplitReduced) => {}
                        Err(error) => {
                            tracing::warn!(
                                target: "snmp_bulkpoll::transport",
                                peer = %peer,
                                %error,
                                "discarding undecodable datagram"
                            );
                            retries += 1;
                            if retries > max_retries {
                                return Err(error);
                            }
                        }
                    }
                }
                Ok(Err(source)) => {
                    return Err(Error::Network { target: peer, source }.boxed());
                }
                Err(_) => {
                    retries += 1;
                    tracing::debug!(
                        target: "snmp_bulkpoll::transport",
                        peer = %peer,
                        attempt = retries,
                        "receive timed out"
                    );
                    if retries > max_retries {
                        return Err(Error::Timeout {
                            target: peer,
                            elapsed: started.elapsed(),
                            retries: max_retries,
                        }
                        .boxed());
                    }
                    // Loop re-sends the current chunk
                }
            }
        }
    }

    /// Poll on the configured interval until the cancellation token fires.
    ///
    /// The first cycle starts immediately. A failed cycle (unreachable or
    /// silent agent) is logged and the schedule continues; no failure stops
    /// the loop. Returns the handler so accumulated state survives
    /// cancellation.
    pub async fn run(mut self) -> H {
        let mut ticker = tokio::time::interval(self.poller.config().interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let cancel = self.cancel.clone();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(target: "snmp_bulkpoll::transport", peer = %self.poller.config().target(), "poller cancelled");
                    return self.poller.into_handler();
                }
                _ = ticker.tick() => {}
            }

            if let Err(error) = self.poll_once().await {
                tracing::warn!(
                    target: "snmp_bulkpoll::transport",
                    peer = %self.poller.config().target(),
                    %error,
                    "poll cycle failed"
                );
            }
        }
    }
}
