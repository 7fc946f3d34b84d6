//! Adaptive bulk-poll state machine.
//!
//! [`BulkPoller`] owns the protocol state for one polled agent: the current
//! split size, the built request buffer, and the cycle position. It performs
//! no I/O; a driver (see [`UdpPoller`](crate::transport::UdpPoller)) calls
//! [`next_request`](BulkPoller::next_request) to obtain the datagram to
//! transmit and feeds received datagrams to
//! [`handle_datagram`](BulkPoller::handle_datagram).
//!
//! The OID list is partitioned into chunks of at most `split` OIDs, one GET
//! request per chunk, sent one at a time. When the agent answers `tooBig`,
//! the split is halved (floor 1) and the whole request buffer is rebuilt,
//! restarting the cycle from the first chunk. A cycle is complete once every
//! chunk has been answered.

mod config;
mod handler;

pub use config::{
    DEFAULT_INTERVAL, DEFAULT_PORT, DEFAULT_RETRIES, DEFAULT_TIMEOUT, PollConfig,
    PollConfigBuilder,
};
pub use handler::{NopHandler, PollHandler, SampleError};

use std::time::SystemTime;

use bytes::Bytes;

use crate::ber::Decoder;
use crate::error::{ErrorStatus, Result};
use crate::message::CommunityMessage;
use crate::util::next_request_id;

/// What a processed datagram means for the poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The current chunk was answered; more chunks remain in this cycle.
    MorePending,
    /// Every chunk has been answered; the cycle is complete. The driver
    /// should stop sending until the next poll interval.
    CycleComplete,
    /// The agent reported `tooBig`. The split size was halved, the request
    /// buffer rebuilt, and the cycle restarted from the first chunk; the
    /// cycle did *not* complete.
    SplitReduced,
}

/// Adaptive bulk-poll state machine for a single agent.
///
/// One instance per polled host. All mutable protocol state is owned here
/// and touched only through `&mut self`, so independent pollers run
/// concurrently without any shared state.
pub struct BulkPoller<H> {
    config: PollConfig,
    handler: H,
    /// Maximum OIDs per request. Only ever shrinks, and never below 1.
    split: usize,
    /// One encoded GET request per chunk, covering the OID list in order.
    requests: Vec<Bytes>,
    /// Index of the chunk awaiting transmission or response.
    cursor: usize,
}

impl<H: PollHandler> BulkPoller<H> {
    /// Create a poller; the request buffer is built on first use.
    pub fn new(config: PollConfig, handler: H) -> Self {
        let split = config.initial_split();
        Self {
            config,
            handler,
            split,
            requests: Vec::new(),
            cursor: 0,
        }
    }

    /// The configuration this poller was built with.
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Current maximum OIDs per request.
    pub fn split_size(&self) -> usize {
        self.split
    }

    /// Number of request chunks at the current split size.
    pub fn chunk_count(&self) -> usize {
        self.config.oids().len().div_ceil(self.split)
    }

    /// Borrow the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Mutably borrow the handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consume the poller, returning the handler.
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// The encoded request message for the current chunk.
    ///
    /// Builds the request buffer first if it does not exist yet. The same
    /// message is returned again until [`Self::handle_datagram`] advances
    /// the cycle, so a driver can retransmit on timeout by calling this
    /// again.
    pub fn next_request(&mut self) -> Bytes {
        if self.requests.is_empty() {
            self.rebuild();
        }
        self.requests[self.cursor].clone()
    }

    /// Process a received datagram and advance the cycle.
    ///
    /// The datagram may hold several SNMP messages back-to-back; each is
    /// decoded and handled in order:
    ///
    /// - success: every binding goes to the handler with the timestamp `at`
    ///   (a handler error is logged and the rest still delivered);
    /// - `tooBig`: the split is halved, the buffer rebuilt, the rest of the
    ///   datagram discarded, and [`PollOutcome::SplitReduced`] returned;
    /// - any other agent error: logged, the chunk's bindings skipped, and
    ///   the cycle advances as for a clean exchange.
    ///
    /// An undecodable datagram yields `Err` and leaves the cycle position
    /// untouched, so the driver's retry policy re-sends the current chunk.
    /// Bindings already delivered from earlier messages in that datagram
    /// stay delivered.
    pub fn handle_datagram(&mut self, data: Bytes, at: SystemTime) -> Result<PollOutcome> {
        if self.requests.is_empty() {
            self.rebuild();
        }

        let peer = self.config.target();
        let mut decoder = Decoder::new(data);

        while !decoder.is_empty() {
            let pdu = CommunityMessage::decode_from(&mut decoder)?.into_pdu();

            match pdu.error_status_enum() {
                ErrorStatus::NoError => {
                    for vb in pdu.varbinds {
                        if let Err(error) = self.handler.on_sample(vb, at) {
                            tracing::error!(
                                target: "snmp_bulkpoll::poller",
                                peer = %peer,
                                %error,
                                "sample handler failed"
                            );
                        }
                    }
                }
                ErrorStatus::TooBig => {
                    // Any messages left in this datagram answer a request
                    // size the agent just refused; they go down with the
                    // batch.
                    self.split = (self.split / 2).max(1);
                    tracing::warn!(
                        target: "snmp_bulkpoll::poller",
                        peer = %peer,
                        split = self.split,
                        "agent reported tooBig, splitting requests"
                    );
                    self.rebuild();
                    return Ok(PollOutcome::SplitReduced);
                }
                status => {
                    tracing::error!(
                        target: "snmp_bulkpoll::poller",
                        peer = %peer,
                        %status,
                        error_index = pdu.error_index,
                        "agent error"
                    );
                }
            }
        }

        self.cursor = (self.cursor + 1) % self.requests.len();
        if self.cursor == 0 {
            tracing::debug!(target: "snmp_bulkpoll::poller", peer = %peer, "poll cycle complete");
            Ok(PollOutcome::CycleComplete)
        } else {
            Ok(PollOutcome::MorePending)
        }
    }

    /// Rebuild the request buffer at the current split size.
    ///
    /// Chunk `i` covers OIDs `[i * split, min((i + 1) * split, len))`; the
    /// chunks cover the configured list exactly, in order. Rebuilding
    /// restarts the cycle from the first chunk.
    fn rebuild(&mut self) {
        self.requests = self
            .config
            .oids()
            .chunks(self.split)
            .map(|chunk| {
                CommunityMessage::encode_get_request(
                    self.config.version(),
                    self.config.community(),
                    next_request_id(),
                    chunk,
                )
            })
            .collect();
        self.cursor = 0;

        tracing::debug!(
            target: "snmp_bulkpoll::poller",
            peer = %self.config.target(),
            chunks = self.requests.len(),
            split = self.split,
            "request buffer rebuilt"
        );
    }
}
