//! Shared test infrastructure for snmp-bulkpoll.
//!
//! Provides a scripted in-process UDP agent and a sample-recording handler.
//! Agents bind ephemeral localhost ports and shut down on drop.

// Not every test file uses every helper
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::SystemTime;

use bytes::Bytes;
use snmp_bulkpoll::{
    CommunityMessage, ErrorStatus, Oid, Pdu, PollHandler, SampleError, Value, VarBind,
};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// How the agent answers requests.
#[derive(Debug, Clone, Copy)]
pub enum AgentBehavior {
    /// Answer every request from the data map.
    Normal,
    /// Report `tooBig` for any request with more than this many varbinds,
    /// like an agent with a small response buffer.
    VarbindCap(usize),
    /// Receive and never answer.
    Mute,
}

/// In-process scripted SNMP agent.
pub struct StubAgent {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl StubAgent {
    /// Spawn an agent serving `data` with the given behavior.
    pub async fn spawn(data: BTreeMap<Oid, Value>, behavior: AgentBehavior) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("failed to bind stub agent");
        let addr = socket.local_addr().expect("stub agent has no local addr");

        let task = tokio::spawn(async move {
            let mut buf = vec![0u8; 65535];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                    break;
                };
                if matches!(behavior, AgentBehavior::Mute) {
                    continue;
                }

                let Ok(request) = CommunityMessage::decode(Bytes::copy_from_slice(&buf[..len]))
                else {
                    continue;
                };
                let pdu = request.pdu;

                let response = match behavior {
                    AgentBehavior::VarbindCap(cap) if pdu.varbinds.len() > cap => {
                        // v1-style error: echo the request varbinds back
                        Pdu::error_response(pdu.request_id, ErrorStatus::TooBig, pdu.varbinds)
                    }
                    _ => {
                        let varbinds = pdu
                            .varbinds
                            .iter()
                            .map(|vb| {
                                let value = data
                                    .get(&vb.oid)
                                    .cloned()
                                    .unwrap_or(Value::NoSuchInstance);
                                VarBind::new(vb.oid.clone(), value)
                            })
                            .collect();
                        Pdu::response(pdu.request_id, varbinds)
                    }
                };

                let reply =
                    CommunityMessage::new(request.version, request.community, response).encode();
                let _ = socket.send_to(&reply, peer).await;
            }
        });

        Self { addr, task }
    }

    /// The agent's listening address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for StubAgent {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Handler that records every delivered sample.
#[derive(Debug, Default)]
pub struct Recorder {
    pub samples: Vec<(Oid, Value, SystemTime)>,
}

impl PollHandler for Recorder {
    fn on_sample(&mut self, varbind: VarBind, at: SystemTime) -> Result<(), SampleError> {
        self.samples.push((varbind.oid, varbind.value, at));
        Ok(())
    }
}

/// Numbered scalar OIDs under a private enterprise arc.
pub fn numbered_oids(count: u32) -> Vec<Oid> {
    (0..count)
        .map(|i| Oid::new([1, 3, 6, 1, 4, 1, 9999, 1, i]))
        .collect()
}

/// A data map assigning `Counter64(i)` to each of `oids`.
pub fn counter_data(oids: &[Oid]) -> BTreeMap<Oid, Value> {
    oids.iter()
        .enumerate()
        .map(|(i, oid)| (oid.clone(), Value::Counter64(i as u64)))
        .collect()
}
