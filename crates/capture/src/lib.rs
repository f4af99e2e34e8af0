// Copyright (C) 2024-present The Routebench Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Passive observation of a live BGP session.
//!
//! Packets are sniffed off an interface, demultiplexed into the two TCP
//! flow directions of the session, reassembled into ordered byte streams,
//! and decoded into BGP messages. Only UPDATE messages surface to the
//! consumer, as [`BgpUpdateEvent`]s delivered over one bounded channel per
//! flow direction.

pub mod demux;
pub mod pipeline;
pub mod reassembly;
pub mod source;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod test_util;

use chrono::{DateTime, Utc};
use routebench_bgp_pkt::update::BgpUpdateMessage;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, net::IpAddr, sync::Arc};

/// One direction of a TCP connection, as seen on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowKey {
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
}

impl Display for FlowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.src_ip, self.src_port, self.dst_ip, self.dst_port
        )
    }
}

/// Direction of a flow relative to the observed session's local speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum FlowDirection {
    /// Sent by the local speaker to the peer
    Outbound,
    /// Sent by the peer to the local speaker
    Inbound,
}

/// The two endpoints of the BGP session under observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEndpoints {
    pub local: IpAddr,
    pub peer: IpAddr,
    pub port: u16,
}

impl SessionEndpoints {
    pub const fn new(local: IpAddr, peer: IpAddr, port: u16) -> Self {
        Self { local, peer, port }
    }

    /// Classify a flow against the session endpoints. Flows that belong to
    /// neither direction of the session are `None` and get dropped.
    pub fn classify(&self, flow: &FlowKey) -> Option<FlowDirection> {
        if flow.src_port != self.port && flow.dst_port != self.port {
            return None;
        }
        if flow.src_ip == self.local && flow.dst_ip == self.peer {
            Some(FlowDirection::Outbound)
        } else if flow.src_ip == self.peer && flow.dst_ip == self.local {
            Some(FlowDirection::Inbound)
        } else {
            None
        }
    }
}

/// A decoded BGP UPDATE observed on one flow of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct BgpUpdateEvent {
    /// 1-based position of this message in its flow's message stream.
    /// Counts every framed message on the flow, not just UPDATEs, so gaps
    /// reveal interleaved non-UPDATE traffic and skipped parse failures.
    pub sequence: u64,
    pub flow: FlowKey,
    pub direction: FlowDirection,
    /// Capture timestamp of the segment that completed the message
    pub timestamp: DateTime<Utc>,
    /// Value of the NEXT_HOP path attribute, when the message carries one
    pub next_hop: Option<IpAddr>,
    pub message: BgpUpdateMessage,
}

impl BgpUpdateEvent {
    pub fn announced_count(&self) -> usize {
        self.message.nlri().len()
    }

    pub fn withdrawn_count(&self) -> usize {
        self.message.withdrawn_routes().len()
    }
}

pub type UpdateSender = async_channel::Sender<Arc<BgpUpdateEvent>>;
pub type UpdateReceiver = async_channel::Receiver<Arc<BgpUpdateEvent>>;

/// Create a bounded channel for update events. Senders block when the
/// consumer lags, which backpressures the decoding pipeline (but never the
/// capture thread itself).
pub fn create_update_channel(buffer_size: usize) -> (UpdateSender, UpdateReceiver) {
    async_channel::bounded(buffer_size)
}
