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

//! Per-flow decoding pipeline: reassembly, framing, and decoding for one
//! direction of the session, feeding the flow's update channel.

use crate::{
    demux::TcpSegment, reassembly::TcpReassembler, BgpUpdateEvent, FlowDirection, FlowKey,
    UpdateSender,
};
use routebench_bgp_pkt::{codec::BgpCodec, BgpMessage};
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::codec::Decoder;
use tracing::{debug, trace, warn};

/// Decoding pipeline for a single flow. Owns the flow's reassembler and
/// codec state; driven by an unbounded segment channel so the capture
/// thread never blocks on a slow consumer.
pub(crate) struct FlowPipeline {
    flow: FlowKey,
    direction: FlowDirection,
    reassembler: TcpReassembler,
    codec: BgpCodec,
    /// Messages framed on this flow so far, parse failures included;
    /// events carry the 1-based position
    sequence: u64,
    updates: UpdateSender,
}

impl FlowPipeline {
    pub(crate) fn spawn(
        flow: FlowKey,
        direction: FlowDirection,
        updates: UpdateSender,
    ) -> (JoinHandle<()>, mpsc::UnboundedSender<TcpSegment>) {
        let (segment_tx, segment_rx) = mpsc::unbounded_channel();
        let pipeline = Self {
            flow,
            direction,
            reassembler: TcpReassembler::new(),
            codec: BgpCodec::default(),
            sequence: 0,
            updates,
        };
        let handle = tokio::spawn(pipeline.run(segment_rx));
        (handle, segment_tx)
    }

    async fn run(mut self, mut segments: mpsc::UnboundedReceiver<TcpSegment>) {
        debug!(flow = %self.flow, direction = %self.direction, "flow pipeline started");
        while let Some(segment) = segments.recv().await {
            if !self.process(segment).await {
                debug!(flow = %self.flow, "update channel closed, stopping pipeline");
                return;
            }
        }
        debug!(flow = %self.flow, "segment channel closed, pipeline done");
    }

    /// Feed one segment through reassembly and decode every message that
    /// completes. Returns `false` once the update channel is closed.
    async fn process(&mut self, segment: TcpSegment) -> bool {
        self.reassembler
            .accept(segment.seq, segment.syn, &segment.payload);
        loop {
            match self.codec.decode(self.reassembler.available_mut()) {
                Ok(Some(message)) => {
                    self.sequence += 1;
                    let sequence = self.sequence;
                    let update = match message {
                        BgpMessage::Update(update) => update,
                        other => {
                            trace!(
                                flow = %self.flow,
                                sequence,
                                kind = %other.get_type(),
                                "skipping non-UPDATE message"
                            );
                            continue;
                        }
                    };
                    let event = BgpUpdateEvent {
                        sequence,
                        flow: self.flow,
                        direction: self.direction,
                        timestamp: segment.timestamp,
                        next_hop: update.next_hop(),
                        message: update,
                    };
                    if self.updates.send(Arc::new(event)).await.is_err() {
                        return false;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    // frame already consumed, skip it and keep the stream alive
                    self.sequence += 1;
                    warn!(
                        flow = %self.flow,
                        sequence = self.sequence,
                        error = ?err,
                        "failed to parse BGP message"
                    );
                }
            }
        }
        let pending = self.reassembler.pending_bytes();
        if pending > 0 {
            trace!(flow = %self.flow, pending, "bytes waiting on a sequence gap");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_update_channel;
    use chrono::Utc;
    use std::net::{IpAddr, Ipv4Addr};

    fn test_flow() -> FlowKey {
        FlowKey {
            src_ip: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
            src_port: 179,
            dst_ip: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            dst_port: 33000,
        }
    }

    fn segment(seq: u32, payload: &[u8]) -> TcpSegment {
        TcpSegment {
            flow: test_flow(),
            timestamp: Utc::now(),
            seq,
            syn: false,
            payload: payload.to_vec(),
        }
    }

    const KEEPALIVE_WIRE: [u8; 19] = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xff, 0x00, 0x13, 0x04,
    ];

    // withdraw-only UPDATE for 172.16.0.0/16, no path attributes
    const WITHDRAW_WIRE: [u8; 26] = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xff, 0x00, 0x1a, 0x02, 0x00, 0x03, 0x10, 0xac, 0x10, 0x00, 0x00,
    ];

    // UPDATE with next-hop 10.0.0.1 announcing 172.16.0.0/16 and 172.17.0.0/16
    const ANNOUNCE_WIRE: [u8; 47] = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xff, 0x00, 0x2f, 0x02, 0x00, 0x00, 0x00, 0x12, 0x40, 0x01, 0x01, 0x00, 0x40,
        0x02, 0x04, 0x02, 0x01, 0xfc, 0x00, 0x40, 0x03, 0x04, 0x0a, 0x00, 0x00, 0x01, 0x10,
        0xac, 0x10, 0x10, 0xac, 0x11,
    ];

    #[tokio::test]
    async fn test_update_split_across_segments_yields_one_event() {
        let (tx, rx) = create_update_channel(16);
        let (handle, segments) =
            FlowPipeline::spawn(test_flow(), FlowDirection::Inbound, tx);

        segments.send(segment(1000, &WITHDRAW_WIRE[..7])).unwrap();
        segments.send(segment(1007, &WITHDRAW_WIRE[7..20])).unwrap();
        segments.send(segment(1020, &WITHDRAW_WIRE[20..])).unwrap();
        drop(segments);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.sequence, 1);
        assert_eq!(event.direction, FlowDirection::Inbound);
        assert_eq!(event.next_hop, None);
        assert_eq!(event.announced_count(), 0);
        assert_eq!(event.withdrawn_count(), 1);
        assert!(rx.recv().await.is_err());
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_announce_event_carries_next_hop() {
        let (tx, rx) = create_update_channel(16);
        let (handle, segments) =
            FlowPipeline::spawn(test_flow(), FlowDirection::Outbound, tx);

        segments.send(segment(1, &ANNOUNCE_WIRE)).unwrap();
        drop(segments);

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event.next_hop,
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)))
        );
        assert_eq!(event.announced_count(), 2);
        assert_eq!(event.withdrawn_count(), 0);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_update_messages_advance_sequence() {
        let (tx, rx) = create_update_channel(16);
        let (handle, segments) =
            FlowPipeline::spawn(test_flow(), FlowDirection::Inbound, tx);

        let mut stream = Vec::new();
        stream.extend_from_slice(&KEEPALIVE_WIRE);
        stream.extend_from_slice(&KEEPALIVE_WIRE);
        stream.extend_from_slice(&WITHDRAW_WIRE);
        segments.send(segment(1, &stream)).unwrap();
        drop(segments);

        let event = rx.recv().await.unwrap();
        // two KEEPALIVEs came first, so the UPDATE is message three
        assert_eq!(event.sequence, 3);
        assert!(rx.recv().await.is_err());
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_out_of_order_segments_decode_in_stream_order() {
        let (tx, rx) = create_update_channel(16);
        let (handle, segments) =
            FlowPipeline::spawn(test_flow(), FlowDirection::Inbound, tx);

        // second half first
        segments.send(segment(1013, &WITHDRAW_WIRE[13..])).unwrap();
        segments.send(segment(1000, &WITHDRAW_WIRE[..13])).unwrap();
        drop(segments);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.withdrawn_count(), 1);
        handle.await.unwrap();
    }
}
