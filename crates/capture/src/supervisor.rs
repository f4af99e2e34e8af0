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

//! The capture actor supervising the whole observation pipeline.
//!
//! A dedicated OS thread blocks on the capture handle and forwards raw
//! packets over an unbounded channel to the actor task. The actor
//! demultiplexes packets into per-flow pipelines, created lazily on the
//! first segment of each flow and joined on shutdown. Consumers take the
//! outbound/inbound update receivers from the handle.

use crate::{
    demux::extract_tcp_segment,
    pipeline::FlowPipeline,
    source::{PacketSource, RawPacket},
    create_update_channel, FlowKey, SessionEndpoints, UpdateReceiver, UpdateSender,
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum BgpCaptureActorError {
    #[error("failed to spawn capture thread: {0}")]
    CaptureThreadSpawnError(std::io::Error),
}

#[derive(Debug, strum_macros::Display)]
enum BgpCaptureActorCommand {
    Shutdown(oneshot::Sender<()>),
}

struct BgpCaptureActor {
    endpoints: SessionEndpoints,
    outbound_tx: UpdateSender,
    inbound_tx: UpdateSender,
    pipelines: HashMap<FlowKey, (mpsc::UnboundedSender<crate::demux::TcpSegment>, JoinHandle<()>)>,
}

impl BgpCaptureActor {
    fn new(
        endpoints: SessionEndpoints,
        outbound_tx: UpdateSender,
        inbound_tx: UpdateSender,
    ) -> Self {
        Self {
            endpoints,
            outbound_tx,
            inbound_tx,
            pipelines: HashMap::new(),
        }
    }

    async fn run(
        mut self,
        mut packets: mpsc::UnboundedReceiver<RawPacket>,
        mut cmd_rx: mpsc::Receiver<BgpCaptureActorCommand>,
        running: Arc<AtomicBool>,
    ) -> Result<(), BgpCaptureActorError> {
        loop {
            tokio::select! {
                biased;
                cmd = cmd_rx.recv() => {
                    let ack = match cmd {
                        Some(BgpCaptureActorCommand::Shutdown(ack)) => Some(ack),
                        // all handles dropped, same as shutdown
                        None => None,
                    };
                    info!("capture actor shutting down");
                    running.store(false, Ordering::Relaxed);
                    packets.close();
                    self.join_pipelines().await;
                    if let Some(ack) = ack {
                        let _ = ack.send(());
                    }
                    return Ok(());
                }
                packet = packets.recv() => {
                    match packet {
                        Some(packet) => self.handle_packet(packet),
                        None => {
                            // capture thread ended on its own (read error)
                            warn!("capture thread terminated, draining pipelines");
                            self.join_pipelines().await;
                            // keep serving shutdown so the handle stays usable
                            match cmd_rx.recv().await {
                                Some(BgpCaptureActorCommand::Shutdown(ack)) => {
                                    let _ = ack.send(());
                                }
                                None => {}
                            }
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    fn handle_packet(&mut self, packet: RawPacket) {
        let Some(segment) = extract_tcp_segment(&packet) else {
            return;
        };
        let Some(direction) = self.endpoints.classify(&segment.flow) else {
            debug!(flow = %segment.flow, "segment outside the observed session");
            return;
        };
        let flow = segment.flow;
        if !self.pipelines.contains_key(&flow) {
            let updates = match direction {
                crate::FlowDirection::Outbound => self.outbound_tx.clone(),
                crate::FlowDirection::Inbound => self.inbound_tx.clone(),
            };
            info!(flow = %flow, direction = %direction, "new flow observed");
            let (handle, segment_tx) = FlowPipeline::spawn(flow, direction, updates);
            self.pipelines.insert(flow, (segment_tx, handle));
        }
        if let Some((segment_tx, _)) = self.pipelines.get(&flow) {
            if segment_tx.send(segment).is_err() {
                // pipeline is gone, its update receiver was dropped
                if let Some((_, handle)) = self.pipelines.remove(&flow) {
                    handle.abort();
                }
                debug!(flow = %flow, "dropped segment for terminated pipeline");
            }
        }
    }

    /// Close every segment channel and wait for the pipelines to finish
    /// decoding what they already received.
    async fn join_pipelines(&mut self) {
        for (flow, (segment_tx, handle)) in self.pipelines.drain() {
            drop(segment_tx);
            if let Err(err) = handle.await {
                error!(flow = %flow, error = ?err, "flow pipeline panicked");
            }
        }
    }
}

/// Handle to a running capture actor.
#[derive(Debug, Clone)]
pub struct BgpCaptureActorHandle {
    cmd_tx: mpsc::Sender<BgpCaptureActorCommand>,
    outbound_rx: UpdateReceiver,
    inbound_rx: UpdateReceiver,
}

impl BgpCaptureActorHandle {
    /// Start the capture thread and the supervising actor.
    ///
    /// `update_buffer` bounds each direction's update channel; pipelines
    /// block on a full channel while the capture thread keeps running.
    pub fn new<S: PacketSource + Send + 'static>(
        source: S,
        endpoints: SessionEndpoints,
        update_buffer: usize,
    ) -> Result<
        (
            JoinHandle<Result<(), BgpCaptureActorError>>,
            BgpCaptureActorHandle,
        ),
        BgpCaptureActorError,
    > {
        let (outbound_tx, outbound_rx) = create_update_channel(update_buffer);
        let (inbound_tx, inbound_rx) = create_update_channel(update_buffer);
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (packet_tx, packet_rx) = mpsc::unbounded_channel();

        let running = Arc::new(AtomicBool::new(true));
        // the thread exits on its own once `running` is cleared or the
        // packet channel closes, no explicit join needed
        let _capture_thread = spawn_capture_thread(source, Arc::clone(&running), packet_tx)?;

        let actor = BgpCaptureActor::new(endpoints, outbound_tx, inbound_tx);
        let join_handle = tokio::spawn(actor.run(packet_rx, cmd_rx, running));
        Ok((
            join_handle,
            BgpCaptureActorHandle {
                cmd_tx,
                outbound_rx,
                inbound_rx,
            },
        ))
    }

    /// Updates sent by the local speaker to the peer.
    pub fn outbound_updates(&self) -> UpdateReceiver {
        self.outbound_rx.clone()
    }

    /// Updates sent by the peer to the local speaker.
    pub fn inbound_updates(&self) -> UpdateReceiver {
        self.inbound_rx.clone()
    }

    /// Stop the capture thread, drain the pipelines, and wait for the
    /// actor to acknowledge. Updates buffered but not yet consumed are
    /// dropped. Idempotent: shutting down an already-stopped actor is Ok.
    pub async fn shutdown(&self) -> Result<(), BgpCaptureActorError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self
            .cmd_tx
            .send(BgpCaptureActorCommand::Shutdown(ack_tx))
            .await
            .is_err()
        {
            debug!("capture actor already terminated");
            return Ok(());
        }
        if ack_rx.await.is_err() {
            debug!("capture actor exited before acknowledging shutdown");
        }
        Ok(())
    }
}

fn spawn_capture_thread<S: PacketSource + Send + 'static>(
    mut source: S,
    running: Arc<AtomicBool>,
    packet_tx: mpsc::UnboundedSender<RawPacket>,
) -> Result<std::thread::JoinHandle<()>, BgpCaptureActorError> {
    std::thread::Builder::new()
        .name("bgp-capture".to_string())
        .spawn(move || {
            while running.load(Ordering::Relaxed) {
                match source.next_packet() {
                    Ok(Some(packet)) => {
                        if packet_tx.send(packet).is_err() {
                            break;
                        }
                    }
                    // read timeout tick, re-check the shutdown flag
                    Ok(None) => continue,
                    Err(err) => {
                        error!(error = %err, "capture read failed, stopping capture thread");
                        break;
                    }
                }
            }
            debug!("capture thread exited");
        })
        .map_err(BgpCaptureActorError::CaptureThreadSpawnError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        source::CaptureSourceError, test_util::ipv4_tcp_frame, FlowDirection,
    };
    use chrono::Utc;
    use std::{
        collections::VecDeque,
        net::{IpAddr, Ipv4Addr},
        time::Duration,
    };

    const LOCAL: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
    const PEER: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

    /// Replays a fixed set of frames, then reports timeout ticks forever.
    struct ScriptedSource {
        frames: VecDeque<Vec<u8>>,
    }

    impl PacketSource for ScriptedSource {
        fn next_packet(&mut self) -> Result<Option<RawPacket>, CaptureSourceError> {
            match self.frames.pop_front() {
                Some(data) => Ok(Some(RawPacket {
                    timestamp: Utc::now(),
                    data,
                })),
                None => {
                    std::thread::sleep(Duration::from_millis(10));
                    Ok(None)
                }
            }
        }
    }

    // withdraw-only UPDATE for 172.16.0.0/16, no path attributes
    const WITHDRAW_WIRE: [u8; 26] = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xff, 0x00, 0x1a, 0x02, 0x00, 0x03, 0x10, 0xac, 0x10, 0x00, 0x00,
    ];

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_end_to_end_withdraw_update() {
        let endpoints =
            SessionEndpoints::new(IpAddr::V4(LOCAL), IpAddr::V4(PEER), 179);

        // the peer's half of the session, SYN then the UPDATE in three splits
        let peer = (PEER, 179);
        let local = (LOCAL, 33000);
        let frames = VecDeque::from(vec![
            ipv4_tcp_frame(peer, local, 999, true, &[]),
            ipv4_tcp_frame(peer, local, 1000, false, &WITHDRAW_WIRE[..5]),
            ipv4_tcp_frame(peer, local, 1005, false, &WITHDRAW_WIRE[5..19]),
            ipv4_tcp_frame(peer, local, 1019, false, &WITHDRAW_WIRE[19..]),
            // unrelated host, must be ignored
            ipv4_tcp_frame((Ipv4Addr::new(192, 168, 1, 7), 179), local, 1, false, &[0xff]),
        ]);

        let (join_handle, handle) = BgpCaptureActorHandle::new(
            ScriptedSource { frames },
            endpoints,
            100,
        )
        .unwrap();

        let inbound = handle.inbound_updates();
        let event = inbound.recv().await.unwrap();
        assert_eq!(event.direction, FlowDirection::Inbound);
        assert_eq!(event.sequence, 1);
        assert_eq!(event.next_hop, None);
        assert_eq!(event.announced_count(), 0);
        assert_eq!(event.withdrawn_count(), 1);

        handle.shutdown().await.unwrap();
        join_handle.await.unwrap().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_is_idempotent() {
        let endpoints =
            SessionEndpoints::new(IpAddr::V4(LOCAL), IpAddr::V4(PEER), 179);
        let (join_handle, handle) = BgpCaptureActorHandle::new(
            ScriptedSource {
                frames: VecDeque::new(),
            },
            endpoints,
            16,
        )
        .unwrap();

        handle.shutdown().await.unwrap();
        join_handle.await.unwrap().unwrap();
        handle.shutdown().await.unwrap();
    }
}
